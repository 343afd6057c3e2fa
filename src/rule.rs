use std::{collections::BTreeMap, fmt};

use crate::{error::Result, statement::Statement};

/// A compiled aspect check.
pub type Check = Box<dyn Fn(&Statement) -> Result<()> + Send + Sync>;

/// One validated facet of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Aspect {
    Fields,
    Where,
    Limit,
    OrderBy,
    GroupBy,
    InnerJoin,
    OuterJoin,
}

impl Aspect {
    pub fn name(self) -> &'static str {
        match self {
            Self::Fields => "fields",
            Self::Where => "where",
            Self::Limit => "limit",
            Self::OrderBy => "orderBy",
            Self::GroupBy => "groupBy",
            Self::InnerJoin => "innerJoin",
            Self::OuterJoin => "outerJoin",
        }
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One compiled policy line: a table filter plus the aspect checks it claims.
pub struct Rule {
    targets: Vec<String>,
    checks: BTreeMap<Aspect, Check>,
}

impl Rule {
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            checks: BTreeMap::new(),
        }
    }

    pub fn with_check(mut self, aspect: Aspect, check: Check) -> Self {
        self.checks.insert(aspect, check);
        self
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn applies_to(&self, table: &str) -> bool {
        self.targets.iter().any(|t| t == "*" || t == table)
    }

    pub fn aspects(&self) -> impl Iterator<Item = Aspect> + '_ {
        self.checks.keys().copied()
    }

    /// A rule with no checks authorizes its tables unconditionally.
    pub fn is_bare(&self) -> bool {
        self.checks.is_empty()
    }

    pub(crate) fn run(&self, aspect: Aspect, statement: &Statement) -> Result<()> {
        match self.checks.get(&aspect) {
            Some(check) => check(statement),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("targets", &self.targets)
            .field("aspects", &self.checks.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Error, statement::Statement};

    #[test]
    fn wildcard_target_applies_everywhere() {
        let rule = Rule::new(["*"]);
        assert!(rule.applies_to("people"));
        assert!(rule.is_bare());
    }

    #[test]
    fn targets_match_exactly() {
        let rule = Rule::new(["people", "cars"]);
        assert!(rule.applies_to("cars"));
        assert!(!rule.applies_to("Cars"));
        assert!(!rule.applies_to("peoples"));
    }

    #[test]
    fn run_dispatches_by_aspect() {
        let rule = Rule::new(["t"]).with_check(
            Aspect::Limit,
            Box::new(|_: &Statement| Err(Error::AspectViolation("nope".into()))),
        );
        let stmt = Statement::Structural(crate::statement::StatementKind::Drop);
        assert_eq!(
            rule.run(Aspect::Limit, &stmt),
            Err(Error::AspectViolation("nope".into()))
        );
        assert_eq!(rule.run(Aspect::Fields, &stmt), Ok(()));
        assert_eq!(rule.aspects().collect::<Vec<_>>(), vec![Aspect::Limit]);
        assert!(!rule.is_bare());
    }
}
