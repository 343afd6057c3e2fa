use std::{collections::HashMap, path::Path};

use crate::{
    error::{Error, LoadError, Result},
    extract::extract,
    grammar::PolicyCompiler,
    rule::{Aspect, Rule},
    statement::{Statement, StatementKind},
};

/// Aspects a statement kind can be validated on.
pub fn recognized_aspects(kind: StatementKind) -> &'static [Aspect] {
    match kind {
        StatementKind::Select => &[
            Aspect::Fields,
            Aspect::Where,
            Aspect::OrderBy,
            Aspect::Limit,
            Aspect::InnerJoin,
            Aspect::OuterJoin,
            Aspect::GroupBy,
        ],
        StatementKind::Insert => &[Aspect::Where, Aspect::Fields, Aspect::Limit],
        StatementKind::Update => &[Aspect::Where, Aspect::Fields],
        StatementKind::Delete => &[Aspect::Where],
        StatementKind::Truncate
        | StatementKind::Create
        | StatementKind::Drop
        | StatementKind::Alter => &[],
    }
}

/// All rules of one statement kind, in declaration order.
#[derive(Debug)]
pub struct RuleSet {
    kind: StatementKind,
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            rules: Vec::new(),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// First declared matching rule wins each aspect; a failing check aborts.
    ///
    /// The statement passes if at least one matching rule claimed an aspect or
    /// is a bare table rule. Aspects nobody claims are unrestricted.
    pub fn validate(&self, statement: &Statement) -> Result<()> {
        let table = statement.table();
        let mut done: HashMap<Aspect, bool> = recognized_aspects(self.kind)
            .iter()
            .map(|aspect| (*aspect, false))
            .collect();
        let mut used = false;

        for rule in self.rules.iter().filter(|rule| rule.applies_to(table)) {
            let mut claimed = false;
            for aspect in rule.aspects() {
                if let Some(done) = done.get_mut(&aspect)
                    && !*done
                {
                    *done = true;
                    claimed = true;
                    rule.run(aspect, statement)?;
                }
            }
            used |= claimed || rule.is_bare();
        }

        if used {
            Ok(())
        } else {
            Err(not_allowed(self.kind, table))
        }
    }
}

fn not_allowed(kind: StatementKind, table: &str) -> Error {
    if table.is_empty() {
        Error::StatementNotAllowed(format!("{kind} statements are not permitted"))
    } else {
        Error::StatementNotAllowed(format!("no {kind} rule matches table {table}"))
    }
}

/// Compiled policy for one identity: a rule set per statement kind.
#[derive(Debug, Default)]
pub struct Policy {
    rule_sets: HashMap<StatementKind, RuleSet>,
}

impl Policy {
    pub fn compile(source: &str) -> Self {
        PolicyCompiler::new().source(source).build()
    }

    pub fn from_file(path: &Path) -> std::result::Result<Self, LoadError> {
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::compile(&source))
    }

    pub(crate) fn from_rule_sets(rule_sets: HashMap<StatementKind, RuleSet>) -> Self {
        Self { rule_sets }
    }

    pub fn rules(&self, kind: StatementKind) -> &[Rule] {
        self.rule_sets
            .get(&kind)
            .map(RuleSet::rules)
            .unwrap_or_default()
    }

    pub fn check(&self, statement: &Statement) -> Result<()> {
        match self.rule_sets.get(&statement.kind()) {
            Some(rule_set) => rule_set.validate(statement),
            None => Err(not_allowed(statement.kind(), statement.table())),
        }
    }

    /// Extract and check `sql`, handing it back untouched when allowed.
    pub fn validate<'a>(&self, sql: &'a str) -> Result<&'a str> {
        let statement = extract(sql)?;
        self.check(&statement)?;
        Ok(sql)
    }
}
