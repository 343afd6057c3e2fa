use std::{fmt, str::FromStr};

/// Comparison operators that may appear in a where clause.
///
/// `Any` is only ever produced by the policy grammar; it matches every
/// other operator and is never extracted from SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Eq,
    NotEq,
    GtEq,
    Gt,
    LtEq,
    Lt,
    In,
    Like,
    Any,
}

impl ComparisonOperator {
    pub const ALL: [ComparisonOperator; 9] = [
        Self::Eq,
        Self::NotEq,
        Self::GtEq,
        Self::Gt,
        Self::LtEq,
        Self::Lt,
        Self::In,
        Self::Like,
        Self::Any,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::GtEq => ">=",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::Lt => "<",
            Self::In => "in",
            Self::Like => "like",
            Self::Any => "*",
        }
    }

    /// Operator seen from the other side: `5 < x` is `x > 5`.
    pub fn mirrored(self) -> Self {
        match self {
            Self::GtEq => Self::LtEq,
            Self::Gt => Self::Lt,
            Self::LtEq => Self::GtEq,
            Self::Lt => Self::Gt,
            other => other,
        }
    }

    pub fn matches(self, actual: ComparisonOperator) -> bool {
        self == Self::Any || self == actual
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperator(pub String);

impl FromStr for ComparisonOperator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "!=" {
            return Ok(Self::NotEq);
        }
        Self::ALL
            .into_iter()
            .find(|op| op.symbol().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownOperator(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_parse_back() {
        for op in ComparisonOperator::ALL {
            assert_eq!(op.symbol().parse::<ComparisonOperator>(), Ok(op));
        }
    }

    #[test]
    fn parse_is_lenient_about_case_and_spacing() {
        assert_eq!(" LIKE ".parse::<ComparisonOperator>(), Ok(ComparisonOperator::Like));
        assert_eq!("In".parse::<ComparisonOperator>(), Ok(ComparisonOperator::In));
        assert_eq!("!=".parse::<ComparisonOperator>(), Ok(ComparisonOperator::NotEq));
        assert!("~".parse::<ComparisonOperator>().is_err());
    }

    #[test]
    fn any_matches_everything() {
        for op in ComparisonOperator::ALL {
            assert!(ComparisonOperator::Any.matches(op));
        }
        assert!(!ComparisonOperator::Eq.matches(ComparisonOperator::Like));
    }

    #[test]
    fn mirrored_flips_ordering_only() {
        assert_eq!(ComparisonOperator::Lt.mirrored(), ComparisonOperator::Gt);
        assert_eq!(ComparisonOperator::GtEq.mirrored(), ComparisonOperator::LtEq);
        assert_eq!(ComparisonOperator::Eq.mirrored(), ComparisonOperator::Eq);
        assert_eq!(ComparisonOperator::In.mirrored(), ComparisonOperator::In);
    }
}
