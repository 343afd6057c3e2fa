use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    check::ComparisonPermission,
    operator::{ComparisonOperator, UnknownOperator},
};

/// `column(op, op, ...)`; the column may be `*`.
static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\*|\w+)\s*\(([^)]*)\)").expect("where token pattern"));

/// Permissions named by a policy where expression, e.g. `id(=, in) and *(like)`.
///
/// Connectives between tokens carry no meaning. Unknown operators are dropped;
/// a token left with no operator is dropped too.
pub(super) fn permissions(expr: &str) -> Vec<ComparisonPermission> {
    TOKEN
        .captures_iter(expr)
        .filter_map(|caps| {
            let operators: Vec<ComparisonOperator> = caps[2]
                .split(',')
                .map(str::trim)
                .filter(|op| !op.is_empty())
                .filter_map(|op| match op.parse::<ComparisonOperator>() {
                    Ok(op) => Some(op),
                    Err(UnknownOperator(op)) => {
                        log::trace!("ignoring operator {op:?} for column {}", &caps[1]);
                        None
                    }
                })
                .collect();
            (!operators.is_empty()).then(|| ComparisonPermission::new(&caps[1], operators))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::ComparisonOperator::*;

    #[test]
    fn tokens_become_permissions() {
        assert_eq!(
            permissions("id(=, in) and name (like) or *(<>,>=)"),
            vec![
                ComparisonPermission::new("id", vec![Eq, In]),
                ComparisonPermission::new("name", vec![Like]),
                ComparisonPermission::new("*", vec![NotEq, GtEq]),
            ]
        );
    }

    #[test]
    fn any_operator() {
        assert_eq!(
            permissions("age(*)"),
            vec![ComparisonPermission::new("age", vec![Any])]
        );
    }

    #[test]
    fn unknown_operators_are_dropped() {
        assert_eq!(
            permissions("id(=, between) flag(is) x()"),
            vec![ComparisonPermission::new("id", vec![Eq])]
        );
        assert!(permissions("nothing here").is_empty());
    }
}
