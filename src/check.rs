//! Aspect checks produced by the policy compiler.
//!
//! Failure messages are part of the contract with policy authors and must not
//! change.

use crate::{
    error::{Error, Result},
    operator::ComparisonOperator,
    rule::Check,
    statement::{Condition, Statement},
};

/// Wording of a list check failure: `"{noun} [a, b] {action}"`.
#[derive(Debug, Clone, Copy)]
pub struct ListMessage {
    pub noun: &'static str,
    pub action: &'static str,
}

impl ListMessage {
    pub const QUERIED: Self = Self::fields("cannot be queried");
    pub const INSERTED: Self = Self::fields("cannot be inserted");
    pub const UPDATED: Self = Self::fields("cannot be updated");
    pub const ORDER_BY: Self = Self::fields("cannot be used in order by");
    pub const GROUP_BY: Self = Self::fields("cannot be used in group by");
    pub const INNER_JOIN: Self = Self::tables("cannot be inner joined");
    pub const OUTER_JOIN: Self = Self::tables("cannot be outer joined");

    const fn fields(action: &'static str) -> Self {
        Self {
            noun: "Fields",
            action,
        }
    }

    const fn tables(action: &'static str) -> Self {
        Self {
            noun: "Tables",
            action,
        }
    }

    fn format(&self, excess: &[&str]) -> String {
        format!("{} [{}] {}", self.noun, excess.join(", "), self.action)
    }
}

/// Accessor for the list facet a check inspects.
pub type ListAccessor = fn(&Statement) -> &[String];

/// Every requested item must be allowed, unless `*` is allowed or nothing is
/// requested.
pub fn listed(allowed: Vec<String>, items: ListAccessor, message: ListMessage) -> Check {
    Box::new(move |statement: &Statement| {
        if allowed.iter().any(|a| a == "*") {
            return Ok(());
        }
        let excess: Vec<&str> = items(statement)
            .iter()
            .filter(|item| !allowed.contains(*item))
            .map(String::as_str)
            .collect();
        if excess.is_empty() {
            Ok(())
        } else {
            Err(Error::AspectViolation(message.format(&excess)))
        }
    })
}

/// The statement must carry a limit no greater than `ceiling`.
pub fn limit(ceiling: u64) -> Check {
    Box::new(move |statement: &Statement| match statement.limit() {
        None => Err(Error::AspectViolation(
            "Query must be limited but was not".into(),
        )),
        Some(actual) if actual > ceiling => Err(Error::AspectViolation(format!(
            "Actual limit {actual} exceeds required one {ceiling}"
        ))),
        Some(_) => Ok(()),
    })
}

/// Which where-clause comparisons a policy permits on which column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonPermission {
    pub column: String,
    pub operators: Vec<ComparisonOperator>,
}

impl ComparisonPermission {
    pub fn new(column: impl Into<String>, operators: Vec<ComparisonOperator>) -> Self {
        Self {
            column: column.into(),
            operators,
        }
    }

    pub fn covers(&self, condition: &Condition) -> bool {
        (self.column == "*" || self.column == condition.column)
            && self
                .operators
                .iter()
                .any(|op| op.matches(condition.operator))
    }
}

/// Every condition must be covered by a permission, and a where clause must
/// be present once permissions are configured.
pub fn conditions(permissions: Vec<ComparisonPermission>) -> Check {
    Box::new(move |statement: &Statement| {
        let conditions = statement.conditions();
        if let Some(forbidden) = conditions
            .iter()
            .find(|c| !permissions.iter().any(|p| p.covers(c)))
        {
            return Err(Error::AspectViolation(format!(
                "Condition {forbidden} is forbidden"
            )));
        }
        if conditions.is_empty() && !permissions.is_empty() {
            return Err(Error::AspectViolation(
                "Where clause is required here".into(),
            ));
        }
        Ok(())
    })
}
