use std::fmt;

use crate::operator::ComparisonOperator;

/// Kind of SQL statement a policy rule can govern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Truncate,
    Create,
    Drop,
    Alter,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Truncate => "truncate",
            Self::Create => "create",
            Self::Drop => "drop",
            Self::Alter => "alter",
        })
    }
}

/// One `column <op> ...` predicate from a where clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub column: String,
    pub operator: ComparisonOperator,
}

impl Condition {
    pub fn new(column: impl Into<String>, operator: ComparisonOperator) -> Self {
        Self {
            column: column.into(),
            operator,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.operator)
    }
}

/// Structural view of a single SQL statement, as far as authorization cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// SELECT fields FROM table [JOIN ...] [WHERE ...] [GROUP BY ...] [ORDER BY ...] [LIMIT n]
    Select(SelectStmt),

    /// INSERT INTO table (fields) VALUES (...), ...
    Insert(InsertStmt),

    /// UPDATE table SET field = ... [WHERE ...]
    Update(UpdateStmt),

    /// DELETE FROM table [WHERE ...]
    Delete(DeleteStmt),

    /// TRUNCATE / CREATE / DROP / ALTER; carries no facets.
    Structural(StatementKind),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectStmt {
    pub table: String,
    pub fields: Vec<String>,
    pub conditions: Vec<Condition>,
    pub limit: Option<u64>,
    pub order_by: Vec<String>,
    pub group_by: Vec<String>,
    pub inner_joins: Vec<String>,
    pub outer_joins: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertStmt {
    pub table: String,
    pub fields: Vec<String>,
    /// Number of row tuples supplied, not a result limit.
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateStmt {
    pub table: String,
    pub fields: Vec<String>,
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteStmt {
    pub table: String,
    pub conditions: Vec<Condition>,
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self {
            Self::Select(_) => StatementKind::Select,
            Self::Insert(_) => StatementKind::Insert,
            Self::Update(_) => StatementKind::Update,
            Self::Delete(_) => StatementKind::Delete,
            Self::Structural(kind) => *kind,
        }
    }

    /// Target table; empty for structural statements.
    pub fn table(&self) -> &str {
        match self {
            Self::Select(s) => &s.table,
            Self::Insert(s) => &s.table,
            Self::Update(s) => &s.table,
            Self::Delete(s) => &s.table,
            Self::Structural(_) => "",
        }
    }

    pub fn fields(&self) -> &[String] {
        match self {
            Self::Select(s) => &s.fields,
            Self::Insert(s) => &s.fields,
            Self::Update(s) => &s.fields,
            Self::Delete(_) | Self::Structural(_) => &[],
        }
    }

    pub fn conditions(&self) -> &[Condition] {
        match self {
            Self::Select(s) => &s.conditions,
            Self::Update(s) => &s.conditions,
            Self::Delete(s) => &s.conditions,
            Self::Insert(_) | Self::Structural(_) => &[],
        }
    }

    pub fn limit(&self) -> Option<u64> {
        match self {
            Self::Select(s) => s.limit,
            Self::Insert(s) => s.limit,
            _ => None,
        }
    }

    pub fn order_by(&self) -> &[String] {
        match self {
            Self::Select(s) => &s.order_by,
            _ => &[],
        }
    }

    pub fn group_by(&self) -> &[String] {
        match self {
            Self::Select(s) => &s.group_by,
            _ => &[],
        }
    }

    pub fn inner_joins(&self) -> &[String] {
        match self {
            Self::Select(s) => &s.inner_joins,
            _ => &[],
        }
    }

    pub fn outer_joins(&self) -> &[String] {
        match self {
            Self::Select(s) => &s.outer_joins,
            _ => &[],
        }
    }
}
