use sqlparser::ast::{Insert, SetExpr, TableObject};

use super::object_name;
use crate::{
    error::{Error, Result},
    statement::{InsertStmt, Statement},
};

pub(super) fn extract_insert(insert: &Insert) -> Result<Statement> {
    let table = match &insert.table {
        TableObject::TableName(name) => object_name(name),
        _ => None,
    }
    .ok_or_else(|| Error::UnparsableStatement("unsupported INSERT target".into()))?;

    if insert.columns.is_empty() {
        return Err(Error::UnparsableStatement(
            "INSERT without a column list is not supported".into(),
        ));
    }
    let fields = insert
        .columns
        .iter()
        .map(|column| column.value.clone())
        .collect();

    // Row count of a VALUES list; INSERT ... SELECT stays unbounded.
    let limit = insert
        .source
        .as_ref()
        .and_then(|source| match source.body.as_ref() {
            SetExpr::Values(values) => Some(values.rows.len() as u64),
            _ => None,
        });

    Ok(Statement::Insert(InsertStmt {
        table,
        fields,
        limit,
    }))
}
