use sqlparser::ast::{Delete, FromTable};

use super::{conditions::ConditionCollector, table_ref};
use crate::{
    error::{Error, Result},
    statement::{DeleteStmt, Statement},
};

pub(super) fn extract_delete(delete: &Delete) -> Result<Statement> {
    let tables = match &delete.from {
        FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => tables,
    };
    let first = tables
        .first()
        .ok_or_else(|| Error::UnparsableStatement("DELETE without a table".into()))?;
    let table = table_ref(&first.relation)?;

    Ok(Statement::Delete(DeleteStmt {
        conditions: ConditionCollector::collect(&table, delete.selection.as_ref()),
        table: table.name,
    }))
}
