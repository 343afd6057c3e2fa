use sqlparser::ast::{AssignmentTarget, Update};

use super::{conditions::ConditionCollector, object_name, table_ref};
use crate::{
    error::Result,
    statement::{Statement, UpdateStmt},
};

pub(super) fn extract_update(update: &Update) -> Result<Statement> {
    let table = table_ref(&update.table.relation)?;

    let mut fields: Vec<String> = Vec::new();
    for assignment in &update.assignments {
        let targets = match &assignment.target {
            AssignmentTarget::ColumnName(name) => std::slice::from_ref(name),
            AssignmentTarget::Tuple(names) => names.as_slice(),
        };
        for field in targets.iter().filter_map(object_name) {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
    }

    Ok(Statement::Update(UpdateStmt {
        conditions: ConditionCollector::collect(&table, update.selection.as_ref()),
        fields,
        table: table.name,
    }))
}
