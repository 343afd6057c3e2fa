use sqlparser::ast::{
    GroupByExpr, JoinOperator, LimitClause, OrderByKind, Query, SelectItem, SetExpr,
    TableWithJoins,
};

use super::{
    column_names, column_ref, conditions::ConditionCollector, literal_u64, table_ref,
};
use crate::{
    error::{Error, Result},
    statement::{SelectStmt, Statement},
};

pub(super) fn extract_select(query: &Query) -> Result<Statement> {
    // A CTE can shadow a table name, so the from-item would lie.
    if query.with.is_some() {
        return Err(Error::UnparsableStatement(
            "WITH clauses are not supported".into(),
        ));
    }
    let SetExpr::Select(select) = query.body.as_ref() else {
        return Err(Error::UnparsableStatement(format!(
            "only plain SELECT queries are supported, got `{}`",
            query.body
        )));
    };

    let (first, others) = select
        .from
        .split_first()
        .ok_or_else(|| Error::UnparsableStatement("SELECT without a table".into()))?;
    let table = table_ref(&first.relation)?;

    let mut inner_joins = Vec::new();
    let mut outer_joins = Vec::new();
    collect_joins(first, &mut inner_joins, &mut outer_joins)?;
    for other in others {
        inner_joins.push(table_ref(&other.relation)?.name);
        collect_joins(other, &mut inner_joins, &mut outer_joins)?;
    }

    let group_by = match &select.group_by {
        GroupByExpr::Expressions(exprs, _) => column_names(exprs),
        _ => Vec::new(),
    };

    Ok(Statement::Select(SelectStmt {
        fields: projection_fields(&select.projection),
        conditions: ConditionCollector::collect(&table, select.selection.as_ref()),
        limit: literal_limit(query),
        order_by: order_by_columns(query),
        group_by,
        inner_joins,
        outer_joins,
        table: table.name,
    }))
}

fn collect_joins(
    from: &TableWithJoins,
    inner: &mut Vec<String>,
    outer: &mut Vec<String>,
) -> Result<()> {
    for join in &from.joins {
        let joined = table_ref(&join.relation)?.name;
        if is_outer(&join.join_operator) {
            outer.push(joined);
        } else {
            inner.push(joined);
        }
    }
    Ok(())
}

fn is_outer(op: &JoinOperator) -> bool {
    matches!(
        op,
        JoinOperator::Left(_)
            | JoinOperator::LeftOuter(_)
            | JoinOperator::RightOuter(_)
            | JoinOperator::FullOuter(_)
    )
}

fn projection_fields(items: &[SelectItem]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(..) => Some("*".to_string()),
            SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } => {
                column_ref(expr).map(|column| column.name.to_string())
            }
        })
        .collect()
}

fn literal_limit(query: &Query) -> Option<u64> {
    match query.limit_clause.as_ref()? {
        LimitClause::LimitOffset { limit, .. } => limit.as_ref().and_then(literal_u64),
        LimitClause::OffsetCommaLimit { limit, .. } => literal_u64(limit),
    }
}

fn order_by_columns(query: &Query) -> Vec<String> {
    match query.order_by.as_ref().map(|order_by| &order_by.kind) {
        Some(OrderByKind::Expressions(exprs)) => exprs
            .iter()
            .filter_map(|e| column_ref(&e.expr))
            .map(|column| column.name.to_string())
            .collect(),
        _ => Vec::new(),
    }
}
