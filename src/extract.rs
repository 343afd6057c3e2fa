mod conditions;
mod delete;
mod insert;
mod select;
mod update;

use sqlparser::{
    ast::{Expr, ObjectName, ObjectNamePart, Statement as SqlStatement, TableFactor, Value},
    dialect::GenericDialect,
    parser::Parser,
};

use crate::{
    error::{Error, Result},
    statement::{Statement, StatementKind},
};

static DIALECT: GenericDialect = GenericDialect {};

/// Parse one SQL statement and reduce it to the facets authorization needs.
pub fn extract(sql: &str) -> Result<Statement> {
    let mut statements = Parser::parse_sql(&DIALECT, sql)
        .map_err(|e| Error::UnparsableStatement(e.to_string()))?;

    match statements.len() {
        1 => from_ast(&statements.remove(0)),
        0 => Err(Error::UnparsableStatement("no statement found".into())),
        n => Err(Error::UnparsableStatement(format!(
            "expected a single statement, found {n}"
        ))),
    }
}

/// Reduce an already parsed statement.
pub fn from_ast(statement: &SqlStatement) -> Result<Statement> {
    match statement {
        SqlStatement::Query(query) => select::extract_select(query),
        SqlStatement::Insert(insert) => insert::extract_insert(insert),
        SqlStatement::Update(update) => update::extract_update(update),
        SqlStatement::Delete(delete) => delete::extract_delete(delete),
        SqlStatement::Truncate { .. } => Ok(Statement::Structural(StatementKind::Truncate)),
        SqlStatement::CreateTable { .. }
        | SqlStatement::CreateView { .. }
        | SqlStatement::CreateIndex { .. } => Ok(Statement::Structural(StatementKind::Create)),
        SqlStatement::Drop { .. } => Ok(Statement::Structural(StatementKind::Drop)),
        SqlStatement::AlterTable { .. } => Ok(Statement::Structural(StatementKind::Alter)),
        other => Err(Error::UnparsableStatement(format!(
            "unsupported statement `{other}`"
        ))),
    }
}

/// A plain table reference from a FROM, JOIN or DML target.
#[derive(Debug, Clone)]
pub(crate) struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    /// Whether a column qualifier refers to this table.
    fn is_named(&self, qualifier: &str) -> bool {
        self.name.eq_ignore_ascii_case(qualifier)
            || self
                .alias
                .as_deref()
                .is_some_and(|alias| alias.eq_ignore_ascii_case(qualifier))
    }
}

pub(crate) fn table_ref(factor: &TableFactor) -> Result<TableRef> {
    match factor {
        TableFactor::Table { name, alias, .. } => {
            let table = object_name(name).ok_or_else(|| {
                Error::UnparsableStatement(format!("unsupported table name `{name}`"))
            })?;
            Ok(TableRef {
                name: table,
                alias: alias.as_ref().map(|a| a.name.value.clone()),
            })
        }
        other => Err(Error::UnparsableStatement(format!(
            "only plain table references are supported, got `{other}`"
        ))),
    }
}

/// Last identifier of a possibly schema-qualified name.
pub(crate) fn object_name(name: &ObjectName) -> Option<String> {
    name.0.last().and_then(|part| match part {
        ObjectNamePart::Identifier(ident) => Some(ident.value.clone()),
        _ => None,
    })
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ColumnRef<'a> {
    pub qualifier: Option<&'a str>,
    pub name: &'a str,
}

/// `col`, `t.col` or `(col)`; anything computed yields `None`.
pub(crate) fn column_ref(expr: &Expr) -> Option<ColumnRef<'_>> {
    match expr {
        Expr::Identifier(ident) => Some(ColumnRef {
            qualifier: None,
            name: &ident.value,
        }),
        Expr::CompoundIdentifier(parts) => {
            let (last, rest) = parts.split_last()?;
            Some(ColumnRef {
                qualifier: rest.last().map(|ident| ident.value.as_str()),
                name: &last.value,
            })
        }
        Expr::Nested(inner) => column_ref(inner),
        _ => None,
    }
}

pub(crate) fn column_names(exprs: &[Expr]) -> Vec<String> {
    exprs
        .iter()
        .filter_map(column_ref)
        .map(|column| column.name.to_string())
        .collect()
}

pub(crate) fn literal_u64(expr: &Expr) -> Option<u64> {
    match expr {
        Expr::Value(v) => match &v.value {
            Value::Number(n, _) => n.parse().ok(),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        operator::ComparisonOperator::{self, *},
        statement::{Condition, DeleteStmt, InsertStmt, SelectStmt, UpdateStmt},
    };

    fn conds(pairs: &[(&str, ComparisonOperator)]) -> Vec<Condition> {
        pairs.iter().map(|(c, op)| Condition::new(*c, *op)).collect()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn select(sql: &str) -> SelectStmt {
        match extract(sql) {
            Ok(Statement::Select(s)) => s,
            other => panic!("expected select, got {other:?}"),
        }
    }

    #[test]
    fn simple_select() {
        let s = select("SELECT id, name FROM people WHERE id = 1 LIMIT 5");
        assert_eq!(
            s,
            SelectStmt {
                table: "people".into(),
                fields: strings(&["id", "name"]),
                conditions: conds(&[("id", Eq)]),
                limit: Some(5),
                ..Default::default()
            }
        );
    }

    #[test]
    fn select_star_and_computed_fields() {
        let s = select("select *, count(id), p.name as n from people p");
        assert_eq!(s.fields, strings(&["*", "name"]));
        let s = select("select p.* from people p");
        assert_eq!(s.fields, strings(&["*"]));
    }

    #[test]
    fn where_flattens_and_or_trees() {
        let s = select(
            "select * from t where (a = 1 or b <> 2) and c >= 3 and d < 4 \
             and e in (1, 2) and f like 'x%' and g > 0 and h <= 9",
        );
        assert_eq!(
            s.conditions,
            conds(&[
                ("a", Eq),
                ("b", NotEq),
                ("c", GtEq),
                ("d", Lt),
                ("e", In),
                ("f", Like),
                ("g", Gt),
                ("h", LtEq),
            ])
        );
    }

    #[test]
    fn where_mirrors_operator_when_column_is_on_the_right() {
        let s = select("select * from t where 5 < age");
        assert_eq!(s.conditions, conds(&[("age", Gt)]));
    }

    #[test]
    fn where_drops_columns_of_other_tables() {
        let s = select(
            "select * from people p join cars c on c.owner = p.id \
             where p.age > 18 and c.brand = 'x' and people.name = 'y' and city = 'z'",
        );
        assert_eq!(
            s.conditions,
            conds(&[("age", Gt), ("name", Eq), ("city", Eq)])
        );
    }

    #[test]
    fn joins_are_classified() {
        let s = select(
            "select * from a join b on a.id = b.id \
             inner join c on a.id = c.id \
             left join d on a.id = d.id \
             left outer join e on a.id = e.id \
             right join f on a.id = f.id",
        );
        assert_eq!(s.inner_joins, strings(&["b", "c", "f"]));
        assert_eq!(s.outer_joins, strings(&["d", "e"]));
    }

    #[test]
    fn comma_joins_count_as_inner() {
        let s = select("select * from a, b where a.id = b.id");
        assert_eq!(s.table, "a");
        assert_eq!(s.inner_joins, strings(&["b"]));
    }

    #[test]
    fn order_and_group_by() {
        let s = select("select a, count(*) from t group by a, b order by a desc, lower(b)");
        assert_eq!(s.group_by, strings(&["a", "b"]));
        assert_eq!(s.order_by, strings(&["a"]));
        assert_eq!(s.limit, None);
    }

    #[test]
    fn non_literal_limit_is_absent() {
        assert_eq!(select("select * from t limit 10 offset 5").limit, Some(10));
        assert_eq!(select("select * from t limit ?").limit, None);
    }

    #[test]
    fn insert_counts_rows() {
        let stmt = extract("insert into people (name, age) values ('a', 1), ('b', 2)");
        assert_eq!(
            stmt,
            Ok(Statement::Insert(InsertStmt {
                table: "people".into(),
                fields: strings(&["name", "age"]),
                limit: Some(2),
            }))
        );

        let stmt = extract("insert into people (name) select name from other");
        assert_eq!(stmt.map(|s| s.limit()), Ok(None));
    }

    #[test]
    fn update_collects_assigned_fields() {
        let stmt = extract("update people set name = 'x', age = age + 1, name = 'y' where id = 3");
        assert_eq!(
            stmt,
            Ok(Statement::Update(UpdateStmt {
                table: "people".into(),
                fields: strings(&["name", "age"]),
                conditions: conds(&[("id", Eq)]),
            }))
        );
    }

    #[test]
    fn delete_conditions() {
        let stmt = extract("delete from people where id in (select id from other) or age < 3");
        assert_eq!(
            stmt,
            Ok(Statement::Delete(DeleteStmt {
                table: "people".into(),
                conditions: conds(&[("id", In), ("age", Lt)]),
            }))
        );
    }

    #[test]
    fn structural_kinds() {
        assert_eq!(
            extract("drop table people").map(|s| s.kind()),
            Ok(StatementKind::Drop)
        );
        assert_eq!(
            extract("create table t (id int)").map(|s| s.kind()),
            Ok(StatementKind::Create)
        );
        assert_eq!(
            extract("truncate table t").map(|s| s.kind()),
            Ok(StatementKind::Truncate)
        );
    }

    #[test]
    fn unparsable_inputs() {
        for sql in [
            "",
            "selec * fro t",
            "select 1",
            "select * from (select * from t) x",
            "select * from a union select * from b",
            "select * from t; drop table t",
            "with public_t as (select * from secret) select * from public_t",
            "insert into people values ('x', 'secret')",
        ] {
            assert!(
                matches!(extract(sql), Err(Error::UnparsableStatement(_))),
                "{sql} should be unparsable"
            );
        }
    }
}
