use sqlparser::ast::{BinaryOperator, Expr};

use super::{ColumnRef, TableRef, column_ref};
use crate::{operator::ComparisonOperator, statement::Condition};

/// Walks a where expression and records every comparison touching the target
/// table.
pub(crate) struct ConditionCollector<'a> {
    table: &'a TableRef,
    conditions: Vec<Condition>,
}

impl<'a> ConditionCollector<'a> {
    pub(crate) fn collect(table: &'a TableRef, selection: Option<&Expr>) -> Vec<Condition> {
        let mut collector = Self {
            table,
            conditions: Vec::new(),
        };
        if let Some(expr) = selection {
            collector.visit(expr);
        }
        collector.conditions
    }

    fn visit(&mut self, expr: &Expr) {
        match expr {
            Expr::Nested(inner) => self.visit(inner),
            Expr::BinaryOp {
                left,
                op: BinaryOperator::And | BinaryOperator::Or,
                right,
            } => {
                self.visit(left);
                self.visit(right);
            }
            Expr::BinaryOp { left, op, right } => {
                if let Some(operator) = comparison(op) {
                    self.visit_comparison(left, operator, right);
                }
            }
            Expr::InList { expr, .. } | Expr::InSubquery { expr, .. } => {
                self.visit_operand(expr, ComparisonOperator::In)
            }
            Expr::Like { expr, .. } | Expr::ILike { expr, .. } => {
                self.visit_operand(expr, ComparisonOperator::Like)
            }
            _ => {}
        }
    }

    fn visit_comparison(&mut self, left: &Expr, operator: ComparisonOperator, right: &Expr) {
        if let Some(column) = self.owned_column(left) {
            self.push(column, operator);
        } else if let Some(column) = self.owned_column(right) {
            self.push(column, operator.mirrored());
        }
    }

    fn visit_operand(&mut self, expr: &Expr, operator: ComparisonOperator) {
        if let Some(column) = self.owned_column(expr) {
            self.push(column, operator);
        }
    }

    fn owned_column<'e>(&self, expr: &'e Expr) -> Option<ColumnRef<'e>> {
        column_ref(expr).filter(|column| match column.qualifier {
            None => true,
            Some(qualifier) => self.table.is_named(qualifier),
        })
    }

    fn push(&mut self, column: ColumnRef<'_>, operator: ComparisonOperator) {
        self.conditions.push(Condition::new(column.name, operator));
    }
}

fn comparison(op: &BinaryOperator) -> Option<ComparisonOperator> {
    match op {
        BinaryOperator::Eq => Some(ComparisonOperator::Eq),
        BinaryOperator::NotEq => Some(ComparisonOperator::NotEq),
        BinaryOperator::GtEq => Some(ComparisonOperator::GtEq),
        BinaryOperator::Gt => Some(ComparisonOperator::Gt),
        BinaryOperator::LtEq => Some(ComparisonOperator::LtEq),
        BinaryOperator::Lt => Some(ComparisonOperator::Lt),
        _ => None,
    }
}
