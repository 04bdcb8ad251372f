use std::collections::HashMap;
use std::sync::Arc;

use quiver_error::{QuiverError, Result};
use tracing::debug;

use super::expr::{AggregateFunction, BinaryOperator, LogicalExpression};
use super::operator::LogicalPlan;
use crate::ast::{Expr, SelectStatement, Statement, TableFactor, TableReference};
use crate::datasource::DataSource;

/// Plans a parsed SQL statement into a logical plan.
///
/// Restricted to single-table `SELECT ... FROM ... [WHERE ...]`. Table names
/// resolve against a registry populated before planning.
#[derive(Debug, Default)]
pub struct SqlPlanner {
    tables: HashMap<String, Arc<dyn DataSource>>,
}

impl SqlPlanner {
    pub fn new() -> Self {
        SqlPlanner {
            tables: HashMap::new(),
        }
    }

    pub fn register_table(&mut self, name: impl Into<String>, source: Arc<dyn DataSource>) {
        self.tables.insert(name.into(), source);
    }

    pub fn plan_statement(&self, statement: &Statement) -> Result<LogicalPlan> {
        match statement {
            Statement::Select(select) => self.plan_select(select),
            Statement::Unsupported { tag } => Err(QuiverError::sql(format!(
                "Unsupported statement: {tag}"
            ))),
        }
    }

    fn plan_select(&self, select: &SelectStatement) -> Result<LogicalPlan> {
        let mut plan = self.plan_from(select)?;

        if let Some(where_clause) = &select.where_clause {
            let predicate = Self::plan_expr(where_clause)?;
            LogicalPlan::check_boolean_predicate(&predicate)?;
            plan = LogicalPlan::Selection {
                input: Box::new(plan),
                predicate,
            };
        }

        let mut expressions = Vec::with_capacity(select.select_items.len());
        for item in &select.select_items {
            let mut expr = Self::plan_expr(&item.expr)?;
            if let Some(alias) = &item.alias {
                if alias.trim().is_empty() {
                    return Err(QuiverError::sql("Invalid blank alias"));
                }
                expr = LogicalExpression::alias(alias.clone(), expr);
            }
            expressions.push(expr);
        }

        let plan = LogicalPlan::Projection {
            input: Box::new(plan),
            expressions,
        };
        debug!(plan = %plan, "planned select statement");
        Ok(plan)
    }

    fn plan_from(&self, select: &SelectStatement) -> Result<LogicalPlan> {
        let refs = select
            .from
            .as_deref()
            .ok_or_else(|| QuiverError::sql("SELECT without a FROM clause not supported"))?;
        if refs.len() != 1 {
            return Err(QuiverError::sql(
                "Selecting from multiple tables not supported",
            ));
        }

        let factor = match &refs[0] {
            TableReference::Factor(factor) => factor,
            TableReference::LeftRightJoin { .. } | TableReference::InnerCrossJoin { .. } => {
                return Err(QuiverError::sql("Joins not supported"));
            }
        };

        let name = match factor {
            TableFactor::Identifier(name) => strip_backticks(name),
            TableFactor::Unsupported { tag } => {
                return Err(QuiverError::sql(format!(
                    "Unsupported table factor: {tag}"
                )));
            }
        };

        let source = self
            .tables
            .get(name)
            .ok_or_else(|| QuiverError::sql(format!("Unknown table: {name}")))?;

        Ok(LogicalPlan::Scan {
            source_name: name.to_string(),
            source: source.clone(),
            projection: Vec::new(),
        })
    }

    fn plan_expr(expr: &Expr) -> Result<LogicalExpression> {
        Ok(match expr {
            Expr::Identifier(name) => LogicalExpression::column(strip_backticks(name)),
            Expr::Number(text) => {
                let value: f64 = text.parse().map_err(|_| {
                    QuiverError::sql(format!("Invalid number literal: {text}"))
                })?;
                LogicalExpression::literal(value)
            }
            Expr::String(text) => LogicalExpression::literal(strip_quotes(text)),
            Expr::FunctionCall { name, params } => {
                if !name.eq_ignore_ascii_case("sum") {
                    return Err(QuiverError::sql(format!("Unknown function: {name}")));
                }
                if params.len() != 1 {
                    return Err(QuiverError::sql(format!(
                        "SUM takes exactly one argument, got {}",
                        params.len(),
                    )));
                }
                LogicalExpression::Aggregate {
                    func: AggregateFunction::Sum,
                    input: Box::new(Self::plan_expr(&params[0])?),
                }
            }
            Expr::Bit {
                operator,
                left,
                right,
            } => {
                let op = match operator.as_str() {
                    "+" => BinaryOperator::Add,
                    "-" => BinaryOperator::Subtract,
                    "*" => BinaryOperator::Multiply,
                    "/" => BinaryOperator::Divide,
                    other => {
                        return Err(QuiverError::sql(format!(
                            "Unknown arithmetic operator: {other}"
                        )));
                    }
                };
                LogicalExpression::binary(op, Self::plan_expr(left)?, Self::plan_expr(right)?)
            }
            Expr::Comparison {
                operator,
                left,
                right,
            } => {
                let op = match operator.as_str() {
                    "=" => BinaryOperator::Eq,
                    "<>" => BinaryOperator::NotEq,
                    ">" => BinaryOperator::Gt,
                    ">=" => BinaryOperator::GtEq,
                    "<" => BinaryOperator::Lt,
                    "<=" => BinaryOperator::LtEq,
                    other => {
                        return Err(QuiverError::sql(format!(
                            "Unknown comparison operator: {other}"
                        )));
                    }
                };
                LogicalExpression::binary(op, Self::plan_expr(left)?, Self::plan_expr(right)?)
            }
            Expr::And { left, right } => LogicalExpression::binary(
                BinaryOperator::And,
                Self::plan_expr(left)?,
                Self::plan_expr(right)?,
            ),
            Expr::Or { left, right } => LogicalExpression::binary(
                BinaryOperator::Or,
                Self::plan_expr(left)?,
                Self::plan_expr(right)?,
            ),
            Expr::IsNull { expr } => LogicalExpression::is_null(Self::plan_expr(expr)?),
        })
    }
}

/// Strip one layer of back-tick quoting from an identifier.
fn strip_backticks(name: &str) -> &str {
    name.strip_prefix('`')
        .and_then(|s| s.strip_suffix('`'))
        .unwrap_or(name)
}

/// Strip one layer of matching quote characters from a string literal.
fn strip_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}
