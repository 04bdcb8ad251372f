use futures::future::BoxFuture;
use quiver_error::{not_implemented, QuiverError, Result};
use tracing::debug;

use super::expr::{PhysicalBinaryOp, PhysicalExpression};
use super::plan::{PhysicalPlan, ProjectionExec, ScanExec, SelectionExec};
use crate::arrays::field::Schema;
use crate::logical::expr::{BinaryOperator, LogicalExpression};
use crate::logical::operator::LogicalPlan;

/// Compiles a logical plan into an executable physical plan.
///
/// A pure, single-pass, depth-first transform. Column names are resolved to
/// positional indices here, against each node's logical input schema, and
/// never re-resolved during execution. Fails fast: no partial physical plan
/// is ever returned.
#[derive(Debug, Default)]
pub struct QueryPlanner;

impl QueryPlanner {
    pub fn new() -> Self {
        QueryPlanner
    }

    pub fn create_physical_plan<'a>(
        &'a self,
        plan: &'a LogicalPlan,
    ) -> BoxFuture<'a, Result<PhysicalPlan>> {
        Box::pin(async move {
            let physical = match plan {
                LogicalPlan::Scan {
                    source, projection, ..
                } => PhysicalPlan::Scan(ScanExec {
                    source: source.clone(),
                    projection: projection.clone(),
                }),
                LogicalPlan::Projection { input, expressions } => {
                    let physical_input = self.create_physical_plan(input).await?;
                    let input_schema = input.output_schema().await?;

                    let mut fields = Vec::with_capacity(expressions.len());
                    let mut physical_exprs = Vec::with_capacity(expressions.len());
                    for expr in expressions {
                        fields.push(expr.to_field(input).await?);
                        physical_exprs.push(Self::create_physical_expr(expr, &input_schema)?);
                    }

                    PhysicalPlan::Projection(ProjectionExec {
                        input: Box::new(physical_input),
                        schema: Schema::new(fields),
                        expressions: physical_exprs,
                    })
                }
                LogicalPlan::Selection { input, predicate } => {
                    let physical_input = self.create_physical_plan(input).await?;
                    let input_schema = input.output_schema().await?;
                    let predicate = Self::create_physical_expr(predicate, &input_schema)?;

                    PhysicalPlan::Selection(SelectionExec {
                        input: Box::new(physical_input),
                        predicate,
                    })
                }
                LogicalPlan::Aggregate { .. } => {
                    not_implemented!("physical aggregate execution")
                }
            };
            debug!(plan = %physical, "compiled physical plan node");
            Ok(physical)
        })
    }

    /// Compile a logical expression against the logical input schema.
    fn create_physical_expr(
        expr: &LogicalExpression,
        input_schema: &Schema,
    ) -> Result<PhysicalExpression> {
        match expr {
            LogicalExpression::Literal(value) => Ok(PhysicalExpression::Literal(value.clone())),
            LogicalExpression::Column(name) => {
                let (idx, _) = input_schema
                    .field_by_name(name)
                    .ok_or_else(|| QuiverError::sql(format!("No column named: {name}")))?;
                Ok(PhysicalExpression::Column(idx))
            }
            // An alias only renames the output field, which was already
            // derived for the projection schema. Compile the inner
            // expression.
            LogicalExpression::Alias { expr, .. } => {
                Self::create_physical_expr(expr, input_schema)
            }
            LogicalExpression::Binary { op, left, right } => {
                let left = Self::create_physical_expr(left, input_schema)?;
                let right = Self::create_physical_expr(right, input_schema)?;
                let op = match op {
                    BinaryOperator::Eq => PhysicalBinaryOp::Eq,
                    BinaryOperator::And => PhysicalBinaryOp::And,
                    BinaryOperator::Or => PhysicalBinaryOp::Or,
                    other => {
                        return Err(QuiverError::illegal_state(format!(
                            "Unmapped binary operator in physical planning: {other:?}"
                        )));
                    }
                };
                Ok(PhysicalExpression::binary(op, left, right))
            }
            LogicalExpression::Aggregate { func, .. } => {
                not_implemented!("physical aggregate expression: {func}")
            }
        }
    }
}
