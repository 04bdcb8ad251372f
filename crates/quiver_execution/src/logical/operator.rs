use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use quiver_error::{QuiverError, Result};

use super::expr::LogicalExpression;
use crate::arrays::field::{Field, Schema};
use crate::datasource::DataSource;
use crate::explain::{Explainable, ExplainEntry};

/// A declarative, schema-aware description of a query.
///
/// Built once by the planner and never mutated afterward. Each node owns its
/// children; `Scan` holds a shared handle to its external source.
#[derive(Debug, Clone)]
pub enum LogicalPlan {
    Scan {
        source_name: String,
        source: Arc<dyn DataSource>,
        /// Column names to read, in output order. Empty means all columns in
        /// source order.
        projection: Vec<String>,
    },
    Projection {
        input: Box<LogicalPlan>,
        expressions: Vec<LogicalExpression>,
    },
    Selection {
        input: Box<LogicalPlan>,
        predicate: LogicalExpression,
    },
    Aggregate {
        input: Box<LogicalPlan>,
        group_expressions: Vec<LogicalExpression>,
        aggregate_expressions: Vec<LogicalExpression>,
    },
}

impl LogicalPlan {
    /// Derive this node's output schema.
    ///
    /// Asynchronous since a `Scan` may need to read from its source to learn
    /// the schema.
    pub fn output_schema(&self) -> BoxFuture<'_, Result<Schema>> {
        Box::pin(async move {
            match self {
                Self::Scan {
                    source, projection, ..
                } => {
                    let schema = source.schema().await?;
                    if projection.is_empty() {
                        Ok(schema)
                    } else {
                        schema.select(projection.iter())
                    }
                }
                Self::Projection { input, expressions } => {
                    let mut fields = Vec::with_capacity(expressions.len());
                    for expr in expressions {
                        fields.push(expr.to_field(input).await?);
                    }
                    Ok(Schema::new(fields))
                }
                Self::Selection { input, .. } => input.output_schema().await,
                Self::Aggregate {
                    input,
                    group_expressions,
                    aggregate_expressions,
                } => {
                    let mut fields: Vec<Field> = Vec::new();
                    for expr in group_expressions.iter().chain(aggregate_expressions) {
                        fields.push(expr.to_field(input).await?);
                    }
                    Ok(Schema::new(fields))
                }
            }
        })
    }

    pub fn children(&self) -> Vec<&LogicalPlan> {
        match self {
            Self::Scan { .. } => Vec::new(),
            Self::Projection { input, .. }
            | Self::Selection { input, .. }
            | Self::Aggregate { input, .. } => vec![input],
        }
    }

    /// Validate that a selection predicate is a boolean-producing expression.
    pub fn check_boolean_predicate(predicate: &LogicalExpression) -> Result<()> {
        if !predicate.is_boolean() {
            return Err(QuiverError::sql(format!(
                "Selection predicate must be a boolean expression, got: {predicate}"
            )));
        }
        Ok(())
    }
}

impl Explainable for LogicalPlan {
    fn explain_entry(&self) -> ExplainEntry {
        match self {
            Self::Scan {
                source_name,
                projection,
                ..
            } => ExplainEntry::new("Scan")
                .with_value("source", source_name)
                .with_values("projection", projection),
            Self::Projection { expressions, .. } => {
                ExplainEntry::new("Projection").with_values("expressions", expressions)
            }
            Self::Selection { predicate, .. } => {
                ExplainEntry::new("Selection").with_value("predicate", predicate)
            }
            Self::Aggregate {
                group_expressions,
                aggregate_expressions,
                ..
            } => ExplainEntry::new("Aggregate")
                .with_values("group", group_expressions)
                .with_values("aggregates", aggregate_expressions),
        }
    }
}

impl fmt::Display for LogicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.explain_entry())
    }
}

/// Render a plan tree depth-first, one node per line, tab-indented per depth.
pub fn format_logical_plan(plan: &LogicalPlan) -> String {
    fn fmt_node(plan: &LogicalPlan, depth: usize, out: &mut String) {
        out.push_str(&"\t".repeat(depth));
        out.push_str(&plan.explain_entry().to_string());
        out.push('\n');
        for child in plan.children() {
            fmt_node(child, depth + 1, out);
        }
    }
    let mut out = String::new();
    fmt_node(plan, 0, &mut out);
    out
}
