use std::fmt;
use std::sync::Arc;

use futures::stream::{BoxStream, StreamExt};
use quiver_error::{QuiverError, Result};

use super::expr::PhysicalExpression;
use crate::arrays::batch::RecordBatch;
use crate::arrays::compute::filter;
use crate::arrays::field::Schema;
use crate::arrays::vector::Vector;
use crate::datasource::DataSource;
use crate::explain::{Explainable, ExplainEntry};

/// The executable counterpart of a logical plan.
///
/// Execution is pull-based: each node transforms the stream of batches
/// produced by its child. Dropping the stream cancels the query.
#[derive(Debug, Clone)]
pub enum PhysicalPlan {
    Scan(ScanExec),
    Projection(ProjectionExec),
    Selection(SelectionExec),
}

/// Delegates directly to the data source's scan.
#[derive(Debug, Clone)]
pub struct ScanExec {
    pub source: Arc<dyn DataSource>,
    pub projection: Vec<String>,
}

/// Evaluates one expression per output column against every input batch.
#[derive(Debug, Clone)]
pub struct ProjectionExec {
    pub input: Box<PhysicalPlan>,
    /// Output schema, precomputed during planning.
    pub schema: Schema,
    pub expressions: Vec<PhysicalExpression>,
}

/// Filters rows by a boolean expression, preserving row order.
#[derive(Debug, Clone)]
pub struct SelectionExec {
    pub input: Box<PhysicalPlan>,
    pub predicate: PhysicalExpression,
}

impl PhysicalPlan {
    /// Execute, producing a stream of result batches.
    ///
    /// Nothing is read from the underlying source until the stream is
    /// polled.
    pub fn execute(&self) -> BoxStream<'static, Result<RecordBatch>> {
        match self {
            Self::Scan(scan) => scan.source.scan(scan.projection.clone()),
            Self::Projection(projection) => {
                let schema = projection.schema.clone();
                let expressions = projection.expressions.clone();
                projection
                    .input
                    .execute()
                    .map(move |batch| project_batch(&schema, &expressions, batch?))
                    .boxed()
            }
            Self::Selection(selection) => {
                let predicate = selection.predicate.clone();
                selection
                    .input
                    .execute()
                    .map(move |batch| filter_batch(&predicate, batch?))
                    .boxed()
            }
        }
    }

    pub fn children(&self) -> Vec<&PhysicalPlan> {
        match self {
            Self::Scan(_) => Vec::new(),
            Self::Projection(node) => vec![&node.input],
            Self::Selection(node) => vec![&node.input],
        }
    }
}

fn project_batch(
    schema: &Schema,
    expressions: &[PhysicalExpression],
    batch: RecordBatch,
) -> Result<RecordBatch> {
    let columns = expressions
        .iter()
        .map(|expr| expr.eval(&batch))
        .collect::<Result<Vec<_>>>()?;
    RecordBatch::try_new(schema.clone(), columns)
}

fn filter_batch(predicate: &PhysicalExpression, batch: RecordBatch) -> Result<RecordBatch> {
    let selection = match predicate.eval(&batch)? {
        Vector::Boolean(selection) => selection,
        other => {
            return Err(QuiverError::illegal_state(format!(
                "Selection predicate evaluated to non-boolean type {}",
                other.datatype(),
            )));
        }
    };
    if selection.len() != batch.num_rows() {
        return Err(QuiverError::illegal_state(format!(
            "Selection vector length {} does not match batch row count {}",
            selection.len(),
            batch.num_rows(),
        )));
    }

    let columns = batch
        .columns()
        .iter()
        .map(|column| filter::filter(column, &selection))
        .collect::<Result<Vec<_>>>()?;
    RecordBatch::try_new(batch.schema().clone(), columns)
}

impl Explainable for PhysicalPlan {
    fn explain_entry(&self) -> ExplainEntry {
        match self {
            Self::Scan(node) => {
                ExplainEntry::new("ScanExec").with_values("projection", &node.projection)
            }
            Self::Projection(node) => {
                ExplainEntry::new("ProjectionExec").with_values("expressions", &node.expressions)
            }
            Self::Selection(node) => {
                ExplainEntry::new("SelectionExec").with_value("predicate", &node.predicate)
            }
        }
    }
}

impl fmt::Display for PhysicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.explain_entry())
    }
}

/// Render a plan tree depth-first, one node per line, tab-indented per depth.
pub fn format_physical_plan(plan: &PhysicalPlan) -> String {
    fn fmt_node(plan: &PhysicalPlan, depth: usize, out: &mut String) {
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
