//! Single-node SQL execution over streaming columnar batches.
//!
//! The pipeline: an externally parsed SQL AST is planned into a
//! [`logical::operator::LogicalPlan`], compiled by the query planner into a
//! [`physical::plan::PhysicalPlan`], and executed as a pull-based stream of
//! [`arrays::batch::RecordBatch`]es.

pub mod arrays;
pub mod ast;
pub mod datasource;
pub mod explain;
pub mod logical;
pub mod physical;

#[cfg(test)]
pub(crate) mod test_util;
