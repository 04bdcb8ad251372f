//! Shared test fixtures.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{self, BoxStream, StreamExt};
use quiver_error::Result;

use crate::arrays::batch::RecordBatch;
use crate::arrays::field::Schema;
use crate::arrays::vector::Vector;
use crate::datasource::DataSource;
use crate::logical::operator::LogicalPlan;

/// In-memory table backed by pre-built batches.
#[derive(Debug)]
pub struct MemoryDataSource {
    schema: Schema,
    batches: Vec<RecordBatch>,
}

impl MemoryDataSource {
    pub fn new(schema: Schema, batches: Vec<RecordBatch>) -> Self {
        MemoryDataSource { schema, batches }
    }

    pub fn empty(schema: Schema) -> Self {
        MemoryDataSource {
            schema,
            batches: Vec::new(),
        }
    }
}

impl DataSource for MemoryDataSource {
    fn schema(&self) -> BoxFuture<'_, Result<Schema>> {
        Box::pin(async { Ok(self.schema.clone()) })
    }

    fn scan(&self, projection: Vec<String>) -> BoxStream<'static, Result<RecordBatch>> {
        let schema = self.schema.clone();
        let batches = self.batches.clone();
        let results = batches.into_iter().map(move |batch| {
            if projection.is_empty() {
                return Ok(batch);
            }
            let projected = schema.select(projection.iter())?;
            let columns = projection
                .iter()
                .map(|name| {
                    let (idx, _) = schema
                        .field_by_name(name)
                        .ok_or_else(|| quiver_error::QuiverError::sql(format!(
                            "Unknown field name: {name}"
                        )))?;
                    batch
                        .column(idx)
                        .cloned()
                        .ok_or_else(|| quiver_error::QuiverError::illegal_state("missing column"))
                })
                .collect::<Result<Vec<Vector>>>()?;
            RecordBatch::try_new(projected, columns)
        });
        stream::iter(results.collect::<Vec<_>>()).boxed()
    }
}

/// A `Scan` over an empty in-memory source with the given schema.
pub fn memory_scan(name: &str, schema: Schema) -> LogicalPlan {
    LogicalPlan::Scan {
        source_name: name.to_string(),
        source: Arc::new(MemoryDataSource::empty(schema)),
        projection: Vec::new(),
    }
}
