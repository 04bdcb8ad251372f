use std::fmt::Debug;

use futures::future::BoxFuture;
use futures::stream::BoxStream;
use quiver_error::Result;

use crate::arrays::batch::RecordBatch;
use crate::arrays::field::Schema;

/// A scannable table.
///
/// Implementations are shared across plan nodes behind an `Arc`, so scanning
/// takes `&self` and each `scan` call is an independent pass over the source.
pub trait DataSource: Debug + Sync + Send {
    /// Get the source's schema.
    ///
    /// May require reading from the source, for example to infer column types
    /// from a header row. Fails if the source is empty and no schema was
    /// provided up front.
    fn schema(&self) -> BoxFuture<'_, Result<Schema>>;

    /// Scan the source, producing batches restricted and reordered to the
    /// given projection. An empty projection means all columns in source
    /// order.
    fn scan(&self, projection: Vec<String>) -> BoxStream<'static, Result<RecordBatch>>;
}
