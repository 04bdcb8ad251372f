use quiver_error::{QuiverError, Result};

use super::field::Schema;
use super::scalar::ScalarValue;
use super::vector::Vector;

/// A horizontal slice of a table: a schema plus one vector per field, all of
/// equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBatch {
    schema: Schema,
    columns: Vec<Vector>,
    num_rows: usize,
}

impl RecordBatch {
    /// Create a batch, validating that the columns line up with the schema and
    /// with each other.
    pub fn try_new(schema: Schema, columns: Vec<Vector>) -> Result<Self> {
        if schema.num_fields() != columns.len() {
            return Err(QuiverError::illegal_state(format!(
                "Batch columns ({}) do not match schema fields ({})",
                columns.len(),
                schema.num_fields(),
            )));
        }

        let num_rows = columns.first().map(|c| c.len()).unwrap_or(0);
        for (idx, column) in columns.iter().enumerate() {
            if column.len() != num_rows {
                return Err(QuiverError::illegal_state(format!(
                    "Column {idx} has length {}, expected {num_rows}",
                    column.len(),
                )));
            }
        }

        Ok(RecordBatch {
            schema,
            columns,
            num_rows,
        })
    }

    /// An empty batch with no columns and no rows.
    pub fn empty() -> Self {
        RecordBatch {
            schema: Schema::empty(),
            columns: Vec::new(),
            num_rows: 0,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, idx: usize) -> Option<&Vector> {
        self.columns.get(idx)
    }

    pub fn columns(&self) -> &[Vector] {
        &self.columns
    }

    /// Extract a single row as scalars, in column order.
    pub fn row(&self, idx: usize) -> Option<Vec<ScalarValue>> {
        if idx >= self.num_rows {
            return None;
        }
        self.columns.iter().map(|c| c.scalar(idx)).collect()
    }
}
