//! CSV data source for the execution engine.
//!
//! Layered bottom-up: [`source`] reads byte chunks from a reopenable source,
//! [`parser`] reassembles row boundaries across chunk splits, and
//! [`datasource`] materializes projected columns into typed batches behind
//! the engine's `DataSource` trait.

pub mod datasource;
pub mod parser;
pub mod source;
