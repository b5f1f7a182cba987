//! DataSink trait - last stage of a pipeline
//!
//! Defines the abstract interface for Sinks.

use serde::Serialize;

use crate::{Batch, ContractError};

/// Acknowledgment of a successful write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ack {
    /// Sink that performed the write
    pub sink: String,

    /// Where the data went (object key, table name, ...)
    pub destination: String,

    /// Rows written
    pub rows_written: usize,

    /// Encoded size, when the sink serializes the batch itself
    pub bytes_written: Option<usize>,
}

/// Data output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(DataSink: Send)]
pub trait LocalDataSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Persist the batch at the sink's destination
    ///
    /// # Errors
    /// - `SinkUnavailable` on connection/auth failure
    /// - `SinkWrite` when the destination rejects the data
    async fn persist(&mut self, batch: &Batch) -> Result<Ack, ContractError>;
}
