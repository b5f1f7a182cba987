//! DataSource trait - first stage of a pipeline
//!
//! A source is bound to one location when constructed and produces
//! exactly one batch per `fetch` call.

use crate::{Batch, ContractError};

/// Data input trait
///
/// All source implementations must implement this trait.
#[trait_variant::make(DataSource: Send)]
pub trait LocalDataSource {
    /// Source name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Human-readable location (URL, path, bucket/key)
    fn location(&self) -> String;

    /// Load the whole payload into a batch
    ///
    /// # Errors
    /// - `SourceUnavailable` when the location cannot be reached
    /// - `SourceFormat` when the payload is not row/column shaped
    async fn fetch(&self) -> Result<Batch, ContractError>;
}
