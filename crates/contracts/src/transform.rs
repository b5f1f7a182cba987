//! Transform trait - pure batch-to-batch step

use crate::{Batch, ContractError};

/// A pure, deterministic batch transformation
///
/// Implementations borrow the input and return a new batch; they perform no I/O.
pub trait Transform: Send + Sync {
    /// Display name, used as the stage name in run results
    fn name(&self) -> &str;

    /// Apply the transformation
    ///
    /// # Errors
    /// `TransformType` when a column or value has the wrong type
    fn apply(&self, batch: &Batch) -> Result<Batch, ContractError>;
}
