//! # Transform
//!
//! Built-in batch transforms and their construction from `TransformConfig`.
//!
//! Every transform borrows its input and returns a new `Batch`; on failure the
//! input is untouched and the error names the column and row at fault.

mod drop_missing;
mod parse_date;
mod scale;

pub use drop_missing::DropMissing;
pub use parse_date::ParseDate;
pub use scale::ScaleNumeric;

use contracts::{Batch, ContractError, Transform, TransformConfig};

/// Build one transform from its configuration
pub fn build_transform(config: &TransformConfig) -> Box<dyn Transform> {
    match config {
        TransformConfig::DropMissing { columns } => Box::new(DropMissing::new(columns.clone())),
        TransformConfig::ParseDate { column, format } => {
            Box::new(ParseDate::new(column.clone()).with_format(format.clone()))
        }
        TransformConfig::Scale { factor, columns } => {
            Box::new(ScaleNumeric::new(*factor, columns.clone()))
        }
    }
}

/// Build the configured transform chain, in order
pub fn build_transforms(configs: &[TransformConfig]) -> Vec<Box<dyn Transform>> {
    configs.iter().map(build_transform).collect()
}

/// Position of a named column, or a type error naming it
pub(crate) fn require_column(
    transform: &str,
    batch: &Batch,
    column: &str,
) -> Result<usize, ContractError> {
    batch.schema().index_of(column).ok_or_else(|| {
        ContractError::transform_type(transform, column, None, "column not found in batch")
    })
}
