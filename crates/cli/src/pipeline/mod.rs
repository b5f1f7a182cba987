//! Pipeline assembly and run statistics.

mod orchestrator;
mod stats;

pub use orchestrator::{Pipeline, RunOptions};
pub use stats::PipelineStats;
