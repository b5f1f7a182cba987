//! # Runner
//!
//! Pipeline runner: one source fetch, the configured transforms in order, one
//! sink persist.
//!
//! ## Usage Example
//!
//! ```ignore
//! use runner::PipelineRunner;
//!
//! let mut runner = PipelineRunner::new("csv-to-db", source, transforms, sink)
//!     .with_timeouts(&config.timeouts);
//!
//! let result = runner.run().await;
//! if let Err(failure) = &result.outcome {
//!     eprintln!("{} failed: {}", failure.stage, failure.kind());
//! }
//! ```

mod result;
mod runner;

pub use result::{RunResult, RunStats, StageFailure, StageTiming};
pub use runner::PipelineRunner;
