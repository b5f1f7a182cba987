//! # Dispatcher
//!
//! Sink stage.
//!
//! Responsibilities:
//! - Serialize batches to JSON or CSV objects
//! - Write tables through a relational connection (SQLite)
//! - Build the configured sink from `SinkConfig`

pub mod dispatcher;
pub mod encode;
pub mod error;
pub mod sinks;

pub use contracts::DataSink;
pub use dispatcher::{create_sink, ConfiguredSink};
pub use encode::{encode, encode_csv, encode_json};
pub use error::DispatcherError;
pub use sinks::{LogSink, ObjectStoreSink, RelationalSink};
