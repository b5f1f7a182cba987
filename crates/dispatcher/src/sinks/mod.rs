//! Sink implementations
//!
//! Contains LogSink, ObjectStoreSink and RelationalSink.

mod log;
mod object;
mod relational;

pub use self::log::LogSink;
pub use self::object::ObjectStoreSink;
pub use self::relational::RelationalSink;
