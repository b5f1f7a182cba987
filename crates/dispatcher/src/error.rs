//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Batch could not be serialized
    #[error("cannot encode batch as {format}: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },

    /// Connection string names a database this crate cannot open
    #[error("unsupported database url '{url}': expected sqlite://<path>, sqlite:<path> or sqlite::memory:")]
    UnsupportedUrl { url: String },
}

impl DispatcherError {
    /// Create an encode error
    pub fn encode(format: &'static str, message: impl Into<String>) -> Self {
        Self::Encode {
            format,
            message: message.into(),
        }
    }
}
