//! Layered error definitions
//!
//! Categorized by stage: config / source / transform / sink

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Source Errors =====
    /// Endpoint, file or object could not be reached
    #[error("source '{location}' unavailable: {message}")]
    SourceUnavailable { location: String, message: String },

    /// Payload could not be read as rows and columns
    #[error("source '{location}' format error: {message}")]
    SourceFormat { location: String, message: String },

    // ===== Transform Errors =====
    /// A value or column did not have the type a transform requires
    #[error("transform '{transform}' type error{}: {message}", fmt_position(.column, .row))]
    TransformType {
        transform: String,
        column: Option<String>,
        row: Option<usize>,
        message: String,
    },

    // ===== Batch Errors =====
    /// Rows did not conform to the batch schema
    #[error("schema mismatch{}: {message}", fmt_row(.row))]
    SchemaMismatch { row: Option<usize>, message: String },

    // ===== Sink Errors =====
    /// Sink connection or authentication error
    #[error("sink '{sink_name}' unavailable: {message}")]
    SinkUnavailable { sink_name: String, message: String },

    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

fn fmt_position(column: &Option<String>, row: &Option<usize>) -> String {
    match (column, row) {
        (Some(c), Some(r)) => format!(" at column '{c}', row {r}"),
        (Some(c), None) => format!(" at column '{c}'"),
        (None, Some(r)) => format!(" at row {r}"),
        (None, None) => String::new(),
    }
}

fn fmt_row(row: &Option<usize>) -> String {
    row.map(|r| format!(" at row {r}")).unwrap_or_default()
}

/// Error category reported in run results and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    SourceUnavailable,
    SourceFormatError,
    TransformTypeError,
    SinkUnavailable,
    SinkWriteError,
    SchemaMismatch,
    Config,
    Other,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SourceUnavailable => "SourceUnavailable",
            Self::SourceFormatError => "SourceFormatError",
            Self::TransformTypeError => "TransformTypeError",
            Self::SinkUnavailable => "SinkUnavailable",
            Self::SinkWriteError => "SinkWriteError",
            Self::SchemaMismatch => "SchemaMismatch",
            Self::Config => "Config",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ContractError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigParse { .. } | Self::ConfigValidation { .. } => ErrorKind::Config,
            Self::SourceUnavailable { .. } => ErrorKind::SourceUnavailable,
            Self::SourceFormat { .. } => ErrorKind::SourceFormatError,
            Self::TransformType { .. } => ErrorKind::TransformTypeError,
            Self::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            Self::SinkUnavailable { .. } => ErrorKind::SinkUnavailable,
            Self::SinkWrite { .. } => ErrorKind::SinkWriteError,
            Self::Io(_) | Self::Other(_) => ErrorKind::Other,
        }
    }

    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create source unavailable error
    pub fn source_unavailable(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create source format error
    pub fn source_format(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceFormat {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create transform type error for a specific cell
    pub fn transform_type(
        transform: impl Into<String>,
        column: impl Into<String>,
        row: Option<usize>,
        message: impl Into<String>,
    ) -> Self {
        Self::TransformType {
            transform: transform.into(),
            column: Some(column.into()),
            row,
            message: message.into(),
        }
    }

    /// Create schema mismatch error
    pub fn schema_mismatch(row: Option<usize>, message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            row,
            message: message.into(),
        }
    }

    /// Create sink unavailable error
    pub fn sink_unavailable(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkUnavailable {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
