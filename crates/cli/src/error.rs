//! Error types for CLI operations.

use contracts::{ErrorKind, Stage};
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration loaded but failed validation
    #[error("Configuration validation failed: {path}")]
    ConfigInvalid { path: String },

    /// A pipeline stage failed
    #[error("Pipeline run failed at {stage} stage '{name}' ({kind}): {message}")]
    RunFailed {
        stage: Stage,
        name: String,
        kind: ErrorKind,
        message: String,
    },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn config_invalid(path: impl Into<String>) -> Self {
        Self::ConfigInvalid { path: path.into() }
    }

    pub fn run_failed(failure: &runner::StageFailure) -> Self {
        Self::RunFailed {
            stage: failure.stage,
            name: failure.stage_name.clone(),
            kind: failure.kind(),
            message: failure.error.to_string(),
        }
    }
}
