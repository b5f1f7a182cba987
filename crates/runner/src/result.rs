//! Run outcome and statistics

use std::time::Duration;

use contracts::{Ack, ContractError, ErrorKind, Stage};
use thiserror::Error;

/// The stage that stopped a run, and why
#[derive(Debug, Error)]
#[error("{stage} stage '{stage_name}' failed with {kind}: {error}", kind = .error.kind())]
pub struct StageFailure {
    pub stage: Stage,
    /// Name of the failing source, transform or sink
    pub stage_name: String,
    #[source]
    pub error: ContractError,
}

impl StageFailure {
    pub fn new(stage: Stage, stage_name: impl Into<String>, error: ContractError) -> Self {
        Self {
            stage,
            stage_name: stage_name.into(),
            error,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

/// Wall-clock time of one stage call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTiming {
    pub stage: Stage,
    pub name: String,
    pub elapsed: Duration,
}

/// Row counts and timings collected during a run
///
/// Counts stay `None` for stages that never completed.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub rows_fetched: Option<usize>,
    pub rows_after_transforms: Option<usize>,
    pub rows_persisted: Option<usize>,
    pub stages: Vec<StageTiming>,
    pub total: Duration,
}

impl RunStats {
    /// Rows removed by transforms
    pub fn rows_dropped(&self) -> Option<usize> {
        Some(self.rows_fetched?.saturating_sub(self.rows_after_transforms?))
    }
}

/// Result of one pipeline run
#[derive(Debug)]
pub struct RunResult {
    pub outcome: Result<Ack, StageFailure>,
    pub stats: RunStats,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn failure(&self) -> Option<&StageFailure> {
        self.outcome.as_ref().err()
    }
}
