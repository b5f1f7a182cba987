//! Pipeline run metrics
//!
//! Thin wrappers over the `metrics` macros so every crate records the same
//! names and labels. Without an installed recorder these are no-ops.

use std::time::Duration;

use contracts::{ErrorKind, Stage};
use metrics::{counter, histogram};

/// Record one finished pipeline run
pub fn record_run(success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!("batchmover_runs_total", "status" => status).increment(1);
}

/// Record a stage that completed, with the rows it produced or wrote
pub fn record_stage_completed(stage: Stage, rows: usize, elapsed: Duration) {
    histogram!("batchmover_stage_rows", "stage" => stage.as_str()).record(rows as f64);
    record_stage_duration(stage, elapsed);
}

/// Record a stage that failed
pub fn record_stage_failure(stage: Stage, kind: ErrorKind, elapsed: Duration) {
    counter!(
        "batchmover_stage_failures_total",
        "stage" => stage.as_str(),
        "kind" => kind.as_str()
    )
    .increment(1);
    record_stage_duration(stage, elapsed);
}

fn record_stage_duration(stage: Stage, elapsed: Duration) {
    histogram!("batchmover_stage_duration_ms", "stage" => stage.as_str())
        .record(elapsed.as_secs_f64() * 1000.0);
}
