//! PipelineRunner - sequential Source -> Transform* -> Sink execution

use std::future::Future;
use std::time::{Duration, Instant};

use contracts::{
    Ack, Batch, ContractError, DataSink, DataSource, Stage, StageTimeouts, Transform,
};
use observability::{record_run, record_stage_completed, record_stage_failure};
use tracing::{error, info, instrument};

use crate::result::{RunResult, RunStats, StageFailure, StageTiming};

/// Runs one batch through a fixed chain of stages
///
/// Stages run strictly in order with a single batch in flight; the first
/// failure ends the run and no later stage is called.
pub struct PipelineRunner<Src, Snk> {
    name: String,
    source: Src,
    transforms: Vec<Box<dyn Transform>>,
    sink: Snk,
    source_deadline: Option<Duration>,
    sink_deadline: Option<Duration>,
}

impl<Src: DataSource, Snk: DataSink> PipelineRunner<Src, Snk> {
    /// Create a runner with the default stage deadlines
    pub fn new(
        name: impl Into<String>,
        source: Src,
        transforms: Vec<Box<dyn Transform>>,
        sink: Snk,
    ) -> Self {
        Self {
            name: name.into(),
            source,
            transforms,
            sink,
            source_deadline: None,
            sink_deadline: None,
        }
        .with_timeouts(&StageTimeouts::default())
    }

    /// Apply configured deadlines (0 seconds disables a deadline)
    pub fn with_timeouts(self, timeouts: &StageTimeouts) -> Self {
        self.with_source_deadline(timeouts.source())
            .with_sink_deadline(timeouts.sink())
    }

    pub fn with_source_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.source_deadline = deadline;
        self
    }

    pub fn with_sink_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.sink_deadline = deadline;
        self
    }

    pub fn source(&self) -> &Src {
        &self.source
    }

    pub fn sink(&self) -> &Snk {
        &self.sink
    }

    /// Run the pipeline once
    #[instrument(
        name = "pipeline_run",
        skip(self),
        fields(pipeline = %self.name, source = self.source.name(), sink = self.sink.name())
    )]
    pub async fn run(&mut self) -> RunResult {
        let started = Instant::now();
        let mut stats = RunStats::default();

        let outcome = self.execute(&mut stats).await;
        stats.total = started.elapsed();
        record_run(outcome.is_ok());

        match &outcome {
            Ok(ack) => info!(
                destination = %ack.destination,
                rows = ack.rows_written,
                elapsed_ms = stats.total.as_millis() as u64,
                "Pipeline run succeeded"
            ),
            Err(failure) => error!(
                stage = %failure.stage,
                name = %failure.stage_name,
                kind = %failure.kind(),
                error = %failure.error,
                "Pipeline run failed"
            ),
        }

        RunResult { outcome, stats }
    }

    async fn execute(&mut self, stats: &mut RunStats) -> Result<Ack, StageFailure> {
        // Source
        let source_name = self.source.name().to_string();
        let location = self.source.location();
        info!(stage = %Stage::Source, name = %source_name, location = %location, "Stage started");
        let started = Instant::now();
        let fetched = with_deadline(self.source_deadline, self.source.fetch(), |limit| {
            ContractError::source_unavailable(
                &location,
                format!("no response within {}", fmt_duration(limit)),
            )
        })
        .await;
        let mut batch = finish_stage(stats, Stage::Source, &source_name, started, fetched, Batch::len)?;
        stats.rows_fetched = Some(batch.len());

        // Transforms
        for transform in &self.transforms {
            let started = Instant::now();
            let output = transform.apply(&batch);
            batch = finish_stage(stats, Stage::Transform, transform.name(), started, output, Batch::len)?;
        }
        stats.rows_after_transforms = Some(batch.len());

        // Sink
        let sink_name = self.sink.name().to_string();
        info!(stage = %Stage::Sink, name = %sink_name, rows = batch.len(), "Stage started");
        let started = Instant::now();
        let persisted = with_deadline(self.sink_deadline, self.sink.persist(&batch), |limit| {
            ContractError::sink_unavailable(
                &sink_name,
                format!("no acknowledgement within {}", fmt_duration(limit)),
            )
        })
        .await;
        let ack = finish_stage(stats, Stage::Sink, &sink_name, started, persisted, |ack| {
            ack.rows_written
        })?;
        stats.rows_persisted = Some(ack.rows_written);

        Ok(ack)
    }
}

/// Record timing, logs and metrics for one stage call
fn finish_stage<T>(
    stats: &mut RunStats,
    stage: Stage,
    name: &str,
    started: Instant,
    result: Result<T, ContractError>,
    rows: impl FnOnce(&T) -> usize,
) -> Result<T, StageFailure> {
    let elapsed = started.elapsed();
    stats.stages.push(StageTiming {
        stage,
        name: name.to_string(),
        elapsed,
    });

    match result {
        Ok(value) => {
            let rows = rows(&value);
            record_stage_completed(stage, rows, elapsed);
            info!(
                stage = %stage,
                name = %name,
                rows,
                elapsed_ms = elapsed.as_millis() as u64,
                "Stage finished"
            );
            Ok(value)
        }
        Err(error) => {
            record_stage_failure(stage, error.kind(), elapsed);
            Err(StageFailure::new(stage, name, error))
        }
    }
}

/// Await `future`, converting an elapsed deadline into the stage's error
async fn with_deadline<T, F>(
    deadline: Option<Duration>,
    future: F,
    on_timeout: impl FnOnce(Duration) -> ContractError,
) -> Result<T, ContractError>
where
    F: Future<Output = Result<T, ContractError>>,
{
    match deadline {
        None => future.await,
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .unwrap_or_else(|_| Err(on_timeout(limit))),
    }
}

fn fmt_duration(limit: Duration) -> String {
    if limit.subsec_nanos() == 0 {
        format!("{}s", limit.as_secs())
    } else {
        format!("{}ms", limit.as_millis())
    }
}
