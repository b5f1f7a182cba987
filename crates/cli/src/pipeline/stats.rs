//! Pipeline statistics for the end-of-run summary.

use std::time::Duration;

use runner::{RunResult, StageTiming};

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Rows returned by the source
    pub rows_fetched: Option<usize>,

    /// Rows left after all transforms
    pub rows_after_transforms: Option<usize>,

    /// Rows removed by transforms
    pub rows_dropped: Option<usize>,

    /// Rows acknowledged by the sink
    pub rows_persisted: Option<usize>,

    /// Encoded size reported by the sink
    pub bytes_written: Option<usize>,

    /// Where the sink wrote the batch
    pub destination: Option<String>,

    /// Per-stage timings in execution order
    pub stages: Vec<StageTiming>,

    /// Total duration of the pipeline run
    pub duration: Duration,
}

impl From<&RunResult> for PipelineStats {
    fn from(result: &RunResult) -> Self {
        let ack = result.outcome.as_ref().ok();
        Self {
            rows_fetched: result.stats.rows_fetched,
            rows_after_transforms: result.stats.rows_after_transforms,
            rows_dropped: result.stats.rows_dropped(),
            rows_persisted: result.stats.rows_persisted,
            bytes_written: ack.and_then(|a| a.bytes_written),
            destination: ack.map(|a| a.destination.clone()),
            stages: result.stats.stages.clone(),
            duration: result.stats.total,
        }
    }
}

impl PipelineStats {
    /// Rows per second over the whole run
    pub fn throughput(&self) -> f64 {
        match self.rows_persisted {
            Some(rows) if self.duration.as_secs_f64() > 0.0 => {
                rows as f64 / self.duration.as_secs_f64()
            }
            _ => 0.0,
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.3}s", self.duration.as_secs_f64());
        println!("   ├─ Rows fetched: {}", fmt_count(self.rows_fetched));
        println!(
            "   ├─ Rows after transforms: {}",
            fmt_count(self.rows_after_transforms)
        );
        println!("   ├─ Rows dropped: {}", fmt_count(self.rows_dropped));
        println!("   ├─ Rows persisted: {}", fmt_count(self.rows_persisted));
        if let Some(bytes) = self.bytes_written {
            println!("   ├─ Bytes written: {bytes}");
        }
        if let Some(ref destination) = self.destination {
            println!("   ├─ Destination: {destination}");
        }
        println!("   └─ Rows/s: {:.1}", self.throughput());

        if !self.stages.is_empty() {
            println!("\n⏱  Stages");
            let last = self.stages.len() - 1;
            for (i, timing) in self.stages.iter().enumerate() {
                let prefix = if i == last { "└─" } else { "├─" };
                println!(
                    "   {} {:<9} {:<24} {:>8.1}ms",
                    prefix,
                    timing.stage.as_str(),
                    timing.name,
                    timing.elapsed.as_secs_f64() * 1000.0
                );
            }
        }

        println!();
    }
}

fn fmt_count(count: Option<usize>) -> String {
    count.map_or_else(|| "-".to_string(), |c| c.to_string())
}
