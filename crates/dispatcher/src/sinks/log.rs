//! LogSink - logs batch summary via tracing

use contracts::{Ack, Batch, ContractError, DataSink};
use tracing::{debug, info, instrument};

/// Rows echoed at debug level
const PREVIEW_ROWS: usize = 5;

/// Sink that logs batch summaries for debugging and dry runs
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_batch_summary(&self, batch: &Batch) {
        let columns: Vec<String> = batch
            .schema()
            .columns()
            .iter()
            .map(|c| format!("{}:{}", c.name, c.column_type))
            .collect();

        info!(
            sink = %self.name,
            rows = batch.len(),
            columns = %columns.join(", "),
            "Batch received"
        );

        for record in batch.records().iter().take(PREVIEW_ROWS) {
            let row: Vec<String> = record.values().iter().map(|v| v.to_string()).collect();
            debug!(sink = %self.name, row = %row.join(" | "), "Row");
        }
    }
}

impl DataSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_persist",
        skip(self, batch),
        fields(sink = %self.name, rows = batch.len())
    )]
    async fn persist(&mut self, batch: &Batch) -> Result<Ack, ContractError> {
        self.log_batch_summary(batch);
        Ok(Ack {
            sink: self.name.clone(),
            destination: "log".to_string(),
            rows_written: batch.len(),
            bytes_written: None,
        })
    }
}
