//! Local delimited text file source

use std::path::PathBuf;

use contracts::{Batch, ContractError, DataSource};
use tracing::{debug, instrument};

use crate::decode::decode_csv;

/// Delimited text file with a header row
pub struct CsvFileSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }

    /// Use a delimiter other than `,`
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl DataSource for CsvFileSource {
    fn name(&self) -> &str {
        "csv_file"
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    #[instrument(name = "csv_source_fetch", skip(self), fields(path = %self.path.display()))]
    async fn fetch(&self) -> Result<Batch, ContractError> {
        let location = self.location();
        let body = tokio::fs::read(&self.path)
            .await
            .map_err(|e| ContractError::source_unavailable(&location, e.to_string()))?;
        debug!(bytes = body.len(), "File read");

        decode_csv(&location, &body, self.delimiter)
    }
}
