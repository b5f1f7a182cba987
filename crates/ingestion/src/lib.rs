//! # Ingestion
//!
//! Source stage: turns an HTTP endpoint, a local delimited file or an
//! object-store object into one schema-checked `Batch`.
//!
//! Responsibilities:
//! - Bind a source variant to its location from `SourceConfig`
//! - Decode JSON records/columns and delimited text
//! - Infer column types and reject non-tabular payloads
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::create_source;
//! use contracts::DataSource;
//!
//! let source = create_source(&config.source, reqwest::Client::new(), store);
//! let batch = source.fetch().await?;
//! ```

mod decode;
mod sources;

use std::sync::Arc;

use contracts::{Batch, ContractError, DataSource, ObjectStore, SourceConfig};

pub use decode::{decode, decode_csv, decode_json};
pub use sources::{CsvFileSource, HttpSource, ObjectStoreSource};

/// Source variant selected by configuration
pub enum ConfiguredSource<S> {
    Http(HttpSource),
    CsvFile(CsvFileSource),
    ObjectStore(ObjectStoreSource<S>),
}

/// Build the source described by `config`
///
/// The HTTP client and object store handle are injected so they can be
/// shared with other stages or replaced in tests.
pub fn create_source<S: ObjectStore>(
    config: &SourceConfig,
    http: reqwest::Client,
    store: Arc<S>,
) -> ConfiguredSource<S> {
    match config {
        SourceConfig::Http { url } => ConfiguredSource::Http(HttpSource::new(http, url.clone())),
        SourceConfig::CsvFile { path, delimiter } => {
            let mut source = CsvFileSource::new(path);
            // Validation guarantees an ASCII delimiter.
            if let Ok(byte) = u8::try_from(*delimiter) {
                source = source.with_delimiter(byte);
            }
            ConfiguredSource::CsvFile(source)
        }
        SourceConfig::ObjectStore {
            bucket,
            key,
            format,
        } => ConfiguredSource::ObjectStore(ObjectStoreSource::new(
            store,
            bucket.clone(),
            key.clone(),
            *format,
        )),
    }
}

impl<S: ObjectStore> DataSource for ConfiguredSource<S> {
    fn name(&self) -> &str {
        match self {
            Self::Http(source) => source.name(),
            Self::CsvFile(source) => source.name(),
            Self::ObjectStore(source) => source.name(),
        }
    }

    fn location(&self) -> String {
        match self {
            Self::Http(source) => source.location(),
            Self::CsvFile(source) => source.location(),
            Self::ObjectStore(source) => source.location(),
        }
    }

    async fn fetch(&self) -> Result<Batch, ContractError> {
        match self {
            Self::Http(source) => source.fetch().await,
            Self::CsvFile(source) => source.fetch().await,
            Self::ObjectStore(source) => source.fetch().await,
        }
    }
}
