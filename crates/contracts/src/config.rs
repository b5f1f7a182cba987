//! PipelineConfig - Config Loader output
//!
//! Describes one complete pipeline: source, transforms, sink, object store and deadlines.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Pipeline name (used for logging/metrics)
    pub name: String,

    /// Where the batch comes from
    pub source: SourceConfig,

    /// Transforms, applied in order
    #[serde(default)]
    pub transforms: Vec<TransformConfig>,

    /// Where the batch goes
    pub sink: SinkConfig,

    /// Object store backend shared by object-store sources and sinks
    #[serde(default)]
    pub object_store: ObjectStoreConfig,

    /// Deadlines for network-bound stages
    #[serde(default)]
    pub timeouts: StageTimeouts,
}

/// Source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// JSON over HTTP GET
    Http { url: String },

    /// Local delimited text file with a header row
    CsvFile {
        path: String,
        #[serde(default = "default_delimiter")]
        delimiter: char,
    },

    /// One object read through the object store
    ObjectStore {
        bucket: String,
        key: String,
        #[serde(default)]
        format: Option<ObjectFormat>,
    },
}

impl SourceConfig {
    /// Config key of the source kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http { .. } => "http",
            Self::CsvFile { .. } => "csv_file",
            Self::ObjectStore { .. } => "object_store",
        }
    }
}

fn default_delimiter() -> char {
    ','
}

/// Transform configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformConfig {
    /// Drop rows with a null in any required column (empty = all columns)
    DropMissing {
        #[serde(default)]
        columns: Vec<String>,
    },

    /// Parse a text column into calendar dates
    ParseDate {
        column: String,
        #[serde(default = "default_date_format")]
        format: String,
    },

    /// Multiply numeric columns by a factor (empty = all numeric columns)
    Scale {
        factor: f64,
        #[serde(default)]
        columns: Vec<String>,
    },
}

fn default_date_format() -> String {
    crate::DATE_FORMAT.to_string()
}

impl TransformConfig {
    /// Config key of the transform kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DropMissing { .. } => "drop_missing",
            Self::ParseDate { .. } => "parse_date",
            Self::Scale { .. } => "scale",
        }
    }
}

/// Sink configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkConfig {
    /// One object written through the object store
    ObjectStore {
        bucket: String,
        key: String,
        #[serde(default)]
        format: Option<ObjectFormat>,
    },

    /// Table in a relational database
    Relational {
        url: String,
        table: String,
        /// No default: replacing a table is destructive and must be asked for
        mode: WriteMode,
    },

    /// Batch summary via tracing
    Log,
}

impl SinkConfig {
    /// Config key of the sink kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ObjectStore { .. } => "object_store",
            Self::Relational { .. } => "relational",
            Self::Log => "log",
        }
    }
}

/// Object serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectFormat {
    Json,
    Csv,
}

impl ObjectFormat {
    /// Infer format from an object key's extension
    pub fn from_key(key: &str) -> Option<Self> {
        let ext = key.rsplit_once('.')?.1;
        match ext.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// Explicit format, else the key's extension, else JSON
    pub fn resolve(explicit: Option<Self>, key: &str) -> Self {
        explicit.or_else(|| Self::from_key(key)).unwrap_or(Self::Json)
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
        }
    }
}

/// Relational write mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Drop and recreate the table from the batch schema
    Replace,
    /// Insert into the existing table (created if absent)
    Append,
}

/// Object store backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum ObjectStoreConfig {
    /// Amazon S3 or an S3-compatible endpoint
    S3 {
        #[serde(default)]
        region: Option<String>,
        /// Custom endpoint (e.g. LocalStack); enables path-style addressing
        #[serde(default)]
        endpoint: Option<String>,
        #[serde(default)]
        profile: Option<String>,
    },

    /// Directory tree: `<root>/<bucket>/<key>`
    Local { root: String },

    /// In-process map
    Memory,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self::S3 {
            region: None,
            endpoint: None,
            profile: None,
        }
    }
}

/// Stage deadlines in seconds; 0 disables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTimeouts {
    #[serde(default = "default_source_secs")]
    pub source_secs: u64,

    #[serde(default = "default_sink_secs")]
    pub sink_secs: u64,
}

fn default_source_secs() -> u64 {
    30
}

fn default_sink_secs() -> u64 {
    60
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self {
            source_secs: default_source_secs(),
            sink_secs: default_sink_secs(),
        }
    }
}

impl StageTimeouts {
    pub fn source(&self) -> Option<Duration> {
        non_zero_secs(self.source_secs)
    }

    pub fn sink(&self) -> Option<Duration> {
        non_zero_secs(self.sink_secs)
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

impl PipelineConfig {
    /// Whether any stage reads or writes through the object store
    pub fn uses_object_store(&self) -> bool {
        matches!(self.source, SourceConfig::ObjectStore { .. })
            || matches!(self.sink, SinkConfig::ObjectStore { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_key() {
        assert_eq!(ObjectFormat::from_key("raw/data.CSV"), Some(ObjectFormat::Csv));
        assert_eq!(ObjectFormat::from_key("raw/data.json"), Some(ObjectFormat::Json));
        assert_eq!(ObjectFormat::from_key("raw/data"), None);
        assert_eq!(
            ObjectFormat::resolve(Some(ObjectFormat::Csv), "x.json"),
            ObjectFormat::Csv
        );
        assert_eq!(ObjectFormat::resolve(None, "x"), ObjectFormat::Json);
    }

    #[test]
    fn test_timeouts_zero_disables() {
        let timeouts = StageTimeouts {
            source_secs: 0,
            sink_secs: 5,
        };
        assert_eq!(timeouts.source(), None);
        assert_eq!(timeouts.sink(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_tagged_sections_deserialize() {
        let json = r#"{
            "name": "p",
            "source": { "kind": "csv_file", "path": "in.csv" },
            "transforms": [{ "kind": "parse_date", "column": "date" }],
            "sink": { "kind": "relational", "url": "sqlite::memory:", "table": "t", "mode": "append" }
        }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.source,
            SourceConfig::CsvFile {
                path: "in.csv".into(),
                delimiter: ','
            }
        );
        assert_eq!(
            config.transforms[0],
            TransformConfig::ParseDate {
                column: "date".into(),
                format: "%Y-%m-%d".into()
            }
        );
        assert_eq!(config.object_store, ObjectStoreConfig::default());
        assert_eq!(config.timeouts, StageTimeouts::default());
        assert!(!config.uses_object_store());
    }

    #[test]
    fn test_relational_mode_is_required() {
        let json = r#"{
            "name": "p",
            "source": { "kind": "http", "url": "http://x" },
            "sink": { "kind": "relational", "url": "sqlite::memory:", "table": "t" }
        }"#;
        let result: Result<PipelineConfig, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
