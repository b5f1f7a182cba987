//! # Config Loader
//!
//! Turns a pipeline file into a validated `PipelineConfig`.
//!
//! Overrides from the command line are applied after parsing and before
//! validation, so an override can never smuggle in an invalid value.
//!
//! # Example
//!
//! ```no_run
//! use config_loader::{ConfigLoader, ConfigOverrides};
//! use std::path::Path;
//!
//! let overrides = ConfigOverrides {
//!     source_timeout_secs: Some(10),
//!     ..Default::default()
//! };
//! let config = ConfigLoader::load_with_overrides(Path::new("pipeline.toml"), &overrides).unwrap();
//! println!("Pipeline: {} ({} transforms)", config.name, config.transforms.len());
//! ```

mod parser;
mod validator;

pub use contracts::PipelineConfig;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;
use tracing::debug;

/// Values that take precedence over the file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Source deadline in seconds (0 disables)
    pub source_timeout_secs: Option<u64>,
    /// Sink deadline in seconds (0 disables)
    pub sink_timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(secs) = self.source_timeout_secs {
            debug!(secs, "Overriding source deadline");
            config.timeouts.source_secs = secs;
        }
        if let Some(secs) = self.sink_timeout_secs {
            debug!(secs, "Overriding sink deadline");
            config.timeouts.sink_secs = secs;
        }
    }
}

/// Pipeline config loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a pipeline file; the extension (.toml / .json) picks the format
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<PipelineConfig, ContractError> {
        Self::load_with_overrides(path, &ConfigOverrides::default())
    }

    /// Load a pipeline file, applying `overrides` before validation
    pub fn load_with_overrides(
        path: &Path,
        overrides: &ConfigOverrides,
    ) -> Result<PipelineConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        let mut config = parser::parse(&content, format)?;
        overrides.apply(&mut config);
        validator::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<PipelineConfig, ContractError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }

    /// Serialize PipelineConfig to TOML string
    pub fn to_toml(config: &PipelineConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize PipelineConfig to JSON string
    pub fn to_json(config: &PipelineConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
name = "csv-to-s3"

[source]
kind = "csv_file"
path = "local_path_to_csv.csv"

[[transforms]]
kind = "drop_missing"
columns = ["date"]

[[transforms]]
kind = "scale"
factor = 2.0

[sink]
kind = "object_store"
bucket = "your-bucket-name"
key = "data/raw/csv_data.csv"

[object_store]
backend = "s3"
region = "us-east-1"

[timeouts]
source_secs = 10
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.name, "csv-to-s3");
        assert_eq!(config.timeouts.source_secs, 10);
        assert_eq!(config.timeouts.sink_secs, 60);
    }

    #[test]
    fn test_round_trip_toml() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(config.name, config2.name);
        assert_eq!(config.source, config2.source);
        assert_eq!(config.transforms, config2.transforms);
        assert_eq!(config.sink, config2.sink);
        assert_eq!(config.object_store, config2.object_store);
    }

    #[test]
    fn test_round_trip_json() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(config.transforms, config2.transforms);
        assert_eq!(config.sink, config2.sink);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
name = "p"

[source]
kind = "http"
url = "api.example.com/data"

[sink]
kind = "log"
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("http://"));
    }

    #[test]
    fn test_overrides_apply_before_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        std::fs::write(&path, MINIMAL_TOML).unwrap();

        let overrides = ConfigOverrides {
            source_timeout_secs: Some(0),
            sink_timeout_secs: Some(5),
        };
        assert!(!overrides.is_empty());
        let config = ConfigLoader::load_with_overrides(&path, &overrides).unwrap();
        assert_eq!(config.timeouts.source(), None);
        assert_eq!(config.timeouts.sink_secs, 5);

        let plain = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(plain.timeouts.source_secs, 10);
        assert!(ConfigOverrides::default().is_empty());
    }

    #[test]
    fn test_load_from_path_unknown_extension() {
        let result = ConfigLoader::load_from_path(Path::new("pipeline.yaml"));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unsupported config format"), "got: {err}");
    }
}
