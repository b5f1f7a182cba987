//! Config validation
//!
//! Rules:
//! - pipeline name is non-empty
//! - source location is well-formed (http(s) URL, path, bucket/key)
//! - CSV delimiter is a single usable ASCII character
//! - transform parameters are usable
//! - relational table is a plain identifier
//! - local object store root is set

use std::collections::HashSet;

use contracts::{
    ContractError, ObjectStoreConfig, PipelineConfig, SinkConfig, SourceConfig, TransformConfig,
};

/// Validate a PipelineConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &PipelineConfig) -> Result<(), ContractError> {
    validate_name(config)?;
    validate_source(&config.source)?;
    validate_transforms(&config.transforms)?;
    validate_sink(&config.sink)?;
    validate_object_store(&config.object_store)?;
    Ok(())
}

fn validate_name(config: &PipelineConfig) -> Result<(), ContractError> {
    if config.name.trim().is_empty() {
        return Err(ContractError::config_validation(
            "name",
            "pipeline name cannot be empty",
        ));
    }
    Ok(())
}

fn validate_source(source: &SourceConfig) -> Result<(), ContractError> {
    match source {
        SourceConfig::Http { url } => {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ContractError::config_validation(
                    "source.url",
                    format!("url must start with http:// or https://, got '{url}'"),
                ));
            }
        }
        SourceConfig::CsvFile { path, delimiter } => {
            require_non_empty("source.path", path)?;
            if !delimiter.is_ascii() || matches!(delimiter, '"' | '\r' | '\n') {
                return Err(ContractError::config_validation(
                    "source.delimiter",
                    format!("delimiter must be a single ASCII character other than a quote or line break, got {delimiter:?}"),
                ));
            }
        }
        SourceConfig::ObjectStore { bucket, key, .. } => {
            require_non_empty("source.bucket", bucket)?;
            require_non_empty("source.key", key)?;
        }
    }
    Ok(())
}

fn validate_transforms(transforms: &[TransformConfig]) -> Result<(), ContractError> {
    for (idx, transform) in transforms.iter().enumerate() {
        match transform {
            TransformConfig::DropMissing { columns } => {
                let mut seen = HashSet::new();
                for column in columns {
                    if !seen.insert(column) {
                        return Err(ContractError::config_validation(
                            format!("transforms[{idx}].columns"),
                            format!("duplicate column '{column}'"),
                        ));
                    }
                }
            }
            TransformConfig::ParseDate { column, format } => {
                require_non_empty(&format!("transforms[{idx}].column"), column)?;
                require_non_empty(&format!("transforms[{idx}].format"), format)?;
            }
            TransformConfig::Scale { factor, .. } => {
                if !factor.is_finite() {
                    return Err(ContractError::config_validation(
                        format!("transforms[{idx}].factor"),
                        format!("factor must be finite, got {factor}"),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn validate_sink(sink: &SinkConfig) -> Result<(), ContractError> {
    match sink {
        SinkConfig::ObjectStore { bucket, key, .. } => {
            require_non_empty("sink.bucket", bucket)?;
            require_non_empty("sink.key", key)?;
        }
        SinkConfig::Relational { url, table, .. } => {
            require_non_empty("sink.url", url)?;
            if !is_identifier(table) {
                return Err(ContractError::config_validation(
                    "sink.table",
                    format!("table must match [A-Za-z_][A-Za-z0-9_]*, got '{table}'"),
                ));
            }
        }
        SinkConfig::Log => {}
    }
    Ok(())
}

fn validate_object_store(store: &ObjectStoreConfig) -> Result<(), ContractError> {
    if let ObjectStoreConfig::Local { root } = store {
        require_non_empty("object_store.root", root)?;
    }
    Ok(())
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ContractError> {
    if value.trim().is_empty() {
        return Err(ContractError::config_validation(field, "cannot be empty"));
    }
    Ok(())
}

/// Plain SQL identifier: `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
