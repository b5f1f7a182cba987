//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{ObjectStoreConfig, PipelineConfig, SinkConfig, WriteMode};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;
use crate::describe;
use crate::error::CliError;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    name: String,
    source: String,
    transform_count: usize,
    sink: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        Err(CliError::config_invalid(result.config_path).into())
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    name: config.name.clone(),
                    source: format!(
                        "{} {}",
                        config.source.kind(),
                        describe::source_location(&config.source)
                    ),
                    transform_count: config.transforms.len(),
                    sink: format!(
                        "{} {}",
                        config.sink.kind(),
                        describe::sink_destination(&config.sink)
                    ),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &PipelineConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.transforms.is_empty() {
        warnings.push("No transforms configured - the batch is moved unchanged".to_string());
    }

    match &config.sink {
        SinkConfig::Relational {
            url,
            table,
            mode: WriteMode::Replace,
        } => {
            warnings.push(format!(
                "sink.mode = replace drops table '{table}' before every run"
            ));
            if url.contains(":memory:") {
                warnings.push(
                    "sink.url is an in-memory database - written rows are discarded after the run"
                        .to_string(),
                );
            }
        }
        SinkConfig::Relational { url, .. } if url.contains(":memory:") => {
            warnings.push(
                "sink.url is an in-memory database - written rows are discarded after the run"
                    .to_string(),
            );
        }
        SinkConfig::Log => {
            warnings.push("Log sink configured - the batch is logged, not persisted".to_string());
        }
        _ => {}
    }

    if !config.uses_object_store() && config.object_store != ObjectStoreConfig::default() {
        warnings.push(
            "object_store is configured but neither the source nor the sink uses it".to_string(),
        );
    }

    if config.timeouts.source_secs == 0 || config.timeouts.sink_secs == 0 {
        warnings.push("A stage deadline is disabled - a stalled endpoint blocks the run".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Name: {}", summary.name);
            println!("  Source: {}", summary.source);
            println!("  Transforms: {}", summary.transform_count);
            println!("  Sink: {}", summary.sink);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
