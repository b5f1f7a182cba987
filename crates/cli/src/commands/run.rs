//! `run` command implementation.

use anyhow::{Context, Result};
use config_loader::{ConfigLoader, ConfigOverrides};
use contracts::PipelineConfig;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::describe;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineStats, RunOptions};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    // Load, override and validate configuration
    let overrides = overrides_from(args);
    if !overrides.is_empty() {
        info!(?overrides, "Applying CLI overrides");
    }
    let config = ConfigLoader::load_with_overrides(&args.config, &overrides)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        name = %config.name,
        source = config.source.kind(),
        transforms = config.transforms.len(),
        sink = config.sink.kind(),
        source_timeout_secs = config.timeouts.source_secs,
        sink_timeout_secs = config.timeouts.sink_secs,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    let options = RunOptions {
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    let pipeline = Pipeline::new(config, options);
    let result = pipeline.run().await?;

    let stats = PipelineStats::from(&result);
    stats.print_summary();

    match result.outcome {
        Ok(ack) => {
            info!(
                destination = %ack.destination,
                rows = ack.rows_written,
                "Pipeline completed successfully"
            );
            Ok(())
        }
        Err(failure) => {
            warn!(stage = %failure.stage, kind = %failure.kind(), "Pipeline stopped early");
            Err(CliError::run_failed(&failure).into())
        }
    }
}

fn overrides_from(args: &RunArgs) -> ConfigOverrides {
    ConfigOverrides {
        source_timeout_secs: args.source_timeout,
        sink_timeout_secs: args.sink_timeout,
    }
}

fn print_config_summary(config: &PipelineConfig) {
    println!("\n=== Configuration Summary ===");
    println!("Pipeline: {}", config.name);
    println!(
        "Source: {} ({})",
        describe::source_location(&config.source),
        config.source.kind()
    );
    println!("Transforms: {}", config.transforms.len());
    for transform in &config.transforms {
        println!("  - {}", describe::transform(transform));
    }
    println!(
        "Sink: {} ({})",
        describe::sink_destination(&config.sink),
        config.sink.kind()
    );
    if config.uses_object_store() {
        println!("Object store: {}", describe::object_store(&config.object_store));
    }
    println!(
        "Deadlines: source {}s, sink {}s (0 = none)",
        config.timeouts.source_secs, config.timeouts.sink_secs
    );
    println!("=============================\n");
}
