//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// batchmover - move one batch from a source, through transforms, into a sink
#[derive(Parser, Debug)]
#[command(
    name = "batchmover",
    author,
    version,
    about = "Batch data pipeline: source -> transforms -> sink",
    long_about = "Loads one batch from an HTTP JSON endpoint, a delimited file or an object store,\n\
                  applies the configured transforms in order, and writes the result to an\n\
                  object store or a relational table."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "BATCHMOVER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "BATCHMOVER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pipeline once
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "pipeline.toml",
        env = "BATCHMOVER_CONFIG"
    )]
    pub config: PathBuf,

    /// Validate configuration and print a summary without running
    #[arg(long)]
    pub dry_run: bool,

    /// Override the source deadline in seconds (0 = no deadline)
    #[arg(long, env = "BATCHMOVER_SOURCE_TIMEOUT")]
    pub source_timeout: Option<u64>,

    /// Override the sink deadline in seconds (0 = no deadline)
    #[arg(long, env = "BATCHMOVER_SINK_TIMEOUT")]
    pub sink_timeout: Option<u64>,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "BATCHMOVER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(
        short,
        long,
        default_value = "pipeline.toml",
        env = "BATCHMOVER_CONFIG"
    )]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "pipeline.toml",
        env = "BATCHMOVER_CONFIG"
    )]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
