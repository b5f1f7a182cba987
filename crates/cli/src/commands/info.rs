//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::PipelineConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::describe;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    name: String,
    source: StageInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    transforms: Vec<StageInfo>,
    sink: StageInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    object_store: Option<String>,
    timeouts: TimeoutInfo,
}

#[derive(Serialize)]
struct StageInfo {
    kind: String,
    detail: String,
}

#[derive(Serialize)]
struct TimeoutInfo {
    source_secs: u64,
    sink_secs: u64,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn build_config_info(config: &PipelineConfig) -> ConfigInfo {
    let transforms = config
        .transforms
        .iter()
        .map(|t| StageInfo {
            kind: t.kind().to_string(),
            detail: describe::transform(t),
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", config.version),
        name: config.name.clone(),
        source: StageInfo {
            kind: config.source.kind().to_string(),
            detail: describe::source_location(&config.source),
        },
        transforms,
        sink: StageInfo {
            kind: config.sink.kind().to_string(),
            detail: describe::sink_destination(&config.sink),
        },
        object_store: config
            .uses_object_store()
            .then(|| describe::object_store(&config.object_store)),
        timeouts: TimeoutInfo {
            source_secs: config.timeouts.source_secs,
            sink_secs: config.timeouts.sink_secs,
        },
    }
}

fn print_config_info(config: &PipelineConfig) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 batchmover Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📍 Pipeline");
    println!("   ├─ Version: {:?}", config.version);
    println!("   └─ Name: {}", config.name);

    println!("\n📥 Source");
    println!("   ├─ Kind: {}", config.source.kind());
    println!("   └─ Location: {}", describe::source_location(&config.source));

    println!("\n🔧 Transforms ({})", config.transforms.len());
    for (i, transform) in config.transforms.iter().enumerate() {
        let is_last = i == config.transforms.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        println!("   {} {}", prefix, describe::transform(transform));
    }

    println!("\n📤 Sink");
    println!("   ├─ Kind: {}", config.sink.kind());
    println!("   └─ Destination: {}", describe::sink_destination(&config.sink));

    if config.uses_object_store() {
        println!("\n🪣 Object Store");
        println!("   └─ {}", describe::object_store(&config.object_store));
    }

    println!("\n⚙️  Deadlines");
    println!("   ├─ Source: {}", fmt_deadline(config.timeouts.source_secs));
    println!("   └─ Sink: {}", fmt_deadline(config.timeouts.sink_secs));

    println!();
}

fn fmt_deadline(secs: u64) -> String {
    if secs == 0 {
        "none".to_string()
    } else {
        format!("{secs}s")
    }
}
