//! Pipeline orchestrator - builds the stages from configuration and runs them.

use std::sync::Arc;

use anyhow::{Context, Result};
use contracts::PipelineConfig;
use dispatcher::create_sink;
use ingestion::create_source;
use runner::{PipelineRunner, RunResult};
use storage::{create_storage_client, MemoryStore, StorageClient};
use tracing::info;
use transform::build_transforms;

/// Options that apply to one run, on top of the configuration file
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
    options: RunOptions,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig, options: RunOptions) -> Self {
        Self { config, options }
    }

    /// Assemble the stages and run the pipeline once
    pub async fn run(self) -> Result<RunResult> {
        if let Some(port) = self.options.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("batchmover/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        // Skip backend setup (and AWS credential discovery) when nothing uses it.
        let store = if self.config.uses_object_store() {
            create_storage_client(&self.config.object_store).await
        } else {
            StorageClient::Memory(MemoryStore::new())
        };
        let store = Arc::new(store);

        let source = create_source(&self.config.source, http, Arc::clone(&store));
        let transforms = build_transforms(&self.config.transforms);
        let sink = create_sink(&self.config.sink, store);

        info!(
            pipeline = %self.config.name,
            source = self.config.source.kind(),
            transforms = transforms.len(),
            sink = self.config.sink.kind(),
            "Pipeline assembled"
        );

        let mut runner = PipelineRunner::new(&self.config.name, source, transforms, sink)
            .with_timeouts(&self.config.timeouts);

        Ok(runner.run().await)
    }
}
