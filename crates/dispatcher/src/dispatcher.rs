//! Sink construction from configuration

use std::sync::Arc;

use contracts::{Ack, Batch, ContractError, DataSink, ObjectStore, SinkConfig};
use tracing::instrument;

use crate::sinks::{LogSink, ObjectStoreSink, RelationalSink};

/// Sink variant selected by configuration
pub enum ConfiguredSink<S> {
    Log(LogSink),
    ObjectStore(ObjectStoreSink<S>),
    Relational(RelationalSink),
}

/// Create the sink described by `config`
///
/// Object-store sinks write through the shared `store` handle. Relational
/// sinks connect on first persist so connection failures surface as sink
/// stage failures.
#[instrument(name = "dispatcher_create_sink", skip(config, store), fields(kind = config.kind()))]
pub fn create_sink<S: ObjectStore>(config: &SinkConfig, store: Arc<S>) -> ConfiguredSink<S> {
    match config {
        SinkConfig::Log => ConfiguredSink::Log(LogSink::new("log")),
        SinkConfig::ObjectStore {
            bucket,
            key,
            format,
        } => ConfiguredSink::ObjectStore(ObjectStoreSink::new(
            store,
            bucket.clone(),
            key.clone(),
            *format,
        )),
        SinkConfig::Relational { url, table, mode } => {
            ConfiguredSink::Relational(RelationalSink::new(url.clone(), table.clone(), *mode))
        }
    }
}

impl<S: ObjectStore> DataSink for ConfiguredSink<S> {
    fn name(&self) -> &str {
        match self {
            Self::Log(sink) => sink.name(),
            Self::ObjectStore(sink) => sink.name(),
            Self::Relational(sink) => sink.name(),
        }
    }

    async fn persist(&mut self, batch: &Batch) -> Result<Ack, ContractError> {
        match self {
            Self::Log(sink) => sink.persist(batch).await,
            Self::ObjectStore(sink) => sink.persist(batch).await,
            Self::Relational(sink) => sink.persist(batch).await,
        }
    }
}
