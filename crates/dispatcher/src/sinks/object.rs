//! ObjectStoreSink - writes one serialized object per batch

use std::sync::Arc;

use bytes::Bytes;
use contracts::{Ack, Batch, ContractError, DataSink, ObjectFormat, ObjectStore, StoreError};
use tracing::{debug, instrument};

use crate::encode::encode;

/// Sink that serializes the batch to JSON or CSV and puts it under `bucket`/`key`
pub struct ObjectStoreSink<S> {
    store: Arc<S>,
    bucket: String,
    key: String,
    format: ObjectFormat,
}

impl<S: ObjectStore> ObjectStoreSink<S> {
    /// Without an explicit format, the key's extension decides (JSON otherwise).
    pub fn new(
        store: Arc<S>,
        bucket: impl Into<String>,
        key: impl Into<String>,
        format: Option<ObjectFormat>,
    ) -> Self {
        let key = key.into();
        let format = ObjectFormat::resolve(format, &key);
        Self {
            store,
            bucket: bucket.into(),
            key,
            format,
        }
    }

    fn destination(&self) -> String {
        format!("{}://{}/{}", self.store.backend(), self.bucket, self.key)
    }
}

impl<S: ObjectStore> DataSink for ObjectStoreSink<S> {
    fn name(&self) -> &str {
        "object_store"
    }

    #[instrument(
        name = "object_sink_persist",
        skip(self, batch),
        fields(bucket = %self.bucket, key = %self.key, rows = batch.len())
    )]
    async fn persist(&mut self, batch: &Batch) -> Result<Ack, ContractError> {
        let body = encode(self.format, batch)
            .map_err(|e| ContractError::sink_write(self.name(), e.to_string()))?;
        let size = body.len();

        self.store
            .put_object(
                &self.bucket,
                &self.key,
                Bytes::from(body),
                self.format.content_type(),
            )
            .await
            .map_err(|e| match e {
                StoreError::Rejected(_) => ContractError::sink_write(self.name(), e.to_string()),
                StoreError::Unavailable(_) | StoreError::NotFound { .. } => {
                    ContractError::sink_unavailable(self.name(), e.to_string())
                }
            })?;
        debug!(bytes = size, "Object written");

        Ok(Ack {
            sink: self.name().to_string(),
            destination: self.destination(),
            rows_written: batch.len(),
            bytes_written: Some(size),
        })
    }
}
