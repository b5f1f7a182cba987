//! Object store source

use std::sync::Arc;

use contracts::{Batch, ContractError, DataSource, ObjectFormat, ObjectStore};
use tracing::{debug, instrument};

use crate::decode::decode;

/// One object read through a shared object store handle
pub struct ObjectStoreSource<S> {
    store: Arc<S>,
    bucket: String,
    key: String,
    format: ObjectFormat,
}

impl<S: ObjectStore> ObjectStoreSource<S> {
    /// Bind the source to `bucket`/`key`
    ///
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
}

impl<S: ObjectStore> DataSource for ObjectStoreSource<S> {
    fn name(&self) -> &str {
        "object_store"
    }

    fn location(&self) -> String {
        format!("{}://{}/{}", self.store.backend(), self.bucket, self.key)
    }

    #[instrument(name = "object_source_fetch", skip(self), fields(bucket = %self.bucket, key = %self.key))]
    async fn fetch(&self) -> Result<Batch, ContractError> {
        let location = self.location();
        let body = self
            .store
            .get_object(&self.bucket, &self.key)
            .await
            .map_err(|e| ContractError::source_unavailable(&location, e.to_string()))?;
        debug!(bytes = body.len(), format = ?self.format, "Object read");

        decode(self.format, &location, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::{ErrorKind, Value};
    use storage::MemoryStore;

    #[tokio::test]
    async fn test_format_from_key() {
        let store = Arc::new(MemoryStore::new());
        store
            .put_object("bucket", "raw/data.csv", Bytes::from_static(b"id\n7\n"), "text/csv")
            .await
            .unwrap();

        let source = ObjectStoreSource::new(store, "bucket", "raw/data.csv", None);
        assert_eq!(source.location(), "memory://bucket/raw/data.csv");
        let batch = source.fetch().await.unwrap();
        assert_eq!(batch.value(0, "id"), Some(&Value::Integer(7)));
    }

    #[tokio::test]
    async fn test_explicit_format_wins() {
        let store = Arc::new(MemoryStore::new());
        store
            .put_object("bucket", "raw/data", Bytes::from_static(b"[{\"a\": true}]"), "application/json")
            .await
            .unwrap();

        let source = ObjectStoreSource::new(store, "bucket", "raw/data", Some(ObjectFormat::Json));
        let batch = source.fetch().await.unwrap();
        assert_eq!(batch.value(0, "a"), Some(&Value::Boolean(true)));
    }

    #[tokio::test]
    async fn test_missing_object() {
        let store = Arc::new(MemoryStore::new());
        let source = ObjectStoreSource::new(store, "bucket", "nope.json", None);

        let err = source.fetch().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
    }

    #[tokio::test]
    async fn test_undecodable_object() {
        let store = Arc::new(MemoryStore::new());
        store
            .put_object("bucket", "x.json", Bytes::from_static(b"{oops"), "application/json")
            .await
            .unwrap();
        let source = ObjectStoreSource::new(store, "bucket", "x.json", None);

        let err = source.fetch().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceFormatError);
    }
}
