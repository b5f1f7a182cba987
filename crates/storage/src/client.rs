//! Backend selection from configuration

use bytes::Bytes;
use contracts::{ObjectStore, ObjectStoreConfig, StoreError};
use tracing::info;

use crate::{LocalStore, MemoryStore, S3Settings, S3Store};

/// Object store handle for any configured backend
#[derive(Clone)]
pub enum StorageClient {
    S3(S3Store),
    Local(LocalStore),
    Memory(MemoryStore),
}

/// Build the object store handle described by `config`
pub async fn create_storage_client(config: &ObjectStoreConfig) -> StorageClient {
    match config {
        ObjectStoreConfig::S3 {
            region,
            endpoint,
            profile,
        } => {
            let settings = S3Settings {
                region: region.clone(),
                endpoint: endpoint.clone(),
                profile: profile.clone(),
            };
            info!(region = ?settings.region, endpoint = ?settings.endpoint, "Using S3 object store");
            StorageClient::S3(S3Store::connect(&settings).await)
        }
        ObjectStoreConfig::Local { root } => {
            info!(root = %root, "Using local object store");
            StorageClient::Local(LocalStore::new(root))
        }
        ObjectStoreConfig::Memory => {
            info!("Using in-memory object store");
            StorageClient::Memory(MemoryStore::new())
        }
    }
}

impl ObjectStore for StorageClient {
    fn backend(&self) -> &str {
        match self {
            Self::S3(store) => store.backend(),
            Self::Local(store) => store.backend(),
            Self::Memory(store) => store.backend(),
        }
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError> {
        match self {
            Self::S3(store) => store.put_object(bucket, key, body, content_type).await,
            Self::Local(store) => store.put_object(bucket, key, body, content_type).await,
            Self::Memory(store) => store.put_object(bucket, key, body, content_type).await,
        }
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        match self {
            Self::S3(store) => store.get_object(bucket, key).await,
            Self::Local(store) => store.get_object(bucket, key).await,
            Self::Memory(store) => store.get_object(bucket, key).await,
        }
    }
}
