//! ObjectStore trait - bucket/key blob storage client handle
//!
//! Clients are constructed once by the caller and shared (via `Arc`) between
//! the stages that need them.

use bytes::Bytes;
use thiserror::Error;

/// Object store failures, mapped by callers into source or sink errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store unreachable, or credentials rejected
    #[error("object store unavailable: {0}")]
    Unavailable(String),

    /// No object under the key
    #[error("object '{bucket}/{key}' not found")]
    NotFound { bucket: String, key: String },

    /// Store reachable but refused the request
    #[error("object store rejected request: {0}")]
    Rejected(String),
}

/// Object storage client
#[trait_variant::make(ObjectStore: Send)]
pub trait LocalObjectStore: Sync {
    /// Backend name (used for logging)
    fn backend(&self) -> &str;

    /// Write one object, replacing any existing object under the key
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError>;

    /// Read one object
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError>;
}
