//! # Storage
//!
//! Object-store client handles.
//!
//! Backends:
//! - `S3Store`: Amazon S3 / S3-compatible endpoints via aws-sdk-s3
//! - `LocalStore`: `<root>/<bucket>/<key>` on the local filesystem
//! - `MemoryStore`: in-process map for tests and dry runs
//!
//! `StorageClient` selects a backend from `ObjectStoreConfig`; it is built once
//! by the caller and shared by the stages that need it.

mod client;
mod local;
mod memory;
mod s3;

pub use client::{create_storage_client, StorageClient};
pub use contracts::{ObjectStore, StoreError};
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use s3::{S3Settings, S3Store};
