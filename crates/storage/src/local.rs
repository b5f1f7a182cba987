//! Local filesystem object store

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use contracts::{ObjectStore, StoreError};
use tracing::{debug, instrument};

/// Object store rooted at a directory
///
/// Objects live at `<root>/<bucket>/<key>`; keys may contain `/` separators.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve an object path, refusing anything that escapes the bucket directory
    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StoreError> {
        for (label, part) in [("bucket", bucket), ("key", key)] {
            let path = Path::new(part);
            let escapes = path
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
            if part.is_empty() || escapes {
                return Err(StoreError::Rejected(format!(
                    "invalid {label} '{part}' for local store"
                )));
            }
        }
        Ok(self.root.join(bucket).join(key))
    }
}

impl ObjectStore for LocalStore {
    fn backend(&self) -> &str {
        "local"
    }

    #[instrument(name = "local_put_object", skip(self, body, _content_type), fields(bytes = body.len()))]
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        _content_type: &str,
    ) -> Result<(), StoreError> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Unavailable(format!("{}: {e}", parent.display())))?;
        }
        tokio::fs::write(&path, &body)
            .await
            .map_err(|e| StoreError::Unavailable(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "Object written");
        Ok(())
    }

    #[instrument(name = "local_get_object", skip(self))]
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        let path = self.object_path(bucket, key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            Err(e) => Err(StoreError::Unavailable(format!("{}: {e}", path.display()))),
        }
    }
}
