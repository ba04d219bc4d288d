//! Durable blob store seam.
//!
//! Production deployments archive fetched media bytes so the catalog
//! survives the external service expiring them. Sandboxed instances skip
//! the upload entirely; see [`Catalog::refresh_metadata`](crate::Catalog::refresh_metadata).

use std::fs;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from the durable blob store.
#[derive(Debug, Error)]
pub enum BlobError {
    /// The write failed.
    #[error("Blob write failed for {key}: {message}")]
    Write {
        /// Key the write targeted.
        key: String,
        /// Underlying failure.
        message: String,
    },
}

/// Write-only durable blob storage.
pub trait BlobStore: Send + Sync {
    /// Durably stores `bytes` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// `BlobError::Write` on failure.
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), BlobError>;
}

/// Blob store backed by a local directory, one file per key.
#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Creates a store rooted at `root`. The directory is created lazily
    /// on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BlobStore for FsBlobStore {
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), BlobError> {
        let wrap = |e: std::io::Error| BlobError::Write {
            key: key.to_string(),
            message: e.to_string(),
        };
        fs::create_dir_all(&self.root).map_err(wrap)?;
        fs::write(self.root.join(key), bytes).map_err(wrap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_blob_store_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path().join("blobs"));

        store.write("f1", b"payload").unwrap();
        let written = fs::read(dir.path().join("blobs").join("f1")).unwrap();
        assert_eq!(written, b"payload");
    }

    #[test]
    fn test_fs_blob_store_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        store.write("f1", b"one").unwrap();
        store.write("f1", b"two").unwrap();
        assert_eq!(fs::read(dir.path().join("f1")).unwrap(), b"two");
    }
}
