//! External media-fetch seam.
//!
//! The media service is the source of truth for a file's canonical
//! identifier, byte size, and raw bytes. The catalog calls it when it
//! needs to hash content (dedup lookup) or refresh stored metadata.

use thiserror::Error;

use crate::record::FileId;

/// Errors from the external media service.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The service does not know the identifier.
    #[error("Media not retrievable: {0}")]
    NotRetrievable(FileId),

    /// Transport-level failure.
    #[error("Media service error: {0}")]
    Service(String),
}

/// A media item as returned by the external service.
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    /// Canonical identifier. May differ from the requested one when the
    /// service has migrated the file; the catalog treats that as a rename.
    pub file_id: FileId,

    /// Byte size reported by the service.
    pub file_size: u64,

    /// Raw content bytes.
    pub bytes: Vec<u8>,
}

/// Fetches media metadata and bytes from the external service.
pub trait MediaFetcher: Send + Sync {
    /// Fetches the item behind `id`.
    ///
    /// # Errors
    /// `MediaError::NotRetrievable` when the identifier is unknown;
    /// `MediaError::Service` on transport failure.
    fn fetch(&self, id: &FileId) -> Result<FetchedMedia, MediaError>;
}
