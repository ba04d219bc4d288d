//! Error types for the catalog.
//!
//! All errors are strongly typed using thiserror. Absence and permission
//! rejection are distinct variants rather than sentinel error values, so
//! callers can pattern match on the condition they care about and can
//! never confuse infrastructure failure with a missing record.

use thiserror::Error;

use crate::blob::BlobError;
use crate::media::MediaError;
use crate::record::FileId;
use crate::storage::StorageError;

/// Top-level error type for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The operation presupposed an existing record and none was found.
    #[error("Inventory record not found: {0}")]
    NotFound(FileId),

    /// An existing record may only be updated by its creator or an admin.
    #[error("Only the original creator or an admin can update an existing record")]
    PermissionDenied,

    /// Backing store failure.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// External media service failure.
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Durable blob store failure.
    #[error("Blob error: {0}")]
    Blob(#[from] BlobError),
}

impl CatalogError {
    /// Returns true if this is a not-found condition.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns true if this is a permission rejection.
    #[must_use]
    pub const fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied)
    }
}

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
