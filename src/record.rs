//! Inventory record types and identity newtypes.
//!
//! An [`InventoryRecord`] is one cataloged media item, keyed by the
//! external content identifier the media service assigned to it. Records
//! carry the personality tags used for retrieval, usage statistics for
//! ranking, and the content digest used for deduplication.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::personality::PersonalityDirectory;
use crate::storage::StorageError;

/// External content-addressable identifier of a media item.
///
/// File ids are assigned by the external media service and may change when
/// the item is migrated; the catalog moves the record atomically when that
/// happens. A `FileId` is never generated locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    /// Wraps an externally assigned identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FileId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for FileId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Numeric identifier of a user as reported by the messaging platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a personality record in the directory.
///
/// The catalog stores references only; canonical display names live in the
/// [`PersonalityDirectory`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonalityRef(String);

impl PersonalityRef {
    /// Wraps a directory key.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the directory key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonalityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PersonalityRef {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Media type of a cataloged item.
///
/// The catalog currently stores exactly one kind of media; the enum exists
/// so the stored type is explicit rather than an untyped string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    /// Soundless MPEG-4 animation (the platform's "GIF").
    #[default]
    Mpeg4Gif,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mpeg4Gif => write!(f, "mpeg4_gif"),
        }
    }
}

/// BLAKE3 digest of a media item's bytes, used jointly with the byte size
/// for duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Computes the digest of the given bytes.
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    /// Returns the raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 32]> for ContentHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// One cataloged media item.
///
/// Records are keyed by [`FileId`]; at most one record may exist per id.
/// Best effort, at most one record shares a `(content_hash, file_size)`
/// pair — a second one is an integrity conflict detected at lookup time,
/// not a crash condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// Primary key. Changes only through an atomic rename.
    pub file_id: FileId,

    /// Stored media type.
    pub file_type: FileType,

    /// Ordered set of personality tags. Expected non-empty on creation,
    /// but query paths must tolerate an empty set.
    #[serde(default)]
    pub personalities: Vec<PersonalityRef>,

    /// First writer of the record. Set once; later re-registrations never
    /// change it.
    pub creator: Option<UserId>,

    /// Number of times the item was served. Monotonically non-decreasing
    /// under normal operation.
    pub usage_count: u64,

    /// Last time the item was registered or served.
    pub last_used: DateTime<Utc>,

    /// Content digest for dedup. Absent until the first metadata refresh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<ContentHash>,

    /// Byte size of the media item, the cheap half of the dedup key.
    pub file_size: u64,
}

impl InventoryRecord {
    /// Creates a fresh record with the given tags, owned by `creator`.
    #[must_use]
    pub fn new(file_id: FileId, personalities: Vec<PersonalityRef>, creator: UserId) -> Self {
        Self {
            file_id,
            file_type: FileType::default(),
            personalities: dedup_ordered(personalities),
            creator: Some(creator),
            usage_count: 0,
            last_used: Utc::now(),
            content_hash: None,
            file_size: 0,
        }
    }

    /// Renders the record for human consumption: the file id followed by
    /// the canonical names of its personalities.
    ///
    /// # Errors
    /// Propagates directory failures, including a reference that no longer
    /// resolves — rendering presupposes directory consistency.
    pub fn describe(&self, directory: &dyn PersonalityDirectory) -> Result<String, StorageError> {
        let mut names = Vec::with_capacity(self.personalities.len());
        for p in &self.personalities {
            names.push(directory.canonical_name(p)?);
        }
        Ok(format!("{} [{}]", self.file_id, names.join(", ")))
    }
}

/// Drops duplicate references, keeping first occurrences in order.
pub(crate) fn dedup_ordered(refs: Vec<PersonalityRef>) -> Vec<PersonalityRef> {
    let mut seen = std::collections::HashSet::new();
    refs.into_iter().filter(|r| seen.insert(r.clone())).collect()
}
