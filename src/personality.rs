//! Read-only personality directory.
//!
//! The directory maps [`PersonalityRef`]s to canonical display names. The
//! catalog only reads from it when rendering records; ownership of the
//! personality data lives elsewhere.

use std::collections::HashMap;

use crate::record::PersonalityRef;
use crate::storage::StorageError;

/// Read-only lookup of canonical personality names.
pub trait PersonalityDirectory: Send + Sync {
    /// Resolves a reference to its canonical display name.
    ///
    /// # Errors
    /// `StorageError::PersonalityNotFound` when the reference does not
    /// resolve; backend failures as `StorageError::Backend`.
    fn canonical_name(&self, reference: &PersonalityRef) -> Result<String, StorageError>;
}

/// In-memory directory for embedded use and tests.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    names: HashMap<PersonalityRef, String>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a canonical name for a reference, replacing any previous
    /// entry.
    pub fn insert(&mut self, reference: PersonalityRef, name: impl Into<String>) {
        self.names.insert(reference, name.into());
    }
}

impl PersonalityDirectory for InMemoryDirectory {
    fn canonical_name(&self, reference: &PersonalityRef) -> Result<String, StorageError> {
        self.names
            .get(reference)
            .cloned()
            .ok_or_else(|| StorageError::PersonalityNotFound(reference.clone()))
    }
}
