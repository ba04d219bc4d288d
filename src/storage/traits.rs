//! Abstract storage traits for the inventory catalog.
//!
//! The catalog talks to its backing store exclusively through
//! [`InventoryRepo`]. By using a trait, we enable:
//! - In-memory backends for testing and embedded use
//! - Durable backends for production
//!
//! Absence is never encoded as an error: reads return `Ok(None)` so
//! callers cannot mistake infrastructure failure for a missing record.

use thiserror::Error;

use crate::record::{ContentHash, FileId, InventoryRecord, PersonalityRef};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A personality reference did not resolve in the directory.
    #[error("Personality not found: {0}")]
    PersonalityNotFound(PersonalityRef),

    /// Backend error.
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Equality filter on record properties. Multiple filters in a query are
/// AND-combined.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Record is tagged with the given personality.
    Personality(PersonalityRef),
    /// Record's byte size equals the given value.
    FileSize(u64),
    /// Record's content digest equals the given value.
    ContentHash(ContentHash),
}

/// Descending sort order for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Most used first.
    UsageCountDesc,
    /// Most recently used first.
    LastUsedDesc,
}

/// A kind-scoped query: equality filters, an optional descending order,
/// and offset/limit pagination. Projection is always key-only; callers
/// fetch full records afterwards with [`InventoryRepo::get_multi`].
#[derive(Debug, Clone, Default)]
pub struct Query {
    filters: Vec<Filter>,
    order: Option<Order>,
    offset: usize,
    limit: Option<usize>,
}

impl Query {
    /// Creates an unfiltered, unordered, unpaginated query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality filter.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    /// Skips the first `offset` results.
    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Caps the number of results.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The equality filters, in insertion order.
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// The sort order, if any.
    #[must_use]
    pub fn ordering(&self) -> Option<Order> {
        self.order
    }

    /// The pagination offset.
    #[must_use]
    pub fn start_offset(&self) -> usize {
        self.offset
    }

    /// The result cap, if any.
    #[must_use]
    pub fn result_limit(&self) -> Option<usize> {
        self.limit
    }
}

/// A transaction in progress.
///
/// The transaction is a scoped resource: dropping it without calling
/// [`commit`](RepoTransaction::commit) rolls back every staged write, on
/// every exit path. Reads observe writes staged earlier in the same
/// transaction.
pub trait RepoTransaction {
    /// Reads a record, observing staged writes.
    fn get(&mut self, id: &FileId) -> Result<Option<InventoryRecord>, StorageError>;

    /// Stages an upsert of the record under its `file_id`.
    fn put(&mut self, record: InventoryRecord) -> Result<(), StorageError>;

    /// Stages a delete. Deleting an absent key is a no-op.
    fn delete(&mut self, id: &FileId) -> Result<(), StorageError>;

    /// Atomically applies all staged writes.
    fn commit(self: Box<Self>) -> Result<(), StorageError>;
}

/// Storage trait for inventory records.
///
/// Transactions returned by [`begin`](InventoryRepo::begin) may span
/// multiple keys; rename-style mutations rely on that.
pub trait InventoryRepo: Send + Sync {
    /// Reads one record by id. Absence is `Ok(None)`.
    fn get(&self, id: &FileId) -> Result<Option<InventoryRecord>, StorageError>;

    /// Reads several records by id, preserving input order. Missing ids
    /// yield `None` at their position.
    fn get_multi(&self, ids: &[FileId]) -> Result<Vec<Option<InventoryRecord>>, StorageError>;

    /// Upserts a record under its `file_id`, outside any transaction.
    fn put(&self, record: InventoryRecord) -> Result<(), StorageError>;

    /// Deletes a record outside any transaction. Absent key is a no-op.
    fn delete(&self, id: &FileId) -> Result<(), StorageError>;

    /// Runs a key-only query, returning matching ids.
    fn query_keys(&self, query: &Query) -> Result<Vec<FileId>, StorageError>;

    /// Counts records matching a query. Offset and limit are ignored.
    fn count(&self, query: &Query) -> Result<usize, StorageError>;

    /// Opens a multi-key atomic transaction.
    fn begin(&self) -> Result<Box<dyn RepoTransaction + '_>, StorageError>;
}
