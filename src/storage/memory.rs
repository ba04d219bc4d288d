//! In-memory storage backend.
//!
//! This module provides a thread-safe in-memory implementation of
//! [`InventoryRepo`]. It is intended for embedded usage, tests, and as a
//! reference implementation for durable backends.
//!
//! Transactions hold the write lock for their whole lifetime and stage
//! writes in an overlay that is applied on commit, so a dropped
//! transaction leaves the map untouched.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockWriteGuard};

use crate::record::{FileId, InventoryRecord};
use crate::storage::traits::{Filter, InventoryRepo, Order, Query, RepoTransaction, StorageError};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::Backend(format!("poisoned lock: {context}"))
}

fn matches(record: &InventoryRecord, filter: &Filter) -> bool {
    match filter {
        Filter::Personality(p) => record.personalities.contains(p),
        Filter::FileSize(size) => record.file_size == *size,
        Filter::ContentHash(hash) => record.content_hash.as_ref() == Some(hash),
    }
}

fn matches_all(record: &InventoryRecord, query: &Query) -> bool {
    query.filters().iter().all(|f| matches(record, f))
}

/// Sorts key/record pairs per the query order. The file id breaks ties so
/// paging over equal sort keys stays deterministic.
fn sort_keys(pairs: &mut [(FileId, u64, chrono::DateTime<chrono::Utc>)], order: Option<Order>) {
    match order {
        Some(Order::UsageCountDesc) => {
            pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        }
        Some(Order::LastUsedDesc) => {
            pairs.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
        }
        None => pairs.sort_by(|a, b| a.0.cmp(&b.0)),
    }
}

/// Thread-safe in-memory inventory repository.
#[derive(Debug, Default)]
pub struct InMemoryRepo {
    state: RwLock<HashMap<FileId, InventoryRecord>>,
}

impl InMemoryRepo {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    ///
    /// # Errors
    /// `StorageError::Backend` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.state.read().map_err(|_| lock_err("repo.len"))?.len())
    }

    /// Returns true if no records are stored.
    ///
    /// # Errors
    /// `StorageError::Backend` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

impl InventoryRepo for InMemoryRepo {
    fn get(&self, id: &FileId) -> Result<Option<InventoryRecord>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("repo.get"))?;
        Ok(state.get(id).cloned())
    }

    fn get_multi(&self, ids: &[FileId]) -> Result<Vec<Option<InventoryRecord>>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("repo.get_multi"))?;
        Ok(ids.iter().map(|id| state.get(id).cloned()).collect())
    }

    fn put(&self, record: InventoryRecord) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("repo.put"))?;
        state.insert(record.file_id.clone(), record);
        Ok(())
    }

    fn delete(&self, id: &FileId) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("repo.delete"))?;
        state.remove(id);
        Ok(())
    }

    fn query_keys(&self, query: &Query) -> Result<Vec<FileId>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("repo.query_keys"))?;

        let mut pairs: Vec<_> = state
            .values()
            .filter(|r| matches_all(r, query))
            .map(|r| (r.file_id.clone(), r.usage_count, r.last_used))
            .collect();
        sort_keys(&mut pairs, query.ordering());

        let keys = pairs
            .into_iter()
            .map(|(id, _, _)| id)
            .skip(query.start_offset());
        Ok(match query.result_limit() {
            Some(limit) => keys.take(limit).collect(),
            None => keys.collect(),
        })
    }

    fn count(&self, query: &Query) -> Result<usize, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("repo.count"))?;
        Ok(state.values().filter(|r| matches_all(r, query)).count())
    }

    fn begin(&self) -> Result<Box<dyn RepoTransaction + '_>, StorageError> {
        let guard = self.state.write().map_err(|_| lock_err("repo.begin"))?;
        Ok(Box::new(MemTransaction {
            guard,
            staged: HashMap::new(),
        }))
    }
}

/// Transaction over the in-memory map. Staged writes live in an overlay
/// (`None` marks a staged delete) until commit.
struct MemTransaction<'a> {
    guard: RwLockWriteGuard<'a, HashMap<FileId, InventoryRecord>>,
    staged: HashMap<FileId, Option<InventoryRecord>>,
}

impl RepoTransaction for MemTransaction<'_> {
    fn get(&mut self, id: &FileId) -> Result<Option<InventoryRecord>, StorageError> {
        if let Some(staged) = self.staged.get(id) {
            return Ok(staged.clone());
        }
        Ok(self.guard.get(id).cloned())
    }

    fn put(&mut self, record: InventoryRecord) -> Result<(), StorageError> {
        self.staged.insert(record.file_id.clone(), Some(record));
        Ok(())
    }

    fn delete(&mut self, id: &FileId) -> Result<(), StorageError> {
        self.staged.insert(id.clone(), None);
        Ok(())
    }

    fn commit(mut self: Box<Self>) -> Result<(), StorageError> {
        for (id, staged) in self.staged.drain() {
            match staged {
                Some(record) => {
                    self.guard.insert(id, record);
                }
                None => {
                    self.guard.remove(&id);
                }
            }
        }
        Ok(())
    }
}
