//! Generic key-value memoization with per-entry TTL.
//!
//! The cache is best-effort by contract: a miss, an expired entry, and a
//! transient cache-service failure all look identical to the caller
//! (`None`). Entries are independently keyed and overwritable, so no
//! mutual exclusion beyond the store's own lock is needed.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

/// Key-value cache with per-entry TTL.
pub trait CacheStore: Send + Sync {
    /// Looks up a live entry. Expired entries and backend failures both
    /// read as `None`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores a value that expires after `ttl`. Failures are swallowed;
    /// the cache is an optimization, never a source of truth.
    fn set(&self, key: &str, value: String, ttl: Duration);
}

#[derive(Debug, Clone)]
struct Slot {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Thread-safe in-memory cache with lazy expiry.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    slots: RwLock<HashMap<String, Slot>>,
}

impl InMemoryCache {
    /// Creates a new empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots currently held, including not-yet-evicted expired
    /// ones. Intended for tests and diagnostics.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.read().map(|s| s.len()).unwrap_or(0)
    }
}

impl CacheStore for InMemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let now = Utc::now();

        {
            let slots = self.slots.read().ok()?;
            match slots.get(key) {
                Some(slot) if slot.expires_at > now => return Some(slot.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: evict lazily under the write lock.
        if let Ok(mut slots) = self.slots.write() {
            let still_expired = slots.get(key).is_some_and(|slot| slot.expires_at <= now);
            if still_expired {
                slots.remove(key);
            }
        }
        None
    }

    fn set(&self, key: &str, value: String, ttl: Duration) {
        if let Ok(mut slots) = self.slots.write() {
            slots.insert(
                key.to_string(),
                Slot {
                    value,
                    expires_at: Utc::now() + ttl,
                },
            );
        }
    }
}
