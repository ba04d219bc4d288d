//! Inventory catalog operations.
//!
//! [`Catalog`] owns the persisted records and is the only writer to the
//! backing store. Usage increments, renames, and metadata refreshes each
//! run as one atomic transaction; registration deliberately is not
//! transactional end-to-end (see [`Catalog::create`]).

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info};

use crate::blob::BlobStore;
use crate::config::{AccessPolicy, Environment};
use crate::error::{CatalogError, CatalogResult};
use crate::media::MediaFetcher;
use crate::record::{dedup_ordered, ContentHash, FileId, FileType, InventoryRecord, PersonalityRef, UserId};
use crate::storage::{Filter, InventoryRepo, Order, Query};

/// Fixed page size for all paginated retrieval.
pub const PAGE_SIZE: usize = 50;

/// The inventory store.
pub struct Catalog {
    repo: Arc<dyn InventoryRepo>,
    media: Arc<dyn MediaFetcher>,
    blobs: Arc<dyn BlobStore>,
    environment: Environment,
}

impl Catalog {
    /// Creates a catalog over the given collaborators.
    #[must_use]
    pub fn new(
        repo: Arc<dyn InventoryRepo>,
        media: Arc<dyn MediaFetcher>,
        blobs: Arc<dyn BlobStore>,
        environment: Environment,
    ) -> Self {
        Self {
            repo,
            media,
            blobs,
            environment,
        }
    }

    /// Fetches the record for `file_id`.
    ///
    /// # Errors
    /// `CatalogError::NotFound` when no record exists — this lookup
    /// presupposes existence, unlike the tolerant mutation paths.
    pub fn get(&self, file_id: &FileId) -> CatalogResult<InventoryRecord> {
        self.repo
            .get(file_id)?
            .ok_or_else(|| CatalogError::NotFound(file_id.clone()))
    }

    /// Looks up an existing record holding the same content as `file_id`.
    ///
    /// The size hint filters candidates first; when nothing matches the
    /// size, the byte fetch is skipped entirely. Otherwise the bytes are
    /// fetched and hashed, and an exact digest match is searched for.
    ///
    /// Returns `Ok(None)` when there is no match — including the case of
    /// several records sharing the digest, which is an integrity conflict:
    /// it is logged at high severity and no arbitrary pick is made.
    ///
    /// # Errors
    /// Storage and media-fetch failures.
    pub fn get_by_content(
        &self,
        file_id: &FileId,
        size_hint: u64,
    ) -> CatalogResult<Option<InventoryRecord>> {
        let candidates = self
            .repo
            .count(&Query::new().filter(Filter::FileSize(size_hint)))?;
        if candidates == 0 {
            return Ok(None);
        }

        let media = self.media.fetch(file_id)?;
        let hash = ContentHash::of(&media.bytes);

        let keys = self
            .repo
            .query_keys(&Query::new().filter(Filter::ContentHash(hash)))?;
        match keys.as_slice() {
            [] => Ok(None),
            [key] => Ok(self.repo.get(key)?),
            _ => {
                error!(%hash, matches = keys.len(), "content hash conflict");
                Ok(None)
            }
        }
    }

    /// Registers a media item, or refreshes the personality set of an
    /// existing one.
    ///
    /// The first writer becomes the record's creator; afterwards only the
    /// creator or an admin (per the injected `policy`) may re-register it.
    /// Usage statistics and dedup metadata survive re-registration.
    ///
    /// The permission read and the subsequent write are two separate store
    /// operations; concurrent creators can race past the check. Preserved
    /// as a documented limitation of the original design.
    ///
    /// # Errors
    /// `CatalogError::PermissionDenied` for a non-owner, non-admin update
    /// of an existing record; storage failures otherwise.
    pub fn create(
        &self,
        file_id: FileId,
        personalities: Vec<PersonalityRef>,
        requester: UserId,
        policy: &dyn AccessPolicy,
    ) -> CatalogResult<InventoryRecord> {
        let existing = self.repo.get(&file_id)?;

        if let Some(existing) = &existing {
            let owns = existing.creator == Some(requester);
            if !owns && !policy.is_admin(requester) {
                return Err(CatalogError::PermissionDenied);
            }
        }

        let mut record = existing.unwrap_or_else(|| InventoryRecord {
            file_id: file_id.clone(),
            file_type: FileType::default(),
            personalities: Vec::new(),
            creator: None,
            usage_count: 0,
            last_used: Utc::now(),
            content_hash: None,
            file_size: 0,
        });

        record.file_type = FileType::default();
        record.personalities = dedup_ordered(personalities);
        record.last_used = Utc::now();
        if record.creator.is_none() {
            record.creator = Some(requester);
        }

        self.repo.put(record.clone())?;
        Ok(record)
    }

    /// Paginated retrieval of records tagged with every given personality,
    /// most used first.
    ///
    /// `cursor` is the continuation string returned by a previous call; an
    /// unparseable cursor reads as offset zero. The returned cursor is
    /// non-empty only when the page came back full — a heuristic signal
    /// that more results may exist.
    ///
    /// # Errors
    /// Storage failures.
    pub fn find(
        &self,
        personalities: &[PersonalityRef],
        cursor: &str,
    ) -> CatalogResult<(Vec<InventoryRecord>, String)> {
        let offset = cursor.parse::<usize>().unwrap_or(0);

        let mut query = Query::new()
            .order(Order::UsageCountDesc)
            .offset(offset)
            .limit(PAGE_SIZE);
        for p in personalities {
            query = query.filter(Filter::Personality(p.clone()));
        }

        let keys = self.repo.query_keys(&query)?;
        if keys.is_empty() {
            return Ok((Vec::new(), String::new()));
        }

        // Records that vanished between the key query and the fetch are
        // skipped rather than failing the page.
        let records: Vec<_> = self.repo.get_multi(&keys)?.into_iter().flatten().collect();

        let next_cursor = if keys.len() == PAGE_SIZE {
            (offset + PAGE_SIZE).to_string()
        } else {
            String::new()
        };
        Ok((records, next_cursor))
    }

    /// The most recently used records across the whole catalog, one page.
    ///
    /// # Errors
    /// Storage failures.
    pub fn recently_used(&self) -> CatalogResult<Vec<InventoryRecord>> {
        let keys = self.repo.query_keys(
            &Query::new().order(Order::LastUsedDesc).limit(PAGE_SIZE),
        )?;
        Ok(self.repo.get_multi(&keys)?.into_iter().flatten().collect())
    }

    /// All stored file ids. Maintenance/batch use; not latency-sensitive.
    ///
    /// # Errors
    /// Storage failures.
    pub fn all_file_ids(&self) -> CatalogResult<Vec<FileId>> {
        Ok(self.repo.query_keys(&Query::new())?)
    }

    /// Records a use of the item: bumps the counter and the last-used
    /// timestamp in one transaction.
    ///
    /// A missing record is a silent success — the expected race with a
    /// concurrent rename, not an anomaly.
    ///
    /// # Errors
    /// Storage failures.
    pub fn increment_usage(&self, file_id: &FileId) -> CatalogResult<()> {
        let mut tx = self.repo.begin()?;
        let Some(mut record) = tx.get(file_id)? else {
            return Ok(());
        };

        record.usage_count += 1;
        record.last_used = Utc::now();

        tx.put(record)?;
        tx.commit()?;
        Ok(())
    }

    /// Number of records tagged with the given personality.
    ///
    /// # Errors
    /// Storage failures.
    pub fn count_by_personality(&self, personality: &PersonalityRef) -> CatalogResult<usize> {
        Ok(self
            .repo
            .count(&Query::new().filter(Filter::Personality(personality.clone())))?)
    }

    /// Moves the record from `old` to `new` in one atomic transaction.
    /// No observer ever sees the new key without the old one removed, or
    /// vice versa.
    ///
    /// # Errors
    /// `CatalogError::NotFound` when `old` has no record — a rename
    /// requires an existing source. Storage failures otherwise.
    pub fn rename(&self, old: &FileId, new: &FileId) -> CatalogResult<InventoryRecord> {
        let mut tx = self.repo.begin()?;
        let Some(mut record) = tx.get(old)? else {
            return Err(CatalogError::NotFound(old.clone()));
        };

        record.file_id = new.clone();

        tx.delete(old)?;
        tx.put(record.clone())?;
        tx.commit()?;
        Ok(record)
    }

    /// Re-fetches the item from the media service and refreshes the
    /// stored hash and size. When the service reports a different
    /// canonical identifier, the record is moved to the new key within the
    /// same transaction.
    ///
    /// In production the fetched bytes are archived to the durable blob
    /// store first; sandboxed instances skip the upload. A record missing
    /// at transaction time is a silent no-op, same rationale as
    /// [`increment_usage`](Catalog::increment_usage).
    ///
    /// # Errors
    /// Media-fetch, blob, and storage failures.
    pub fn refresh_metadata(&self, old: &FileId) -> CatalogResult<()> {
        let media = self.media.fetch(old)?;
        let new_id = media.file_id.clone();
        if new_id != *old {
            info!(%old, %new_id, "detected file id change");
        }

        if self.environment.is_production() {
            self.blobs.write(new_id.as_str(), &media.bytes)?;
        }

        let hash = ContentHash::of(&media.bytes);
        debug!(file_id = %new_id, %hash, size = media.file_size, "refreshed media metadata");

        let mut tx = self.repo.begin()?;
        let Some(mut record) = tx.get(old)? else {
            return Ok(());
        };

        record.file_id = new_id.clone();
        record.content_hash = Some(hash);
        record.file_size = media.file_size;

        if new_id != *old {
            tx.delete(old)?;
        }
        tx.put(record)?;
        tx.commit()?;
        Ok(())
    }
}
