//! # gifdex
//!
//! gifdex catalogs media items tagged by named personalities, deduplicates
//! them by content digest, tracks usage popularity, and serves paginated,
//! filtered retrieval. A second subsystem resolves free-text queries to
//! canonical knowledge-graph entity identifiers through a memoized,
//! fail-open lookup against an external search backend.
//!
//! ## Core pieces
//!
//! - [`Catalog`]: transactional mutation, dedup lookup, pagination, and
//!   atomic rename/migration of inventory records
//! - [`EntityResolver`]: memoized entity resolution with negative-result
//!   caching that degrades to an empty answer on backend failure
//! - [`storage::InventoryRepo`]: the repository seam; an in-memory backend
//!   ships for embedded use and tests
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use gifdex::{Catalog, Config, Environment, FileId, PersonalityRef, UserId};
//! use gifdex::storage::InMemoryRepo;
//! # use gifdex::media::{FetchedMedia, MediaError, MediaFetcher};
//! # use gifdex::blob::FsBlobStore;
//! # struct NoMedia;
//! # impl MediaFetcher for NoMedia {
//! #     fn fetch(&self, id: &FileId) -> Result<FetchedMedia, MediaError> {
//! #         Err(MediaError::NotRetrievable(id.clone()))
//! #     }
//! # }
//!
//! let repo = Arc::new(InMemoryRepo::new());
//! let catalog = Catalog::new(
//!     repo,
//!     Arc::new(NoMedia),
//!     Arc::new(FsBlobStore::new("/tmp/gifdex-blobs")),
//!     Environment::Sandbox,
//! );
//!
//! let policy = Config::new(Environment::Sandbox);
//! let record = catalog
//!     .create(
//!         FileId::from("file-1"),
//!         vec![PersonalityRef::from("personality-1")],
//!         UserId(42),
//!         &policy,
//!     )
//!     .unwrap();
//! assert_eq!(record.creator, Some(UserId(42)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod blob;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod media;
pub mod personality;
pub mod record;
pub mod resolver;
pub mod storage;

// Re-export primary types at crate root for convenience
pub use blob::{BlobError, BlobStore, FsBlobStore};
pub use cache::{CacheStore, InMemoryCache};
pub use catalog::{Catalog, PAGE_SIZE};
pub use config::{AccessPolicy, Config, Environment};
pub use error::{CatalogError, CatalogResult};
pub use media::{FetchedMedia, MediaError, MediaFetcher};
pub use personality::{InMemoryDirectory, PersonalityDirectory};
pub use record::{ContentHash, FileId, FileType, InventoryRecord, PersonalityRef, UserId};
pub use resolver::{
    EntityResolver, KgSearchClient, SearchBackend, SearchError, SearchHit, SearchRequest,
};
pub use storage::{Filter, InventoryRepo, Order, Query, RepoTransaction, StorageError};
