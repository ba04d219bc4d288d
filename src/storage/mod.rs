//! Storage layer: abstract repository traits and backends.

pub mod memory;
pub mod traits;

pub use memory::InMemoryRepo;
pub use traits::{Filter, InventoryRepo, Order, Query, RepoTransaction, StorageError};
