//! Persistence of the catalog as a sequence of [`ItemRecord`]s.
//!
//! The catalog does not care how records are stored; it only needs the
//! [`CatalogStore`] save/load contract. Callers snapshot the catalog with
//! [`Catalog::records`](crate::catalog::Catalog::records) (which releases every
//! lock before returning) and hand the records to the store, so I/O never runs
//! inside a critical section. A failed save leaves the in-memory catalog as it was.

mod error;
mod json;
mod memory;

pub use error::StoreError;
pub use json::JsonFileStore;
pub use memory::MemoryStore;

use crate::model::ItemRecord;
use async_trait::async_trait;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Durably replaces the stored sequence with `records`.
    async fn save(&self, records: &[ItemRecord]) -> Result<(), StoreError>;

    /// Loads the stored sequence. Nothing stored yet is an empty sequence, not an error.
    async fn load(&self) -> Result<Vec<ItemRecord>, StoreError>;
}
