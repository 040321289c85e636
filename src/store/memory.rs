use super::{CatalogStore, StoreError};
use crate::model::ItemRecord;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory store, mostly for tests.
///
/// It can be switched into a failing mode to exercise I/O error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<ItemRecord>>,
    saves: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `records`.
    pub fn with_records(records: Vec<ItemRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    /// Makes every following save and load fail with [`StoreError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<ItemRecord> {
        self.records.lock().clone()
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store set to fail".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn save(&self, records: &[ItemRecord]) -> Result<(), StoreError> {
        self.check()?;
        *self.records.lock() = records.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load(&self) -> Result<Vec<ItemRecord>, StoreError> {
        self.check()?;
        Ok(self.records())
    }
}
