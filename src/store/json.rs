use super::{CatalogStore, StoreError};
use crate::model::ItemRecord;
use async_trait::async_trait;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Stores the catalog as a pretty-printed JSON array.
///
/// Every save writes its own uniquely named temporary file next to the target
/// and then renames it over the target, so a crash mid-save never leaves a
/// truncated catalog behind and overlapping saves never share a staging file.
/// The rename is atomic, so the last save to finish wins as a whole.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[async_trait]
impl CatalogStore for JsonFileStore {
    async fn save(&self, records: &[ItemRecord]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(records)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, &bytes))
            .await
            .map_err(|e| StoreError::Unavailable(format!("save task failed: {e}")))??;
        info!(path = %self.path.display(), items = records.len(), "Catalog saved");
        Ok(())
    }

    async fn load(&self) -> Result<Vec<ItemRecord>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No saved catalog, starting fresh");
                return Ok(Vec::new());
            }
            Err(e) => return Err(Self::io_error(&self.path, e)),
        };
        let records: Vec<ItemRecord> = serde_json::from_slice(&bytes)?;
        debug!(path = %self.path.display(), items = records.len(), "Catalog loaded");
        Ok(records)
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent,
        None => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| JsonFileStore::io_error(dir, e))?;

    let mut staging = NamedTempFile::new_in(dir).map_err(|e| JsonFileStore::io_error(dir, e))?;
    staging
        .write_all(bytes)
        .and_then(|()| staging.as_file().sync_all())
        .map_err(|e| JsonFileStore::io_error(staging.path(), e))?;
    staging
        .persist(path)
        .map_err(|e| JsonFileStore::io_error(path, e.error))?;
    Ok(())
}
