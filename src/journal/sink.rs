//! Where journal lines end up.

use super::JournalError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// Append-only storage for already stamped journal lines.
///
/// A sink is owned by exactly one [`JournalActor`](super::JournalActor), so
/// implementations need no locking of their own for ordering.
#[async_trait]
pub trait JournalSink: Send + 'static {
    async fn append(&mut self, line: &str) -> Result<(), JournalError>;

    /// Every line recorded so far, oldest first.
    async fn read_all(&mut self) -> Result<Vec<String>, JournalError>;

    async fn clear(&mut self) -> Result<(), JournalError>;
}

/// Appends lines to a text file, one per line.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> JournalError {
        JournalError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl JournalSink for FileSink {
    async fn append(&mut self, line: &str) -> Result<(), JournalError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        file.write_all(format!("{line}\n").as_bytes())
            .await
            .map_err(|e| self.io_error(e))?;
        file.flush().await.map_err(|e| self.io_error(e))
    }

    async fn read_all(&mut self) -> Result<Vec<String>, JournalError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(contents.lines().map(str::to_owned).collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    async fn clear(&mut self) -> Result<(), JournalError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Keeps lines in memory. Clones share the same buffer, so a test can keep
/// one clone to inspect what the actor wrote through the other.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

#[async_trait]
impl JournalSink for MemorySink {
    async fn append(&mut self, line: &str) -> Result<(), JournalError> {
        self.lines.lock().push(line.to_owned());
        Ok(())
    }

    async fn read_all(&mut self) -> Result<Vec<String>, JournalError> {
        Ok(self.lines())
    }

    async fn clear(&mut self) -> Result<(), JournalError> {
        self.lines.lock().clear();
        Ok(())
    }
}
