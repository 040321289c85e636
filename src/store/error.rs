//! Error types for catalog persistence.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stored data could not be encoded or decoded.
    #[error("Store format error: {0}")]
    Format(#[from] serde_json::Error),

    /// The backend refused the operation for a reason of its own.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
