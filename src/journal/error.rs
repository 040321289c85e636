//! Error types for the transaction journal.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JournalError {
    /// The sink could not read or write its backing file.
    #[error("Journal I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The sink refused the operation for a reason of its own.
    #[error("Journal sink error: {0}")]
    Sink(String),

    /// The journal task is gone; nothing can be recorded any more.
    #[error("Journal actor closed")]
    ActorClosed,

    /// The journal task dropped the request without answering.
    #[error("Journal actor dropped response channel")]
    ActorDropped,
}
