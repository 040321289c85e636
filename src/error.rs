//! Top-level error type for library operations.

use crate::coordinator::CoordinatorError;
use crate::journal::JournalError;
use crate::store::StoreError;
use thiserror::Error;

/// Errors returned by [`LibrarySystem`](crate::runtime::LibrarySystem) operations.
///
/// A borrow that finds its item on loan is not an error; see
/// [`BorrowOutcome::Unavailable`](crate::model::BorrowOutcome::Unavailable).
#[derive(Debug, Error)]
pub enum LibraryError {
    /// No item matches the given title or identifier.
    #[error("Item not found: {0}")]
    NotFound(String),

    /// The actor's role does not allow the operation.
    #[error("{actor} is not permitted to {operation}")]
    NotPermitted {
        actor: String,
        operation: &'static str,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Journal(#[from] JournalError),

    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    /// A background task panicked or was cancelled.
    #[error("Task failed: {0}")]
    TaskFailed(String),
}
