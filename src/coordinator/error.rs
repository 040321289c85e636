//! Error types for the borrow coordinator.

use thiserror::Error;

/// Errors that stop a race from producing a report.
///
/// A borrower finding the item unavailable is not among them; that is a
/// normal [`BorrowOutcome`](crate::model::BorrowOutcome).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoordinatorError {
    /// The race was started with no attempts.
    #[error("No borrow attempts to run")]
    NoAttempts,

    /// An attempt was submitted for an actor without the borrower role.
    #[error("{0} is not a borrower")]
    NotABorrower(String),

    /// The task running an attempt panicked or was aborted.
    #[error("Borrow attempt failed: {0}")]
    AttemptPanicked(String),

    /// The pool semaphore was closed while attempts were waiting.
    #[error("Attempt pool closed")]
    PoolClosed,
}
