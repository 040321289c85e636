//! # Borrow Coordinator
//!
//! Runs several borrowers against one contended item at the same time and
//! reports what each of them saw.
//!
//! Every attempt is a Tokio task on the multi-threaded runtime: it sleeps for
//! its own delay (its "arrival time"), waits for a slot in the pool, then makes
//! one borrow attempt. The attempt is a plain synchronous critical section on
//! the item lock, so nothing is awaited while the lock is held.
//!
//! The coordinator joins every task before it reads the item's final state,
//! even when one of them fails.
//! With an item that starts available and nobody returning it mid-race,
//! exactly one attempt succeeds and the usage count rises by one.
//!
//! ```rust
//! use library_catalog::coordinator::{BorrowAttempt, BorrowCoordinator};
//! use library_catalog::model::{Actor, Item};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "multi_thread", worker_threads = 2)]
//! # async fn main() {
//! let item = Item::new("Java Concurrency in Practice", "Brian Goetz").into_shared();
//! let attempts = vec![
//!     BorrowAttempt::new(Actor::borrower(301, "John", "CS"), Duration::from_millis(10)),
//!     BorrowAttempt::new(Actor::borrower(302, "Jane", "IT"), Duration::from_millis(5)),
//! ];
//!
//! let report = BorrowCoordinator::default().race(item, attempts).await.unwrap();
//! assert_eq!(report.successes(), 1);
//! assert_eq!(report.final_state.usage, 1);
//! # }
//! ```

mod error;

pub use error::CoordinatorError;

use crate::model::{Actor, BorrowOutcome, LoanState, SharedItem};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn, Instrument};

/// Default number of attempts allowed to run at once.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

/// One borrower and the delay before it tries.
#[derive(Debug, Clone)]
pub struct BorrowAttempt {
    pub actor: Actor,
    pub delay: Duration,
}

impl BorrowAttempt {
    pub fn new(actor: Actor, delay: Duration) -> Self {
        Self { actor, delay }
    }
}

/// What a single attempt observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptReport {
    pub actor: Actor,
    pub delay: Duration,
    pub outcome: BorrowOutcome,
}

/// Outcome of a whole race, read after every attempt has been joined.
#[derive(Debug, Clone)]
pub struct RaceReport {
    /// One entry per attempt, in the order the attempts were submitted.
    pub attempts: Vec<AttemptReport>,
    pub final_state: LoanState,
}

impl RaceReport {
    pub fn successes(&self) -> usize {
        self.attempts
            .iter()
            .filter(|attempt| attempt.outcome.is_borrowed())
            .count()
    }

    /// The first successful attempt in submission order.
    pub fn winner(&self) -> Option<&AttemptReport> {
        self.attempts
            .iter()
            .find(|attempt| attempt.outcome.is_borrowed())
    }
}

/// Runs concurrent borrow attempts on a bounded pool of tasks.
#[derive(Debug, Clone)]
pub struct BorrowCoordinator {
    max_in_flight: usize,
}

impl Default for BorrowCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IN_FLIGHT)
    }
}

impl BorrowCoordinator {
    /// `max_in_flight` is clamped to at least one.
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            max_in_flight: max_in_flight.max(1),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Races every attempt against `item` and waits for all of them.
    ///
    /// # Errors
    ///
    /// - [`CoordinatorError::NoAttempts`] if `attempts` is empty.
    /// - [`CoordinatorError::NotABorrower`] if an actor lacks the borrower role;
    ///   this is checked before any task is spawned.
    /// - [`CoordinatorError::AttemptPanicked`] if an attempt task panicked.
    pub async fn race(
        &self,
        item: SharedItem,
        attempts: Vec<BorrowAttempt>,
    ) -> Result<RaceReport, CoordinatorError> {
        if attempts.is_empty() {
            return Err(CoordinatorError::NoAttempts);
        }
        if let Some(attempt) = attempts.iter().find(|attempt| attempt.actor.as_borrower().is_none()) {
            return Err(CoordinatorError::NotABorrower(attempt.actor.name().to_owned()));
        }

        let total = attempts.len();
        info!(title = item.title(), attempts = total, max_in_flight = self.max_in_flight, "Race started");

        let pool = Arc::new(Semaphore::new(self.max_in_flight));
        let mut tasks = JoinSet::new();
        for (index, attempt) in attempts.into_iter().enumerate() {
            let item = Arc::clone(&item);
            let pool = Arc::clone(&pool);
            let span = tracing::debug_span!("attempt", index, actor = attempt.actor.name());
            tasks.spawn(
                async move {
                    // Delay first: arrival order must not depend on pool size.
                    tokio::time::sleep(attempt.delay).await;
                    let _slot = pool
                        .acquire_owned()
                        .await
                        .map_err(|_| CoordinatorError::PoolClosed)?;
                    let outcome = match attempt.actor.as_borrower() {
                        Some(borrower) => borrower.borrow(&item),
                        None => return Err(CoordinatorError::NotABorrower(attempt.actor.name().to_owned())),
                    };
                    debug!(?outcome, "Attempt finished");
                    Ok((
                        index,
                        AttemptReport {
                            actor: attempt.actor,
                            delay: attempt.delay,
                            outcome,
                        },
                    ))
                }
                .instrument(span),
            );
        }

        let attempts = join_all(tasks, total).await?;

        let report = RaceReport {
            attempts,
            final_state: item.loan_state(),
        };
        info!(
            title = item.title(),
            successes = report.successes(),
            usage = report.final_state.usage,
            available = report.final_state.available,
            "Race finished"
        );
        Ok(report)
    }
}

type AttemptResult = Result<(usize, AttemptReport), CoordinatorError>;

/// Joins every task, then returns the reports in submission order or the
/// first failure. A failure never cuts the join short.
async fn join_all(
    mut tasks: JoinSet<AttemptResult>,
    total: usize,
) -> Result<Vec<AttemptReport>, CoordinatorError> {
    let mut reports: Vec<Option<AttemptReport>> = vec![None; total];
    let mut failure = None;
    while let Some(joined) = tasks.join_next().await {
        let result = joined
            .map_err(|e| CoordinatorError::AttemptPanicked(e.to_string()))
            .and_then(|result| result);
        match result {
            Ok((index, report)) => {
                if let Some(slot) = reports.get_mut(index) {
                    *slot = Some(report);
                }
            }
            Err(e) => {
                warn!(error = %e, "Attempt failed");
                failure.get_or_insert(e);
            }
        }
    }
    match failure {
        Some(e) => Err(e),
        None => Ok(reports.into_iter().flatten().collect()),
    }
}
