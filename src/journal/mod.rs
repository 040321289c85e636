//! # Transaction Journal
//!
//! An append-only, best-effort record of what happened in the library
//! ("Student Alice borrowed: Clean Code").
//!
//! The journal follows the actor pattern: a [`JournalActor`] owns the
//! [`JournalSink`] and processes requests one at a time in its own Tokio task;
//! callers talk to it through a cloneable [`JournalClient`]. File I/O therefore
//! never happens on a caller's thread, and certainly never while a catalog or
//! item lock is held.
//!
//! Lines are stamped with the local date when the actor receives them:
//!
//! ```text
//! [2024-03-18] Student Alice borrowed: Clean Code
//! ```
//!
//! ## Shutdown
//!
//! The actor stops once every client has been dropped, the same way the
//! channel-backed actors elsewhere in this crate do.

mod error;
mod sink;

pub use error::JournalError;
pub use sink::{FileSink, JournalSink, MemorySink};

use chrono::{Local, NaiveDate};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Default capacity of the journal request channel.
pub const DEFAULT_BUFFER_SIZE: usize = 32;

/// One-shot response channel used by the journal actor.
pub type Response<T> = oneshot::Sender<Result<T, JournalError>>;

/// Requests understood by the journal actor.
#[derive(Debug)]
pub enum JournalRequest {
    Record {
        entry: String,
        respond_to: Response<()>,
    },
    Entries {
        respond_to: Response<Vec<String>>,
    },
    Clear {
        respond_to: Response<()>,
    },
}

/// Formats a journal line.
pub fn stamp(date: NaiveDate, entry: &str) -> String {
    format!("[{date}] {entry}")
}

/// Server half of the journal: owns the sink and the request receiver.
pub struct JournalActor<S: JournalSink> {
    receiver: mpsc::Receiver<JournalRequest>,
    sink: S,
}

impl<S: JournalSink> JournalActor<S> {
    /// Creates the actor and its client. The actor does nothing until [`run`](Self::run) is spawned.
    pub fn new(buffer_size: usize, sink: S) -> (Self, JournalClient) {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let actor = Self { receiver, sink };
        (actor, JournalClient::new(sender))
    }

    /// Processes requests until every client is dropped.
    pub async fn run(mut self) {
        info!("Journal started");
        let mut recorded = 0usize;

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                JournalRequest::Record { entry, respond_to } => {
                    let line = stamp(Local::now().date_naive(), &entry);
                    let result = self.sink.append(&line).await;
                    match &result {
                        Ok(()) => {
                            recorded += 1;
                            debug!(%line, "Recorded");
                        }
                        Err(e) => warn!(error = %e, "Record failed"),
                    }
                    let _ = respond_to.send(result);
                }
                JournalRequest::Entries { respond_to } => {
                    let result = self.sink.read_all().await;
                    if let Err(e) = &result {
                        warn!(error = %e, "Read failed");
                    }
                    let _ = respond_to.send(result);
                }
                JournalRequest::Clear { respond_to } => {
                    let result = self.sink.clear().await;
                    match &result {
                        Ok(()) => info!("Cleared"),
                        Err(e) => warn!(error = %e, "Clear failed"),
                    }
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(recorded, "Journal shutdown");
    }
}

/// Client half of the journal.
#[derive(Debug, Clone)]
pub struct JournalClient {
    sender: mpsc::Sender<JournalRequest>,
}

impl JournalClient {
    pub fn new(sender: mpsc::Sender<JournalRequest>) -> Self {
        Self { sender }
    }

    /// Appends one entry; the date stamp is added by the journal.
    pub async fn record(&self, entry: impl Into<String>) -> Result<(), JournalError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(JournalRequest::Record {
                entry: entry.into(),
                respond_to,
            })
            .await
            .map_err(|_| JournalError::ActorClosed)?;
        response.await.map_err(|_| JournalError::ActorDropped)?
    }

    pub async fn entries(&self) -> Result<Vec<String>, JournalError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(JournalRequest::Entries { respond_to })
            .await
            .map_err(|_| JournalError::ActorClosed)?;
        response.await.map_err(|_| JournalError::ActorDropped)?
    }

    pub async fn clear(&self) -> Result<(), JournalError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(JournalRequest::Clear { respond_to })
            .await
            .map_err(|_| JournalError::ActorClosed)?;
        response.await.map_err(|_| JournalError::ActorDropped)?
    }
}
