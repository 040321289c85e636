use crate::catalog::{Availability, Catalog};
use crate::coordinator::{BorrowAttempt, BorrowCoordinator, RaceReport};
use crate::error::LibraryError;
use crate::journal::{FileSink, JournalActor, JournalClient, JournalSink};
use crate::model::{Actor, Administrator, BorrowOutcome, Borrower, Item, ReturnOutcome, SharedItem};
use crate::runtime::LibraryConfig;
use crate::store::{CatalogStore, JsonFileStore};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

/// The runtime orchestrator for the library.
///
/// `LibrarySystem` owns one explicitly constructed [`Catalog`] and wires it to
/// its collaborators:
/// - **Journal**: a [`JournalActor`] task recording every transaction, best-effort
/// - **Store**: a [`CatalogStore`] used for explicit saves, loads and autosave
/// - **Coordinator**: a [`BorrowCoordinator`] for contended-borrow races
///
/// Catalog and item locks are only ever held inside the synchronous catalog
/// and item calls; every journal write and store call happens after they are
/// released.
///
/// # Example
///
/// ```ignore
/// let system = LibrarySystem::new(&LibraryConfig::load()?);
/// system.load().await?;
///
/// let alice = Actor::borrower(101, "Alice", "Computer Science");
/// let outcome = system.borrow_by_title(&alice, "Clean Code").await?;
///
/// system.shutdown().await?;
/// ```
pub struct LibrarySystem {
    catalog: Arc<Catalog>,
    journal: JournalClient,
    store: Arc<dyn CatalogStore>,
    coordinator: BorrowCoordinator,
    autosave: bool,

    /// Serializes snapshot-then-save so saves land in snapshot order.
    save_lock: Mutex<()>,

    /// Task handles for background actors (used for graceful shutdown)
    handles: Vec<JoinHandle<()>>,
}

impl LibrarySystem {
    /// Creates a system with an empty catalog, a JSON file store and a file journal
    /// at the paths named in `config`. Must be called inside a Tokio runtime.
    pub fn new(config: &LibraryConfig) -> Self {
        Self::with_parts(
            config,
            Arc::new(Catalog::new()),
            Arc::new(JsonFileStore::new(&config.data.catalog_path)),
            FileSink::new(&config.data.journal_path),
        )
    }

    /// Creates a system from explicit parts. Must be called inside a Tokio runtime.
    pub fn with_parts<S: JournalSink>(
        config: &LibraryConfig,
        catalog: Arc<Catalog>,
        store: Arc<dyn CatalogStore>,
        sink: S,
    ) -> Self {
        let (journal_actor, journal) = JournalActor::new(config.journal.buffer_size, sink);
        let journal_handle = tokio::spawn(journal_actor.run());

        Self {
            catalog,
            journal,
            store,
            coordinator: BorrowCoordinator::new(config.coordinator.max_in_flight),
            autosave: config.data.autosave,
            save_lock: Mutex::new(()),
            handles: vec![journal_handle],
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn journal(&self) -> &JournalClient {
        &self.journal
    }

    pub fn coordinator(&self) -> &BorrowCoordinator {
        &self.coordinator
    }

    /// Replaces the catalog contents with what the store holds.
    ///
    /// On failure the catalog is left exactly as it was.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<usize, LibraryError> {
        let records = self.store.load().await?;
        let size = self.catalog.replace_all(records.into_iter().map(Item::from_record));
        info!(size, "Catalog loaded");
        Ok(size)
    }

    /// Saves a snapshot of the catalog. Returns the number of items saved.
    ///
    /// Concurrent saves run one at a time, and each takes its snapshot only
    /// once it is its turn, so a later save never writes an older catalog.
    #[instrument(skip(self))]
    pub async fn save(&self) -> Result<usize, LibraryError> {
        let _turn = self.save_lock.lock().await;
        let records = self.catalog.records();
        self.store.save(&records).await?;
        Ok(records.len())
    }

    #[instrument(skip(self, item), fields(actor = actor.name(), title = item.title()))]
    pub async fn add_item(&self, actor: &Actor, item: Item) -> Result<SharedItem, LibraryError> {
        let admin = require_administrator(actor, "add items")?;
        let item = self.catalog.add(item);
        self.note(format!("Staff {} added new book '{}'", admin.actor().name(), item.title()))
            .await;
        self.autosave().await;
        Ok(item)
    }

    /// Adds a batch that concurrent readers see all at once or not at all.
    #[instrument(skip(self, items), fields(actor = actor.name()))]
    pub async fn add_items(
        &self,
        actor: &Actor,
        items: Vec<Item>,
    ) -> Result<Vec<SharedItem>, LibraryError> {
        let admin = require_administrator(actor, "add items")?;
        let added = self.catalog.add_all(items);
        self.note(format!("Staff {} added {} books", admin.actor().name(), added.len()))
            .await;
        self.autosave().await;
        Ok(added)
    }

    /// Borrows the first available item with this title.
    ///
    /// Returns [`BorrowOutcome::Unavailable`] when every copy is on loan (or the
    /// last available copy was taken by someone else in the meantime), and
    /// [`LibraryError::NotFound`] when no item has this title at all.
    #[instrument(skip(self), fields(actor = actor.name()))]
    pub async fn borrow_by_title(
        &self,
        actor: &Actor,
        title: &str,
    ) -> Result<BorrowOutcome, LibraryError> {
        let borrower = require_borrower(actor)?;
        let Some(item) = self.catalog.find_by_title(title, Availability::Available) else {
            return self
                .catalog
                .find_by_title(title, Availability::Any)
                .map(|_| BorrowOutcome::Unavailable)
                .ok_or_else(|| LibraryError::NotFound(title.to_owned()));
        };

        let outcome = borrower.borrow(&item);
        if outcome.is_borrowed() {
            self.note(format!("Student {} borrowed: {}", actor.name(), item.title()))
                .await;
            self.autosave().await;
        }
        Ok(outcome)
    }

    /// Returns the first on-loan item with this title.
    ///
    /// Borrowers and administrators may both return items; no ownership check
    /// is made. Returns [`ReturnOutcome::AlreadyAvailable`] when every copy is
    /// already on the shelf.
    #[instrument(skip(self), fields(actor = actor.name()))]
    pub async fn return_by_title(
        &self,
        actor: &Actor,
        title: &str,
    ) -> Result<ReturnOutcome, LibraryError> {
        let Some(item) = self.catalog.find_by_title(title, Availability::OnLoan) else {
            return self
                .catalog
                .find_by_title(title, Availability::Any)
                .map(|_| ReturnOutcome::AlreadyAvailable)
                .ok_or_else(|| LibraryError::NotFound(title.to_owned()));
        };

        let outcome = match (actor.as_borrower(), actor.as_administrator()) {
            (Some(borrower), _) => borrower.return_item(&item),
            (None, Some(admin)) => admin.restock(&item),
            (None, None) => {
                return Err(LibraryError::NotPermitted {
                    actor: actor.name().to_owned(),
                    operation: "return items",
                })
            }
        };
        if outcome == ReturnOutcome::Returned {
            self.note(format!("Book returned: {}", item.title())).await;
            self.autosave().await;
        }
        Ok(outcome)
    }

    /// Removes the item with this identifier from the catalog.
    #[instrument(skip(self), fields(actor = actor.name()))]
    pub async fn withdraw(&self, actor: &Actor, identifier: &str) -> Result<SharedItem, LibraryError> {
        let admin = require_administrator(actor, "withdraw items")?;
        let item = admin
            .withdraw(&self.catalog, identifier)
            .ok_or_else(|| LibraryError::NotFound(identifier.to_owned()))?;
        self.withdrawn(&admin, &item).await;
        Ok(item)
    }

    /// Removes the first item, in insertion order, whose title matches ignoring case.
    ///
    /// Works for items without an identifier.
    #[instrument(skip(self), fields(actor = actor.name()))]
    pub async fn withdraw_by_title(&self, actor: &Actor, title: &str) -> Result<SharedItem, LibraryError> {
        let admin = require_administrator(actor, "withdraw items")?;
        let not_found = || LibraryError::NotFound(title.to_owned());
        let item = self
            .catalog
            .find_by_title(title, Availability::Any)
            .ok_or_else(not_found)?;
        // Someone else may have removed it since the lookup.
        if !admin.withdraw_item(&self.catalog, &item) {
            return Err(not_found());
        }
        self.withdrawn(&admin, &item).await;
        Ok(item)
    }

    /// Races `attempts` for the item with this identifier and journals the winner.
    #[instrument(skip(self, attempts), fields(attempts = attempts.len()))]
    pub async fn race(
        &self,
        identifier: &str,
        attempts: Vec<BorrowAttempt>,
    ) -> Result<RaceReport, LibraryError> {
        let item = self
            .catalog
            .find_by_identifier(identifier)
            .ok_or_else(|| LibraryError::NotFound(identifier.to_owned()))?;

        let report = self.coordinator.race(Arc::clone(&item), attempts).await?;
        for attempt in report.attempts.iter().filter(|a| a.outcome.is_borrowed()) {
            self.note(format!("Student {} borrowed: {}", attempt.actor.name(), item.title()))
                .await;
        }
        if report.successes() > 0 {
            self.autosave().await;
        }
        Ok(report)
    }

    /// Gracefully shuts down the system.
    ///
    /// Dropping the system's journal client closes the journal channel; the
    /// journal task drains what is queued and exits. Any clone of the client
    /// obtained through [`journal`](Self::journal) must be dropped first.
    pub async fn shutdown(self) -> Result<(), LibraryError> {
        info!("Shutting down library...");
        let Self {
            journal, handles, ..
        } = self;
        drop(journal);

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Background task failed: {:?}", e);
                return Err(LibraryError::TaskFailed(e.to_string()));
            }
        }

        info!("Library shutdown complete.");
        Ok(())
    }

    async fn withdrawn(&self, admin: &Administrator<'_>, item: &Item) {
        self.note(format!(
            "Staff {} removed book from library: {}",
            admin.actor().name(),
            item.title()
        ))
        .await;
        self.autosave().await;
    }

    /// Records a journal entry. Failures are logged and otherwise ignored.
    async fn note(&self, entry: String) {
        if let Err(e) = self.journal.record(entry).await {
            warn!(error = %e, "Journal entry dropped");
        }
    }

    async fn autosave(&self) {
        if !self.autosave {
            return;
        }
        if let Err(e) = self.save().await {
            warn!(error = %e, "Autosave failed; in-memory catalog is unchanged");
        }
    }
}

fn require_borrower(actor: &Actor) -> Result<Borrower<'_>, LibraryError> {
    actor.as_borrower().ok_or_else(|| LibraryError::NotPermitted {
        actor: actor.name().to_owned(),
        operation: "borrow items",
    })
}

fn require_administrator<'a>(
    actor: &'a Actor,
    operation: &'static str,
) -> Result<Administrator<'a>, LibraryError> {
    actor.as_administrator().ok_or_else(|| LibraryError::NotPermitted {
        actor: actor.name().to_owned(),
        operation,
    })
}
