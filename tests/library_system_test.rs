use async_trait::async_trait;
use library_catalog::catalog::Catalog;
use library_catalog::coordinator::BorrowAttempt;
use library_catalog::journal::{JournalError, JournalSink, MemorySink};
use library_catalog::model::{Actor, BorrowOutcome, Item, LoanState, ReturnOutcome};
use library_catalog::runtime::{LibraryConfig, LibrarySystem};
use library_catalog::store::{CatalogStore, JsonFileStore, MemoryStore};
use library_catalog::LibraryError;
use std::sync::Arc;
use std::time::Duration;

fn staff() -> Actor {
    Actor::administrator(201, "Bob")
}

fn alice() -> Actor {
    Actor::borrower(101, "Alice", "Computer Science")
}

fn system_with(store: Arc<MemoryStore>, sink: MemorySink) -> LibrarySystem {
    LibrarySystem::with_parts(&LibraryConfig::default(), Arc::new(Catalog::new()), store, sink)
}

/// A sink that always fails, to check the journal is best-effort.
struct BrokenSink;

#[async_trait]
impl JournalSink for BrokenSink {
    async fn append(&mut self, _line: &str) -> Result<(), JournalError> {
        Err(JournalError::Sink("disk full".into()))
    }

    async fn read_all(&mut self) -> Result<Vec<String>, JournalError> {
        Err(JournalError::Sink("disk full".into()))
    }

    async fn clear(&mut self) -> Result<(), JournalError> {
        Err(JournalError::Sink("disk full".into()))
    }
}

#[tokio::test]
async fn borrow_and_return_by_title_are_journaled_and_saved() {
    let store = Arc::new(MemoryStore::new());
    let sink = MemorySink::new();
    let system = system_with(store.clone(), sink.clone());

    system
        .add_item(&staff(), Item::new("Clean Code", "Robert C. Martin"))
        .await
        .unwrap();

    let outcome = system.borrow_by_title(&alice(), "clean code").await.unwrap();
    assert_eq!(outcome, BorrowOutcome::Borrowed { usage: 1 });

    let again = system.borrow_by_title(&alice(), "Clean Code").await.unwrap();
    assert_eq!(again, BorrowOutcome::Unavailable);

    let returned = system.return_by_title(&alice(), "CLEAN CODE").await.unwrap();
    assert_eq!(returned, ReturnOutcome::Returned);
    let no_op = system.return_by_title(&alice(), "Clean Code").await.unwrap();
    assert_eq!(no_op, ReturnOutcome::AlreadyAvailable);

    let entries = system.journal().entries().await.unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries[0].ends_with("Staff Bob added new book 'Clean Code'"));
    assert!(entries[1].ends_with("Student Alice borrowed: Clean Code"));
    assert!(entries[2].ends_with("Book returned: Clean Code"));
    assert_eq!(sink.lines(), entries);

    // One autosave per successful mutation: add, borrow, return.
    assert_eq!(store.saves(), 3);
    assert!(store.records()[0].available);
    assert_eq!(store.records()[0].usage, 1);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn borrow_picks_an_available_copy() {
    let system = system_with(Arc::new(MemoryStore::new()), MemorySink::new());
    let copies = system
        .add_items(
            &staff(),
            vec![Item::new("Dune", "Frank Herbert"), Item::new("Dune", "Frank Herbert")],
        )
        .await
        .unwrap();

    assert!(system.borrow_by_title(&alice(), "Dune").await.unwrap().is_borrowed());
    assert!(system.borrow_by_title(&alice(), "Dune").await.unwrap().is_borrowed());
    assert_eq!(
        system.borrow_by_title(&alice(), "Dune").await.unwrap(),
        BorrowOutcome::Unavailable
    );
    assert!(copies.iter().all(|copy| copy.loan_state() == LoanState { available: false, usage: 1 }));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn unknown_titles_and_wrong_roles_are_errors() {
    let system = system_with(Arc::new(MemoryStore::new()), MemorySink::new());

    let missing = system.borrow_by_title(&alice(), "Nope").await.unwrap_err();
    assert!(matches!(missing, LibraryError::NotFound(title) if title == "Nope"));
    assert!(matches!(
        system.return_by_title(&alice(), "Nope").await.unwrap_err(),
        LibraryError::NotFound(_)
    ));

    let denied = system
        .add_item(&alice(), Item::new("Clean Code", "Robert C. Martin"))
        .await
        .unwrap_err();
    assert!(matches!(denied, LibraryError::NotPermitted { .. }));
    assert!(system.catalog().is_empty());

    system
        .add_item(&staff(), Item::new("Clean Code", "Robert C. Martin"))
        .await
        .unwrap();
    assert!(matches!(
        system.borrow_by_title(&staff(), "Clean Code").await.unwrap_err(),
        LibraryError::NotPermitted { .. }
    ));
    assert!(matches!(
        system.withdraw(&alice(), "anything").await.unwrap_err(),
        LibraryError::NotPermitted { .. }
    ));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn administrator_restocks_and_withdraws() {
    let system = system_with(Arc::new(MemoryStore::new()), MemorySink::new());
    system
        .add_item(&staff(), Item::new("Effective Java", "Joshua Bloch").with_identifier("978-0134685991"))
        .await
        .unwrap();
    system.borrow_by_title(&alice(), "Effective Java").await.unwrap();

    let restocked = system.return_by_title(&staff(), "Effective Java").await.unwrap();
    assert_eq!(restocked, ReturnOutcome::Returned);

    let removed = system.withdraw(&staff(), "978-0134685991").await.unwrap();
    assert_eq!(removed.title(), "Effective Java");
    assert!(system.catalog().find_by_identifier("978-0134685991").is_none());
    assert!(matches!(
        system.withdraw(&staff(), "978-0134685991").await.unwrap_err(),
        LibraryError::NotFound(_)
    ));

    let entries = system.journal().entries().await.unwrap();
    assert!(entries
        .last()
        .unwrap()
        .ends_with("Staff Bob removed book from library: Effective Java"));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn journal_failure_does_not_fail_a_borrow() {
    let catalog = Arc::new(Catalog::new());
    let system = LibrarySystem::with_parts(
        &LibraryConfig::default(),
        catalog.clone(),
        Arc::new(MemoryStore::new()),
        BrokenSink,
    );
    catalog.add(Item::new("Clean Code", "Robert C. Martin"));

    let outcome = system.borrow_by_title(&alice(), "Clean Code").await.unwrap();
    assert!(outcome.is_borrowed());
    assert!(matches!(
        system.journal().entries().await.unwrap_err(),
        JournalError::Sink(_)
    ));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn store_failure_is_reported_and_leaves_catalog_intact() {
    let store = Arc::new(MemoryStore::new());
    let system = system_with(store.clone(), MemorySink::new());
    system
        .add_item(&staff(), Item::new("Clean Code", "Robert C. Martin"))
        .await
        .unwrap();
    assert_eq!(store.saves(), 1);

    store.set_failing(true);

    // Autosave failure is logged; the borrow itself still happens.
    let outcome = system.borrow_by_title(&alice(), "Clean Code").await.unwrap();
    assert!(outcome.is_borrowed());

    assert!(matches!(system.save().await.unwrap_err(), LibraryError::Store(_)));
    assert!(matches!(system.load().await.unwrap_err(), LibraryError::Store(_)));

    let item = system.catalog().find_by_title("Clean Code", Default::default()).unwrap();
    assert_eq!(item.loan_state(), LoanState { available: false, usage: 1 });
    assert_eq!(system.catalog().size(), 1);

    store.set_failing(false);
    assert_eq!(system.save().await.unwrap(), 1);
    assert!(!store.records()[0].available);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn catalog_survives_a_save_and_reload_through_a_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library_books.json");
    let mut config = LibraryConfig::default();
    config.data.catalog_path = path.clone();
    config.data.journal_path = dir.path().join("library_transactions.txt");
    config.data.autosave = false;

    let first = LibrarySystem::new(&config);
    assert_eq!(first.load().await.unwrap(), 0);
    first
        .add_items(
            &staff(),
            vec![
                Item::new("Effective Java", "Joshua Bloch").with_identifier("978-0134685991"),
                Item::new("Head First Java", "Kathy Sierra"),
            ],
        )
        .await
        .unwrap();
    first.borrow_by_title(&alice(), "Effective Java").await.unwrap();
    assert_eq!(first.save().await.unwrap(), 2);
    first.shutdown().await.unwrap();

    let second = LibrarySystem::new(&config);
    assert_eq!(second.load().await.unwrap(), 2);
    let restored = second.catalog().find_by_identifier("978-0134685991").unwrap();
    assert_eq!(restored.loan_state(), LoanState { available: false, usage: 1 });
    assert_eq!(second.catalog().all_items()[1].title(), "Head First Java");

    let journal = second.journal().entries().await.unwrap();
    assert_eq!(journal.len(), 2);
    second.shutdown().await.unwrap();

    assert_eq!(JsonFileStore::new(&path).load().await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn race_through_the_system_journals_the_single_winner() {
    let sink = MemorySink::new();
    let store = Arc::new(MemoryStore::new());
    let system = system_with(store.clone(), sink.clone());
    system
        .add_item(
            &staff(),
            Item::new("Java Concurrency in Practice", "Brian Goetz").with_identifier("978-0321349606"),
        )
        .await
        .unwrap();

    let attempts = vec![
        BorrowAttempt::new(Actor::borrower(301, "John", "CS"), Duration::from_millis(100)),
        BorrowAttempt::new(Actor::borrower(302, "Jane", "IT"), Duration::from_millis(50)),
        BorrowAttempt::new(Actor::borrower(303, "Jack", "CS"), Duration::from_millis(150)),
    ];
    let report = system.race("978-0321349606", attempts).await.unwrap();
    assert_eq!(report.successes(), 1);
    assert_eq!(report.final_state, LoanState { available: false, usage: 1 });

    let borrowed: Vec<String> = sink
        .lines()
        .into_iter()
        .filter(|line| line.contains("borrowed"))
        .collect();
    assert_eq!(borrowed.len(), 1);
    assert_eq!(store.saves(), 2);

    assert!(matches!(
        system.race("missing", Vec::new()).await.unwrap_err(),
        LibraryError::NotFound(_)
    ));
    assert!(matches!(
        system.race("978-0321349606", Vec::new()).await.unwrap_err(),
        LibraryError::Coordinator(_)
    ));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn withdraw_by_title_removes_items_without_identifier() {
    let sink = MemorySink::new();
    let system = system_with(Arc::new(MemoryStore::new()), sink.clone());
    system
        .add_items(
            &staff(),
            vec![Item::new("Harry Potter", "J.K. Rowling"), Item::new("Clean Code", "Robert C. Martin")],
        )
        .await
        .unwrap();

    let removed = system.withdraw_by_title(&staff(), "harry potter").await.unwrap();
    assert_eq!(removed.title(), "Harry Potter");
    assert_eq!(removed.identifier(), None);
    assert_eq!(system.catalog().size(), 1);
    assert!(system.catalog().search_title("potter").is_empty());

    assert!(matches!(
        system.withdraw_by_title(&staff(), "Harry Potter").await.unwrap_err(),
        LibraryError::NotFound(_)
    ));
    assert!(matches!(
        system.withdraw_by_title(&alice(), "Clean Code").await.unwrap_err(),
        LibraryError::NotPermitted { .. }
    ));
    assert!(sink
        .lines()
        .last()
        .unwrap()
        .ends_with("Staff Bob removed book from library: Harry Potter"));

    system.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_autosaves_leave_the_file_matching_memory() {
    const TITLES: u32 = 64;
    let dir = tempfile::tempdir().unwrap();
    let mut config = LibraryConfig::default();
    config.data.catalog_path = dir.path().join("library_books.json");
    config.data.journal_path = dir.path().join("library_transactions.txt");

    let system = Arc::new(LibrarySystem::new(&config));
    system
        .add_items(
            &staff(),
            (0..TITLES).map(|n| Item::new(format!("Title {n}"), "Someone")).collect(),
        )
        .await
        .unwrap();

    let mut borrows = tokio::task::JoinSet::new();
    for n in 0..TITLES {
        let system = Arc::clone(&system);
        borrows.spawn(async move {
            let student = Actor::borrower(n, format!("Student {n}"), "CS");
            system.borrow_by_title(&student, &format!("Title {n}")).await
        });
    }
    while let Some(joined) = borrows.join_next().await {
        assert!(joined.unwrap().unwrap().is_borrowed());
    }

    let saved = JsonFileStore::new(&config.data.catalog_path).load().await.unwrap();
    assert_eq!(saved, system.catalog().records());
    assert!(saved.iter().all(|record| !record.available && record.usage == 1));
    // Only the catalog and the journal remain; no staging files are left behind.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);

    let system = Arc::try_unwrap(system).unwrap_or_else(|_| panic!("system still shared"));
    system.shutdown().await.unwrap();
}
