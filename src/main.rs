//! Demo entry point.
//!
//! Loads the saved catalog (seeding it on first run), lets three students race
//! for the same popular book, records the result in the journal and saves.

use chrono::NaiveDate;
use library_catalog::catalog::order;
use library_catalog::coordinator::BorrowAttempt;
use library_catalog::model::{Actor, Item};
use library_catalog::runtime::{setup_tracing, LibraryConfig, LibrarySystem};
use library_catalog::LibraryError;
use std::time::Duration;
use tracing::{info, Instrument};

const POPULAR_IDENTIFIER: &str = "978-0321349606";

fn seed_items() -> Vec<Item> {
    let dated = |y, m, d| NaiveDate::from_ymd_opt(y, m, d);
    let mut items = vec![
        Item::new("Harry Potter", "J.K. Rowling"),
        Item::new("Clean Code", "Robert C. Martin"),
    ];
    for (title, author, identifier, published) in [
        ("Effective Java", "Joshua Bloch", "978-0134685991", dated(2017, 12, 27)),
        ("Design Patterns", "Gang of Four", "978-0201633610", dated(1994, 10, 31)),
        ("The Pragmatic Programmer", "Andrew Hunt", "978-0135957059", dated(2019, 9, 13)),
        ("Java Concurrency in Practice", "Brian Goetz", POPULAR_IDENTIFIER, dated(2006, 5, 9)),
    ] {
        let item = Item::new(title, author).with_identifier(identifier);
        items.push(match published {
            Some(date) => item.with_published(date),
            None => item,
        });
    }
    items
}

#[tokio::main]
async fn main() -> Result<(), LibraryError> {
    let config = LibraryConfig::load()?;
    setup_tracing(&config.logging.level);

    info!("Starting library");
    let system = LibrarySystem::new(&config);
    let staff = Actor::administrator(9999, "System");

    if system.load().await? == 0 {
        system.add_items(&staff, seed_items()).await?;
    }
    info!(size = system.catalog().size(), "Catalog ready");

    // Make sure the contended book is on the shelf before the race.
    if let Some(popular) = system.catalog().find_by_identifier(POPULAR_IDENTIFIER) {
        system.return_by_title(&staff, popular.title()).await?;
    }

    let attempts = vec![
        BorrowAttempt::new(Actor::borrower(301, "John", "CS"), Duration::from_millis(100)),
        BorrowAttempt::new(Actor::borrower(302, "Jane", "IT"), Duration::from_millis(50)),
        BorrowAttempt::new(Actor::borrower(303, "Jack", "CS"), Duration::from_millis(150)),
    ];
    let span = tracing::info_span!("concurrent_borrowing");
    let report = async {
        info!("Starting concurrent borrow attempts");
        system.race(POPULAR_IDENTIFIER, attempts).await
    }
    .instrument(span)
    .await?;

    for attempt in &report.attempts {
        info!(actor = attempt.actor.name(), delay = ?attempt.delay, outcome = ?attempt.outcome, "Attempt");
    }
    info!(
        successes = report.successes(),
        usage = report.final_state.usage,
        available = report.final_state.available,
        "Final book status"
    );

    for item in system.catalog().sorted(order::by_usage).iter().take(3) {
        info!(title = item.title(), usage = item.usage(), "Most borrowed");
    }

    let java = system.catalog().search_title("java");
    info!(matches = java.len(), "Titles containing 'java'");

    let saved = system.save().await?;
    info!(saved, "Catalog saved");

    system.shutdown().await?;
    info!("Application completed successfully");
    Ok(())
}
