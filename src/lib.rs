//! # Library Catalog
//!
//! > **A concurrent catalog of loanable items.**
//!
//! This crate is the core of a small library system: a shared collection of
//! books that many readers can list, sort and search at the same time, while
//! borrowers race each other to take the same copy.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Two lock scopes, never nested
//!
//! - **Catalog scope**: one read-write lock guards the item sequence and the
//!   identifier index as a unit. Readers share it; a writer (`add`, `add_all`,
//!   `remove`) has it alone.
//! - **Item scope**: every item has its own mutex around its availability flag
//!   and usage counter. Borrow and return take only this lock.
//!
//! No code path takes one scope while holding the other, so there is no lock
//! ordering to get wrong and no way to deadlock between them.
//!
//! ### Outcomes, not errors
//!
//! Finding a book on loan is a normal part of running a library. A borrow
//! attempt reports [`BorrowOutcome::Unavailable`](model::BorrowOutcome) instead of
//! failing; a lookup miss is an empty `Option`. Errors are reserved for the
//! collaborators that do I/O (the journal and the store), and those never
//! corrupt the in-memory catalog.
//!
//! ### No global state
//!
//! The [`Catalog`](catalog::Catalog) is an ordinary value. Whoever needs it gets
//! an `Arc` to it, typically through [`LibrarySystem`](runtime::LibrarySystem).
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Core ([`model`], [`catalog`])
//! - **Role**: Items, actors and the concurrent collection.
//! - **Key items**: [`Item`](model::Item), [`Actor`](model::Actor), [`Catalog`](catalog::Catalog).
//!
//! ### 2. The Race ([`coordinator`])
//! - **Role**: Runs many borrowers against one item on a bounded pool of tasks and joins them all.
//! - **Key items**: [`BorrowCoordinator`](coordinator::BorrowCoordinator), [`RaceReport`](coordinator::RaceReport).
//!
//! ### 3. The Collaborators ([`journal`], [`store`])
//! - **Role**: Transaction log (an actor task) and catalog persistence (an async trait).
//! - **Key items**: [`JournalClient`](journal::JournalClient), [`CatalogStore`](store::CatalogStore).
//!
//! ### 4. The Orchestrator ([`runtime`])
//! - **Role**: Configuration, tracing and the [`LibrarySystem`](runtime::LibrarySystem) that wires everything together.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo with info logs
//! RUST_LOG=info cargo run
//!
//! # Run the tests
//! cargo test
//! ```

pub mod catalog;
pub mod coordinator;
pub mod error;
pub mod journal;
pub mod model;
pub mod runtime;
pub mod store;

pub use error::LibraryError;
