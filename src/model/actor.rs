//! People who interact with the catalog.
//!
//! An [`Actor`] has a [`ActorRole`]; the operations each role may perform are
//! exposed through role-gated capability views. A borrower can only borrow and
//! return, an administrator can only restock and withdraw:
//!
//! ```rust
//! use library_catalog::model::{Actor, BorrowOutcome, Item};
//!
//! let alice = Actor::borrower(101, "Alice", "Computer Science");
//! let item = Item::new("Clean Code", "Robert C. Martin");
//!
//! let borrower = alice.as_borrower().unwrap();
//! assert!(matches!(borrower.borrow(&item), BorrowOutcome::Borrowed { usage: 1 }));
//! assert_eq!(borrower.borrow(&item), BorrowOutcome::Unavailable);
//! assert!(alice.as_administrator().is_none());
//! ```
//!
//! Nothing records which actor holds which item: a loan lives entirely on the
//! item, and any borrower may return any item.

use crate::catalog::Catalog;
use crate::model::item::{Item, SharedItem};
use std::fmt;
use tracing::{debug, info};

/// Role-specific part of an actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorRole {
    Borrower { department: String },
    Administrator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    id: u32,
    name: String,
    role: ActorRole,
}

impl Actor {
    pub fn borrower(id: u32, name: impl Into<String>, department: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            role: ActorRole::Borrower {
                department: department.into(),
            },
        }
    }

    pub fn administrator(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            role: ActorRole::Administrator,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> &ActorRole {
        &self.role
    }

    pub fn as_borrower(&self) -> Option<Borrower<'_>> {
        match self.role {
            ActorRole::Borrower { .. } => Some(Borrower { actor: self }),
            ActorRole::Administrator => None,
        }
    }

    pub fn as_administrator(&self) -> Option<Administrator<'_>> {
        match self.role {
            ActorRole::Administrator => Some(Administrator { actor: self }),
            ActorRole::Borrower { .. } => None,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.role {
            ActorRole::Borrower { department } => {
                write!(f, "Student {} (#{}, {})", self.name, self.id, department)
            }
            ActorRole::Administrator => write!(f, "Staff {} (#{})", self.name, self.id),
        }
    }
}

/// Result of a borrow attempt. Unavailability is an outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowOutcome {
    /// The item went from available to on loan; `usage` is its new usage count.
    Borrowed { usage: u32 },
    /// The item was already on loan. Nothing changed.
    Unavailable,
}

impl BorrowOutcome {
    pub fn is_borrowed(&self) -> bool {
        matches!(self, Self::Borrowed { .. })
    }
}

/// Result of a return. Returning an available item is an accepted no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnOutcome {
    Returned,
    AlreadyAvailable,
}

/// Borrow/return capability of an actor with the borrower role.
#[derive(Debug, Clone, Copy)]
pub struct Borrower<'a> {
    actor: &'a Actor,
}

impl Borrower<'_> {
    pub fn actor(&self) -> &Actor {
        self.actor
    }

    /// Attempts to take the item on loan.
    ///
    /// The availability check and the transition run inside one item-lock
    /// critical section; the catalog lock is never touched.
    pub fn borrow(&self, item: &Item) -> BorrowOutcome {
        match item.try_borrow() {
            Some(usage) => {
                info!(actor = self.actor.name(), title = item.title(), usage, "Borrowed");
                BorrowOutcome::Borrowed { usage }
            }
            None => {
                debug!(actor = self.actor.name(), title = item.title(), "Currently unavailable");
                BorrowOutcome::Unavailable
            }
        }
    }

    /// Gives the item back. No ownership check is made.
    pub fn return_item(&self, item: &Item) -> ReturnOutcome {
        let outcome = release(item);
        info!(actor = self.actor.name(), title = item.title(), ?outcome, "Return");
        outcome
    }
}

/// Catalog management capability of an actor with the administrator role.
#[derive(Debug, Clone, Copy)]
pub struct Administrator<'a> {
    actor: &'a Actor,
}

impl Administrator<'_> {
    pub fn actor(&self) -> &Actor {
        self.actor
    }

    /// Puts the item back on the shelf regardless of who borrowed it.
    pub fn restock(&self, item: &Item) -> ReturnOutcome {
        let outcome = release(item);
        info!(actor = self.actor.name(), title = item.title(), ?outcome, "Restocked");
        outcome
    }

    /// Removes the item with this identifier from the catalog.
    pub fn withdraw(&self, catalog: &Catalog, identifier: &str) -> Option<SharedItem> {
        let removed = catalog.remove(identifier);
        match &removed {
            Some(item) => info!(actor = self.actor.name(), identifier, title = item.title(), "Withdrawn"),
            None => debug!(actor = self.actor.name(), identifier, "Nothing to withdraw"),
        }
        removed
    }

    /// Removes this exact item from the catalog. Returns whether it was present.
    pub fn withdraw_item(&self, catalog: &Catalog, item: &SharedItem) -> bool {
        let removed = catalog.remove_item(item);
        if removed {
            info!(actor = self.actor.name(), title = item.title(), "Withdrawn");
        }
        removed
    }
}

fn release(item: &Item) -> ReturnOutcome {
    if item.release() {
        ReturnOutcome::Returned
    } else {
        ReturnOutcome::AlreadyAvailable
    }
}
