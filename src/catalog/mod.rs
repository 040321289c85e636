//! # Concurrent Catalog
//!
//! The [`Catalog`] owns every [`Item`] in the library. It keeps two structures
//! that must never disagree:
//!
//! - the **sequence** of items in insertion order (what listings show), and
//! - the **index** from identifier to item (what lookups use).
//!
//! Both live behind one [`RwLock`], so a writer updates them together and a
//! reader sees either all of a write or none of it. Readers run in parallel;
//! a writer excludes everybody else for the length of its critical section.
//!
//! ## Lock scopes
//!
//! Each item carries its own lock for its loan state (see [`crate::model::item`]).
//! The two scopes are never nested: catalog operations that look at loan state
//! (`available_items`, `sorted`, `records`, ...) first copy the item handles
//! under the read guard, drop it, and only then consult the items.
//!
//! ```rust
//! use library_catalog::catalog::{order, Catalog};
//! use library_catalog::model::Item;
//!
//! let catalog = Catalog::new();
//! catalog.add(Item::new("Effective Java", "Joshua Bloch").with_identifier("978-0134685991"));
//! catalog.add(Item::new("Clean Code", "Robert C. Martin"));
//!
//! assert_eq!(catalog.size(), 2);
//! assert!(catalog.find_by_identifier("978-0134685991").is_some());
//!
//! let by_title = catalog.sorted(order::by_title);
//! assert_eq!(by_title[0].title(), "Clean Code");
//! ```

pub mod filter;
pub mod order;

use crate::model::{Item, ItemRecord, LoanState, SharedItem};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Availability restriction for title lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    #[default]
    Any,
    Available,
    OnLoan,
}

impl Availability {
    fn admits(self, item: &Item) -> bool {
        match self {
            Self::Any => true,
            Self::Available => item.is_available(),
            Self::OnLoan => !item.is_available(),
        }
    }
}

/// A frozen view of an item handed to sort comparators.
///
/// The loan state is captured once before sorting starts, so a concurrent
/// borrow cannot make a comparator inconsistent halfway through a sort.
#[derive(Debug, Clone, Copy)]
pub struct ItemView<'a> {
    pub item: &'a Item,
    pub loan: LoanState,
}

impl ItemView<'_> {
    pub fn title(&self) -> &str {
        self.item.title()
    }

    pub fn author(&self) -> &str {
        self.item.author()
    }

    pub fn published(&self) -> Option<chrono::NaiveDate> {
        self.item.published()
    }

    pub fn usage(&self) -> u32 {
        self.loan.usage
    }

    pub fn is_available(&self) -> bool {
        self.loan.available
    }
}

/// Sequence and index, always mutated together under the catalog write lock.
#[derive(Debug, Default)]
struct Shelves {
    items: Vec<SharedItem>,
    by_identifier: HashMap<String, SharedItem>,
}

impl Shelves {
    fn insert(&mut self, item: SharedItem) {
        if let Some(identifier) = item.identifier() {
            // Last write wins on duplicate identifiers.
            self.by_identifier.insert(identifier.to_owned(), Arc::clone(&item));
        }
        self.items.push(item);
    }

    fn detach(&mut self, position: usize) -> SharedItem {
        let item = self.items.remove(position);
        if let Some(identifier) = item.identifier() {
            let indexed_here = self
                .by_identifier
                .get(identifier)
                .is_some_and(|indexed| Arc::ptr_eq(indexed, &item));
            if indexed_here {
                // Fall back to the most recent remaining item with the same identifier.
                match self.items.iter().rev().find(|other| other.identifier() == Some(identifier)) {
                    Some(other) => {
                        self.by_identifier.insert(identifier.to_owned(), Arc::clone(other));
                    }
                    None => {
                        self.by_identifier.remove(identifier);
                    }
                }
            }
        }
        item
    }
}

/// The shared, concurrently accessible collection of items.
#[derive(Debug, Default)]
pub struct Catalog {
    shelves: RwLock<Shelves>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from persisted records, preserving their order.
    pub fn from_records(records: impl IntoIterator<Item = ItemRecord>) -> Self {
        let catalog = Self::new();
        catalog.add_all(records.into_iter().map(Item::from_record));
        catalog
    }

    /// Adds one item and returns the shared handle the catalog now owns.
    pub fn add(&self, item: Item) -> SharedItem {
        let item = item.into_shared();
        self.add_shared(Arc::clone(&item));
        item
    }

    /// Adds an already shared item.
    pub fn add_shared(&self, item: SharedItem) {
        let size = {
            let mut shelves = self.shelves.write();
            shelves.insert(item.clone());
            shelves.items.len()
        };
        debug!(title = item.title(), identifier = item.identifier(), size, "Added");
    }

    /// Adds a batch in a single write section: readers see all of it or none of it.
    pub fn add_all(&self, items: impl IntoIterator<Item = Item>) -> Vec<SharedItem> {
        let batch: Vec<SharedItem> = items.into_iter().map(Item::into_shared).collect();
        let size = {
            let mut shelves = self.shelves.write();
            for item in &batch {
                shelves.insert(Arc::clone(item));
            }
            shelves.items.len()
        };
        info!(added = batch.len(), size, "Added batch");
        batch
    }

    /// Replaces the whole contents in one write section.
    pub fn replace_all(&self, items: impl IntoIterator<Item = Item>) -> usize {
        let mut fresh = Shelves::default();
        for item in items {
            fresh.insert(item.into_shared());
        }
        let size = fresh.items.len();
        *self.shelves.write() = fresh;
        info!(size, "Replaced contents");
        size
    }

    /// Point-in-time copy of every item, in insertion order.
    pub fn all_items(&self) -> Vec<SharedItem> {
        self.shelves.read().items.clone()
    }

    /// Items that are available at the moment each one is checked.
    ///
    /// Membership is taken from one snapshot; availability is read per item
    /// after the catalog lock is released.
    pub fn available_items(&self) -> Vec<SharedItem> {
        self.all_items()
            .into_iter()
            .filter(|item| item.is_available())
            .collect()
    }

    pub fn find_by_identifier(&self, identifier: &str) -> Option<SharedItem> {
        self.shelves.read().by_identifier.get(identifier).cloned()
    }

    /// First item, in insertion order, whose title matches ignoring case.
    pub fn find_by_title(&self, title: &str, availability: Availability) -> Option<SharedItem> {
        self.all_items()
            .into_iter()
            .filter(|item| order::eq_ignore_case(item.title(), title))
            .find(|item| availability.admits(item))
    }

    /// Items the predicate accepts, in insertion order.
    ///
    /// Like [`sorted`](Self::sorted), the predicate sees each item's loan state
    /// as it was captured after the catalog lock was released.
    pub fn filter<F>(&self, predicate: F) -> Vec<SharedItem>
    where
        F: Fn(&ItemView<'_>) -> bool,
    {
        self.loan_snapshot()
            .into_iter()
            .filter(|(item, loan)| predicate(&ItemView { item, loan: *loan }))
            .map(|(item, _)| item)
            .collect()
    }

    /// Items whose title contains `term`, ignoring case.
    pub fn search_title(&self, term: &str) -> Vec<SharedItem> {
        self.filter(filter::title_contains(term))
    }

    /// Items by exactly this author, ignoring case.
    pub fn by_author(&self, author: &str) -> Vec<SharedItem> {
        self.filter(filter::author_is(author))
    }

    /// Items published strictly after `date`.
    pub fn published_after(&self, date: chrono::NaiveDate) -> Vec<SharedItem> {
        self.filter(filter::published_after(date))
    }

    /// Sorted copy of the catalog. The catalog's own order is left untouched.
    ///
    /// The sort is stable, so items the comparator considers equal keep their
    /// insertion order.
    pub fn sorted<F>(&self, mut compare: F) -> Vec<SharedItem>
    where
        F: FnMut(&ItemView<'_>, &ItemView<'_>) -> Ordering,
    {
        let mut entries = self.loan_snapshot();
        entries.sort_by(|(a, a_loan), (b, b_loan)| {
            compare(
                &ItemView { item: a, loan: *a_loan },
                &ItemView { item: b, loan: *b_loan },
            )
        });
        entries.into_iter().map(|(item, _)| item).collect()
    }

    /// Natural order: case-insensitive title.
    pub fn sorted_by_title(&self) -> Vec<SharedItem> {
        self.sorted(order::by_title)
    }

    pub fn size(&self) -> usize {
        self.shelves.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Removes the item currently indexed under `identifier`.
    pub fn remove(&self, identifier: &str) -> Option<SharedItem> {
        let mut shelves = self.shelves.write();
        let target = shelves.by_identifier.get(identifier).cloned()?;
        let position = shelves.items.iter().position(|item| Arc::ptr_eq(item, &target))?;
        Some(shelves.detach(position))
    }

    /// Removes this exact item. Returns whether it was in the catalog.
    pub fn remove_item(&self, item: &SharedItem) -> bool {
        let mut shelves = self.shelves.write();
        match shelves.items.iter().position(|other| Arc::ptr_eq(other, item)) {
            Some(position) => {
                shelves.detach(position);
                true
            }
            None => false,
        }
    }

    fn loan_snapshot(&self) -> Vec<(SharedItem, LoanState)> {
        self.all_items()
            .into_iter()
            .map(|item| {
                let loan = item.loan_state();
                (item, loan)
            })
            .collect()
    }

    /// Serializable copy of the catalog in insertion order.
    pub fn records(&self) -> Vec<ItemRecord> {
        self.all_items().iter().map(|item| item.record()).collect()
    }
}
