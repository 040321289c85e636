//! The loanable unit of inventory.
//!
//! An [`Item`] carries immutable descriptive fields (title, author, identifier,
//! publish date) and one mutable pair, the [`LoanState`], guarded by its own
//! item-scoped lock. Every mutation of the pair happens inside a single lock
//! acquisition, so two threads touching the same item never lose an update.

use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Items are owned by the catalog and shared by reference with every reader.
pub type SharedItem = Arc<Item>;

/// The availability flag and usage counter of an item, read and written as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanState {
    pub available: bool,
    /// Cumulative count of successful borrows. Never decreases.
    pub usage: u32,
}

impl Default for LoanState {
    fn default() -> Self {
        Self {
            available: true,
            usage: 0,
        }
    }
}

/// A loanable catalog entry.
#[derive(Debug)]
pub struct Item {
    title: String,
    author: String,
    identifier: Option<String>,
    published: Option<NaiveDate>,
    loan: Mutex<LoanState>,
}

impl Item {
    /// Creates an available item with no identifier and no publish date.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            identifier: None,
            published: None,
            loan: Mutex::new(LoanState::default()),
        }
    }

    /// Sets the identifier (ISBN or similar). An empty string means "no identifier".
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        self.identifier = (!identifier.is_empty()).then_some(identifier);
        self
    }

    pub fn with_published(mut self, published: NaiveDate) -> Self {
        self.published = Some(published);
        self
    }

    /// Restores an item, including its loan state, from a persisted record.
    pub fn from_record(record: ItemRecord) -> Self {
        Self {
            title: record.title,
            author: record.author,
            identifier: record.identifier.filter(|id| !id.is_empty()),
            published: record.published,
            loan: Mutex::new(LoanState {
                available: record.available,
                usage: record.usage,
            }),
        }
    }

    pub fn into_shared(self) -> SharedItem {
        Arc::new(self)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn published(&self) -> Option<NaiveDate> {
        self.published
    }

    /// Consistent copy of availability and usage taken under the item lock.
    pub fn loan_state(&self) -> LoanState {
        *self.loan.lock()
    }

    pub fn is_available(&self) -> bool {
        self.loan.lock().available
    }

    pub fn usage(&self) -> u32 {
        self.loan.lock().usage
    }

    pub fn set_availability(&self, available: bool) {
        self.loan.lock().available = available;
    }

    pub fn increment_usage(&self) {
        let mut loan = self.loan.lock();
        loan.usage = loan.usage.saturating_add(1);
    }

    /// Check-then-act borrow transition in one critical section.
    ///
    /// Returns the new usage count when the item went from available to
    /// unavailable, or `None` (with no state change) when it was already out.
    pub fn try_borrow(&self) -> Option<u32> {
        let mut loan = self.loan.lock();
        if !loan.available {
            return None;
        }
        loan.available = false;
        loan.usage = loan.usage.saturating_add(1);
        Some(loan.usage)
    }

    /// Marks the item available. Returns whether it was on loan before.
    pub fn release(&self) -> bool {
        let mut loan = self.loan.lock();
        let was_on_loan = !loan.available;
        loan.available = true;
        was_on_loan
    }

    /// Plain serializable copy of this item.
    pub fn record(&self) -> ItemRecord {
        let loan = self.loan_state();
        ItemRecord {
            title: self.title.clone(),
            author: self.author.clone(),
            available: loan.available,
            identifier: self.identifier.clone(),
            published: self.published,
            usage: loan.usage,
        }
    }
}

/// Persisted form of an [`Item`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub title: String,
    pub author: String,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<NaiveDate>,
    #[serde(default)]
    pub usage: u32,
}

fn default_available() -> bool {
    true
}
