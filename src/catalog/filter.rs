//! Search predicates for [`Catalog::filter`](super::Catalog::filter).

use super::ItemView;

/// Titles containing `term`, ignoring case.
pub fn title_contains(term: &str) -> impl Fn(&ItemView<'_>) -> bool + '_ {
    move |view| contains_ignore_case(view.title(), term)
}

/// Authors equal to `author`, ignoring case.
pub fn author_is(author: &str) -> impl Fn(&ItemView<'_>) -> bool + '_ {
    move |view| super::order::eq_ignore_case(view.author(), author)
}

/// Items published strictly after `date`. Undated items never match.
pub fn published_after(date: chrono::NaiveDate) -> impl Fn(&ItemView<'_>) -> bool {
    move |view| view.published().is_some_and(|published| published > date)
}

/// A composable filter. Every criterion left unset matches everything.
///
/// ```rust
/// use library_catalog::catalog::{filter::Filter, Catalog};
/// use library_catalog::model::Item;
///
/// let catalog = Catalog::new();
/// catalog.add(Item::new("Effective Java", "Joshua Bloch"));
/// catalog.add(Item::new("Clean Code", "Robert C. Martin")).try_borrow();
///
/// let filter = Filter::new().available_only().author_contains("bloch");
/// let found = catalog.filter(|view| filter.matches(view));
/// assert_eq!(found.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub available_only: bool,
    pub min_usage: Option<u32>,
    pub author_contains: Option<String>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn available_only(mut self) -> Self {
        self.available_only = true;
        self
    }

    pub fn min_usage(mut self, usage: u32) -> Self {
        self.min_usage = Some(usage);
        self
    }

    /// An empty fragment is ignored.
    pub fn author_contains(mut self, fragment: impl Into<String>) -> Self {
        let fragment = fragment.into();
        self.author_contains = (!fragment.is_empty()).then_some(fragment);
        self
    }

    pub fn matches(&self, view: &ItemView<'_>) -> bool {
        if self.available_only && !view.is_available() {
            return false;
        }
        if self.min_usage.is_some_and(|min| view.usage() < min) {
            return false;
        }
        match &self.author_contains {
            Some(fragment) => contains_ignore_case(view.author(), fragment),
            None => true,
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
