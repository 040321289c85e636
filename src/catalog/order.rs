//! Stock comparators for [`Catalog::sorted`](super::Catalog::sorted).

use super::ItemView;
use std::cmp::Ordering;

/// Natural order of items: title, ignoring case.
pub fn by_title(a: &ItemView<'_>, b: &ItemView<'_>) -> Ordering {
    cmp_ignore_case(a.title(), b.title())
}

pub fn by_author(a: &ItemView<'_>, b: &ItemView<'_>) -> Ordering {
    cmp_ignore_case(a.author(), b.author())
}

/// Most borrowed first.
pub fn by_usage(a: &ItemView<'_>, b: &ItemView<'_>) -> Ordering {
    b.usage().cmp(&a.usage())
}

/// Oldest first; undated items go last.
pub fn by_publish_date(a: &ItemView<'_>, b: &ItemView<'_>) -> Ordering {
    match (a.published(), b.published()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub(crate) fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    cmp_ignore_case(a, b) == Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::model::Item;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seeded() -> Catalog {
        let catalog = Catalog::new();
        let items = catalog.add_all([
            Item::new("Effective Java", "Joshua Bloch").with_published(date(2017, 12, 27)),
            Item::new("Design Patterns", "Gang of Four").with_published(date(1994, 10, 31)),
            Item::new("Harry Potter", "J.K. Rowling"),
            Item::new("The Pragmatic Programmer", "andrew Hunt").with_published(date(2019, 9, 13)),
        ]);
        items[0].increment_usage();
        items[0].increment_usage();
        items[1].increment_usage();
        catalog
    }

    fn titles(catalog: &Catalog, compare: fn(&ItemView<'_>, &ItemView<'_>) -> Ordering) -> Vec<String> {
        catalog
            .sorted(compare)
            .iter()
            .map(|item| item.title().to_owned())
            .collect()
    }

    #[test]
    fn author_order_ignores_case() {
        assert_eq!(
            titles(&seeded(), by_author),
            vec!["The Pragmatic Programmer", "Design Patterns", "Harry Potter", "Effective Java"]
        );
    }

    #[test]
    fn usage_order_is_descending() {
        assert_eq!(
            titles(&seeded(), by_usage),
            vec!["Effective Java", "Design Patterns", "Harry Potter", "The Pragmatic Programmer"]
        );
    }

    #[test]
    fn publish_date_order_puts_undated_last() {
        assert_eq!(
            titles(&seeded(), by_publish_date),
            vec!["Design Patterns", "Effective Java", "The Pragmatic Programmer", "Harry Potter"]
        );
    }

    #[test]
    fn case_insensitive_helpers() {
        assert_eq!(cmp_ignore_case("abc", "ABD"), Ordering::Less);
        assert!(eq_ignore_case("Clean Code", "cLEAN cODE"));
        assert!(!eq_ignore_case("Clean", "Clean Code"));
    }
}
