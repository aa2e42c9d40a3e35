//! New-item detection between two polls of the same feed.

use std::collections::HashSet;

use super::types::{ParsedFeed, ParsedItem};

/// Compute the items present in `current` but not in `previous`.
///
/// Identity is the item id alone. The result preserves the relative order
/// of `current.items`; neither input is modified.
pub fn new_items<'a>(previous: &ParsedFeed, current: &'a ParsedFeed) -> Vec<&'a ParsedItem> {
    let seen: HashSet<&str> = previous.items.iter().map(|item| item.id.as_str()).collect();
    current
        .items
        .iter()
        .filter(|item| !seen.contains(item.id.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> ParsedItem {
        ParsedItem::new(id, format!("title-{id}"), format!("https://example.com/{id}"))
    }

    fn feed(ids: &[&str]) -> ParsedFeed {
        ParsedFeed {
            title: "Example".to_string(),
            items: ids.iter().map(|id| item(id)).collect(),
        }
    }

    #[test]
    fn test_disjoint_feeds_everything_is_new() {
        let previous = feed(&["a", "b"]);
        let current = feed(&["c", "d", "e"]);
        let fresh = new_items(&previous, &current);
        let ids: Vec<&str> = fresh.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d", "e"]);
    }

    #[test]
    fn test_subset_yields_nothing() {
        let previous = feed(&["a", "b", "c"]);
        let current = feed(&["b", "c"]);
        assert!(new_items(&previous, &current).is_empty());
    }

    #[test]
    fn test_identical_feeds_yield_nothing() {
        let old = feed(&["a", "b", "c"]);
        assert!(new_items(&old, &old).is_empty());
    }

    #[test]
    fn test_order_follows_current_feed() {
        let previous = feed(&["b"]);
        let current = feed(&["c", "b", "a"]);
        let ids: Vec<&str> = new_items(&previous, &current)
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn test_previous_order_is_irrelevant() {
        let current = feed(&["a", "b", "c", "d"]);
        let forwards = feed(&["a", "c"]);
        let backwards = feed(&["c", "a"]);
        let from_forwards: Vec<&str> = new_items(&forwards, &current)
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        let from_backwards: Vec<&str> = new_items(&backwards, &current)
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(from_forwards, vec!["b", "d"]);
        assert_eq!(from_forwards, from_backwards);
    }

    #[test]
    fn test_changed_title_is_not_a_new_item() {
        let previous = feed(&["a"]);
        let mut current = feed(&["a"]);
        current.items[0].title = "rewritten headline".to_string();
        current.items[0].link = "https://example.com/moved".to_string();
        assert!(new_items(&previous, &current).is_empty());
    }

    #[test]
    fn test_empty_previous_announces_everything() {
        let previous = ParsedFeed::default();
        let current = feed(&["a", "b"]);
        assert_eq!(new_items(&previous, &current).len(), 2);
    }

    #[test]
    fn test_inputs_are_untouched() {
        let previous = feed(&["a"]);
        let current = feed(&["a", "b"]);
        let _ = new_items(&previous, &current);
        assert_eq!(previous.items.len(), 1);
        assert_eq!(current.items.len(), 2);
    }
}
