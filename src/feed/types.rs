//! Feed data model shared by the fetcher, differ, and sync pipeline.

use std::fmt;

use feed_rs::model::FeedType;

use crate::{FeedbeatError, Result};

/// The two feed formats the engine handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    /// RSS 2.0.
    Rss2,
    /// Atom.
    Atom,
}

/// Check whether a parsed document is RSS 2.0.
pub fn is_rss2(feed_type: &FeedType) -> bool {
    matches!(feed_type, FeedType::RSS2)
}

/// Check whether a parsed document is Atom.
pub fn is_atom(feed_type: &FeedType) -> bool {
    matches!(feed_type, FeedType::Atom)
}

impl FeedKind {
    /// Classify a parsed document into one of the supported formats.
    ///
    /// Anything the two predicates do not agree on exactly once (RSS 0.x/1.0,
    /// JSON Feed) is an unsupported format.
    pub fn classify(feed_type: &FeedType) -> Result<FeedKind> {
        match (is_rss2(feed_type), is_atom(feed_type)) {
            (true, false) => Ok(FeedKind::Rss2),
            (false, true) => Ok(FeedKind::Atom),
            _ => Err(FeedbeatError::UnsupportedFormat),
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedKind::Rss2 => write!(f, "RSS 2.0"),
            FeedKind::Atom => write!(f, "Atom"),
        }
    }
}

/// A structured feed, reconstructed on every poll.
#[derive(Debug, Clone, Default)]
pub struct ParsedFeed {
    /// Feed title.
    pub title: String,
    /// Items in feed-provider order.
    pub items: Vec<ParsedItem>,
}

impl ParsedFeed {
    /// Create an empty feed with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    /// Append an item.
    pub fn with_item(mut self, item: ParsedItem) -> Self {
        self.items.push(item);
        self
    }
}

/// One entry in a feed.
///
/// Identity is the `id` field alone; titles, links and descriptions may
/// change without making an item "new".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItem {
    /// Unique identifier (RSS guid or Atom id).
    pub id: String,
    /// Item title.
    pub title: String,
    /// Link to the original article.
    pub link: String,
    /// Item description or summary, possibly containing markup.
    pub description: Option<String>,
    /// Category terms in document order.
    pub categories: Vec<String>,
}

impl ParsedItem {
    /// Create a new item.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            link: link.into(),
            description: None,
            categories: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the categories.
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }
}

/// A fetched feed: the structured form plus the raw document text that the
/// commit step persists.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    /// Classified format.
    pub kind: FeedKind,
    /// Structured feed.
    pub feed: ParsedFeed,
    /// Raw document as fetched.
    pub raw: String,
}
