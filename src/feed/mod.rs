//! Feed handling for feedbeat.
//!
//! Fetching, parsing, format classification, markup stripping and the
//! new-item differ.

pub mod diff;
pub mod fetcher;
pub mod markup;
pub mod types;

pub use diff::new_items;
pub use fetcher::{check_url, parse_document, parse_feed, FeedSource, HttpFeedSource};
pub use markup::to_plain_text;
pub use types::{FeedKind, FeedSnapshot, ParsedFeed, ParsedItem};
