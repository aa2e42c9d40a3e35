//! Feed fetching and parsing.
//!
//! [`HttpFeedSource`] is the production [`FeedSource`]: it fetches a feed
//! document over HTTP with timeouts and a size cap, classifies its format
//! and returns the structured feed together with the raw document text.

use async_trait::async_trait;
use feed_rs::parser;
use reqwest::Client;
use std::time::Duration;

use super::types::{FeedKind, FeedSnapshot, ParsedFeed, ParsedItem};
use crate::{FeedbeatError, Result};

/// Connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Read timeout in seconds.
const READ_TIMEOUT_SECS: u64 = 20;

/// Total timeout in seconds.
const TOTAL_TIMEOUT_SECS: u64 = 30;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Maximum feed size in bytes (5MB).
const MAX_FEED_SIZE: u64 = 5 * 1024 * 1024;

/// User agent string for feed fetching.
const USER_AGENT: &str = concat!("feedbeat/", env!("CARGO_PKG_VERSION"));

/// Source of feed documents, as seen by the sync pipeline.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and parse the feed at `url`.
    async fn fetch(&self, url: &str) -> Result<FeedSnapshot>;

    /// Reconstruct a structured feed from a previously stored document.
    fn reparse(&self, raw: &str) -> Result<ParsedFeed>;
}

/// HTTP feed source.
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    /// Create a new source with default client settings.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .read_timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .timeout(Duration::from_secs(TOTAL_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FeedbeatError::Fetch(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Result<FeedSnapshot> {
        check_url(url)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FeedbeatError::Fetch(format!("failed to fetch feed: {}", e)))?;

        if !response.status().is_success() {
            return Err(FeedbeatError::Fetch(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        if let Some(length) = response.content_length() {
            if length > MAX_FEED_SIZE {
                return Err(FeedbeatError::Fetch(format!(
                    "feed too large: {} bytes (max {} bytes)",
                    length, MAX_FEED_SIZE
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FeedbeatError::Fetch(format!("failed to read response: {}", e)))?;

        if bytes.len() as u64 > MAX_FEED_SIZE {
            return Err(FeedbeatError::Fetch(format!(
                "feed too large: {} bytes (max {} bytes)",
                bytes.len(),
                MAX_FEED_SIZE
            )));
        }

        let raw = String::from_utf8_lossy(&bytes).into_owned();
        parse_document(&raw)
    }

    fn reparse(&self, raw: &str) -> Result<ParsedFeed> {
        parse_feed(raw)
    }
}

/// Validate that a URL is a plausible feed location.
///
/// Only http(s) URLs with a host are fetched.
pub fn check_url(url: &str) -> Result<()> {
    let parsed =
        url::Url::parse(url).map_err(|e| FeedbeatError::Fetch(format!("invalid URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(FeedbeatError::Fetch(format!(
                "unsupported URL scheme: {}",
                scheme
            )));
        }
    }

    if parsed.host().is_none() {
        return Err(FeedbeatError::Fetch("URL has no host".to_string()));
    }

    Ok(())
}

/// Parse a feed document, classifying its format.
pub fn parse_document(raw: &str) -> Result<FeedSnapshot> {
    let parsed = parser::parse(raw.as_bytes())
        .map_err(|e| FeedbeatError::Parse(e.to_string()))?;
    let kind = FeedKind::classify(&parsed.feed_type)?;
    let feed = convert_feed(parsed);

    Ok(FeedSnapshot {
        kind,
        feed,
        raw: raw.to_string(),
    })
}

/// Parse a feed document into its structured form, without format checks.
///
/// Used for reconstructing the previous poll's feed from the stored
/// snapshot, which was already classified when it was committed.
pub fn parse_feed(raw: &str) -> Result<ParsedFeed> {
    let parsed = parser::parse(raw.as_bytes())
        .map_err(|e| FeedbeatError::Parse(e.to_string()))?;
    Ok(convert_feed(parsed))
}

fn convert_feed(feed: feed_rs::model::Feed) -> ParsedFeed {
    let title = feed
        .title
        .map(|t| t.content)
        .unwrap_or_else(|| "Untitled Feed".to_string());

    let items = feed
        .entries
        .into_iter()
        .map(|entry| {
            let item_title = entry
                .title
                .map(|t| t.content)
                .unwrap_or_else(|| "Untitled".to_string());
            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default();
            let description = entry
                .summary
                .map(|t| t.content)
                .or(entry.content.and_then(|c| c.body));
            let categories = entry.categories.into_iter().map(|c| c.term).collect();

            ParsedItem {
                id: entry.id,
                title: item_title,
                link,
                description,
                categories,
            }
        })
        .collect();

    ParsedFeed { title, items }
}
