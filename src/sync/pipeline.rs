//! Per-subscription poll pipeline: fetch, diff, notify, commit.

use tracing::{debug, error, warn};

use crate::config::HeartbeatConfig;
use crate::db::{Subscription, SubscriptionStore};
use crate::feed::markup::to_plain_text;
use crate::feed::{diff, FeedKind, FeedSource, ParsedFeed, ParsedItem};
use crate::notify::{Notifier, POST_TYPE_FEED_ITEM};
use crate::{FeedbeatError, Result};

/// Summary of one pipeline run, used for logging.
#[derive(Debug, Clone, Copy, Default)]
pub struct PollOutcome {
    /// Items that were not in the stored snapshot.
    pub new_items: usize,
    /// Notifications that were actually delivered.
    pub notified: usize,
    /// Whether the snapshot was durably committed.
    pub committed: bool,
}

/// Bring one subscription up to date.
///
/// Fetches the current feed, diffs it against the stored snapshot, posts
/// one notification per new item and commits the fetched snapshot when new
/// items were found. Delivery is best-effort: a failed post is logged and
/// does not block later items or the commit. A commit failure is logged
/// too; the durable snapshot then stays stale and the affected items may be
/// re-notified on the next poll.
///
/// Any error before the diff (empty URL, fetch, parse, unknown format)
/// aborts the run with no state change.
pub async fn poll_subscription(
    source: &dyn FeedSource,
    notifier: &dyn Notifier,
    store: &dyn SubscriptionStore,
    settings: &HeartbeatConfig,
    subscription: &mut Subscription,
) -> Result<PollOutcome> {
    if subscription.url.is_empty() {
        return Err(FeedbeatError::EmptyUrl);
    }

    let snapshot = source.fetch(&subscription.url).await?;

    // First poll: nothing stored yet, so every current item counts as new.
    let previous = if subscription.xml.is_empty() {
        ParsedFeed::default()
    } else {
        source.reparse(&subscription.xml)?
    };

    let fresh = diff::new_items(&previous, &snapshot.feed);
    let mut outcome = PollOutcome {
        new_items: fresh.len(),
        ..PollOutcome::default()
    };

    if fresh.is_empty() {
        debug!("subscription {}: no new items", subscription.id);
        return Ok(outcome);
    }

    for item in &fresh {
        let body = compose_body(
            snapshot.kind,
            &snapshot.feed.title,
            item,
            settings.show_description,
        );
        match notifier
            .post(&subscription.channel_id, &body, POST_TYPE_FEED_ITEM)
            .await
        {
            Ok(()) => outcome.notified += 1,
            Err(e) => {
                warn!(
                    "subscription {}: failed to post item '{}': {}",
                    subscription.id, item.id, e
                );
            }
        }
    }

    subscription.xml = snapshot.raw;
    match store
        .commit_snapshot(&subscription.id, &subscription.xml)
        .await
    {
        Ok(()) => outcome.committed = true,
        Err(e) => {
            // The durable copy is now stale; the next poll re-reads it and
            // may re-announce these items.
            error!(
                "subscription {}: failed to commit snapshot: {}",
                subscription.id, e
            );
        }
    }

    Ok(outcome)
}

/// Compose a notification body for one item.
pub fn compose_body(
    kind: FeedKind,
    feed_title: &str,
    item: &ParsedItem,
    show_description: bool,
) -> String {
    match kind {
        FeedKind::Rss2 => {
            let mut body = format!("{}\n{}\n{}\n", feed_title, item.title, item.link);
            if show_description {
                body.push_str(&to_plain_text(item.description.as_deref().unwrap_or("")));
                body.push('\n');
            }
            body
        }
        FeedKind::Atom => {
            format!(
                "{}\n{}\nTags: {}\n{}\n",
                feed_title,
                item.title,
                item.categories.join(", "),
                item.link
            )
        }
    }
}
