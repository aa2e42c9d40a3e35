//! feedbeat - Feed-to-channel notifier
//!
//! Polls RSS 2.0 and Atom subscriptions on a heartbeat, detects items that
//! are new since the last poll, and posts one notification per new item to
//! the subscription's channel.

pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod logging;
pub mod notify;
pub mod sync;
pub mod web;

pub use config::{Config, HeartbeatConfig, SharedHeartbeat};
pub use db::{
    Database, NewSubscription, Subscription, SubscriptionRepository, SubscriptionStore,
    SubscriptionUpdate,
};
pub use error::{FeedbeatError, Result};
pub use feed::{FeedKind, FeedSnapshot, FeedSource, HttpFeedSource, ParsedFeed, ParsedItem};
pub use notify::{HttpNotifier, NewMessage, Notifier, POST_TYPE_FEED_ITEM};
pub use sync::{EngineHandle, PollOutcome, SyncEngine};
pub use web::WebServer;
