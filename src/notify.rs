//! Notification sink for posting feed items to channels.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::config::NotifyConfig;
use crate::{FeedbeatError, Result};

/// Request timeout in seconds for message posts.
const POST_TIMEOUT_SECS: u64 = 10;

/// Post type tag distinguishing engine-generated messages from user posts.
pub const POST_TYPE_FEED_ITEM: &str = "custom_feed_item";

/// Message creation request body.
#[derive(Debug, Clone, Serialize)]
pub struct NewMessage<'a> {
    /// Destination channel.
    pub channel_id: &'a str,
    /// Message body.
    pub message: &'a str,
    /// Post type tag.
    pub post_type: &'a str,
}

/// Sink for channel notifications, as seen by the sync pipeline.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post one message to a channel.
    async fn post(&self, channel_id: &str, message: &str, post_type: &str) -> Result<()>;
}

/// Notifier posting to an HTTP message API.
pub struct HttpNotifier {
    client: Client,
    endpoint: String,
}

impl HttpNotifier {
    /// Create a notifier for the configured message API.
    pub fn new(config: &NotifyConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(POST_TIMEOUT_SECS))
            .user_agent(concat!("feedbeat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                FeedbeatError::Notify(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: messages_endpoint(&config.base_url),
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn post(&self, channel_id: &str, message: &str, post_type: &str) -> Result<()> {
        let body = NewMessage {
            channel_id,
            message,
            post_type,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| FeedbeatError::Notify(format!("failed to post message: {}", e)))?;

        if !response.status().is_success() {
            return Err(FeedbeatError::Notify(format!(
                "message API returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

fn messages_endpoint(base_url: &str) -> String {
    format!("{}/messages", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_endpoint() {
        assert_eq!(
            messages_endpoint("http://127.0.0.1:8065"),
            "http://127.0.0.1:8065/messages"
        );
        assert_eq!(
            messages_endpoint("http://127.0.0.1:8065/"),
            "http://127.0.0.1:8065/messages"
        );
    }

    #[test]
    fn test_new_message_serialization() {
        let body = NewMessage {
            channel_id: "town-square",
            message: "Example News\nFirst Article\nhttps://example.com/1\n",
            post_type: POST_TYPE_FEED_ITEM,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["channel_id"], "town-square");
        assert_eq!(json["post_type"], "custom_feed_item");
        assert!(json["message"].as_str().unwrap().contains("First Article"));
    }
}
