//! Subscription records and their repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::QueryBuilder;
use uuid::Uuid;

use super::DbPool;
use crate::{FeedbeatError, Result};

/// A feed subscription.
///
/// The `xml` field holds the raw feed document of the most recent committed
/// poll. Only the sync engine's commit step writes it.
#[derive(Debug, Clone)]
pub struct Subscription {
    /// Opaque subscription ID, stable across polls.
    pub id: String,
    /// Feed URL.
    pub url: String,
    /// Destination channel for notifications.
    pub channel_id: String,
    /// Raw feed document from the last committed poll; empty before the
    /// first commit.
    pub xml: String,
    /// When the subscription was created.
    pub created_at: DateTime<Utc>,
    /// When the subscription was last written.
    pub updated_at: DateTime<Utc>,
}

/// New subscription for creation.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    /// Feed URL.
    pub url: String,
    /// Destination channel.
    pub channel_id: String,
}

impl NewSubscription {
    /// Create a new subscription request.
    pub fn new(url: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            channel_id: channel_id.into(),
        }
    }
}

/// Subscription edit, used by the management interface.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionUpdate {
    /// New feed URL.
    pub url: Option<String>,
    /// New destination channel.
    pub channel_id: Option<String>,
}

impl SubscriptionUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the channel.
    pub fn with_channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    /// Check if the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.channel_id.is_none()
    }
}

/// Row type for subscriptions from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct SubscriptionRow {
    id: String,
    url: String,
    channel_id: String,
    xml: String,
    created_at: String,
    updated_at: String,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Subscription {
            id: row.id,
            url: row.url,
            channel_id: row.channel_id,
            xml: row.xml,
            created_at: parse_datetime(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_datetime(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Store seam used by the sync engine.
///
/// The engine only ever enumerates subscriptions and commits snapshots;
/// creation and deletion belong to the management interface.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Read all subscriptions.
    async fn list(&self) -> Result<Vec<Subscription>>;

    /// Durably replace one subscription's stored snapshot.
    async fn commit_snapshot(&self, id: &str, xml: &str) -> Result<()>;
}

/// Repository for subscription records.
pub struct SubscriptionRepository {
    pool: DbPool,
}

impl SubscriptionRepository {
    /// Create a new repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a subscription, assigning it a fresh ID.
    pub async fn create(&self, new: &NewSubscription) -> Result<Subscription> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO subscriptions (id, url, channel_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&id)
        .bind(&new.url)
        .bind(&new.channel_id)
        .execute(&self.pool)
        .await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| FeedbeatError::NotFound("subscription".to_string()))
    }

    /// Get a subscription by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Subscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT id, url, channel_id, xml, created_at, updated_at
            FROM subscriptions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Subscription::from))
    }

    /// List all subscriptions in stable (id) order.
    pub async fn list_all(&self) -> Result<Vec<Subscription>> {
        let rows = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT id, url, channel_id, xml, created_at, updated_at
            FROM subscriptions
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Subscription::from).collect())
    }

    /// Apply a management edit to a subscription.
    pub async fn update(&self, id: &str, update: &SubscriptionUpdate) -> Result<Subscription> {
        if !update.is_empty() {
            let mut query: QueryBuilder<sqlx::Sqlite> =
                QueryBuilder::new("UPDATE subscriptions SET updated_at = datetime('now')");
            if let Some(url) = &update.url {
                query.push(", url = ");
                query.push_bind(url);
            }
            if let Some(channel_id) = &update.channel_id {
                query.push(", channel_id = ");
                query.push_bind(channel_id);
            }
            query.push(" WHERE id = ");
            query.push_bind(id);
            query.build().execute(&self.pool).await?;
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| FeedbeatError::NotFound("subscription".to_string()))
    }

    /// Overwrite a subscription's stored snapshot.
    pub async fn update_snapshot(&self, id: &str, xml: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET xml = $1, updated_at = datetime('now')
            WHERE id = $2
            "#,
        )
        .bind(xml)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(FeedbeatError::NotFound("subscription".to_string()));
        }
        Ok(())
    }

    /// Delete a subscription.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(FeedbeatError::NotFound("subscription".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for SubscriptionRepository {
    async fn list(&self) -> Result<Vec<Subscription>> {
        self.list_all().await
    }

    async fn commit_snapshot(&self, id: &str, xml: &str) -> Result<()> {
        self.update_snapshot(id, xml).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn repository() -> SubscriptionRepository {
        let db = Database::open_in_memory().await.unwrap();
        SubscriptionRepository::new(db.pool().clone())
    }

    #[test]
    fn test_new_subscription() {
        let new = NewSubscription::new("https://example.com/feed.xml", "town-square");
        assert_eq!(new.url, "https://example.com/feed.xml");
        assert_eq!(new.channel_id, "town-square");
    }

    #[test]
    fn test_subscription_update_builder() {
        assert!(SubscriptionUpdate::new().is_empty());

        let update = SubscriptionUpdate::new()
            .with_url("https://example.com/atom.xml")
            .with_channel_id("dev");
        assert_eq!(update.url.as_deref(), Some("https://example.com/atom.xml"));
        assert_eq!(update.channel_id.as_deref(), Some("dev"));
        assert!(!update.is_empty());
    }

    #[test]
    fn test_parse_datetime_formats() {
        assert!(parse_datetime("2025-06-01 12:34:56").is_some());
        assert!(parse_datetime("2025-06-01T12:34:56Z").is_some());
        assert!(parse_datetime("yesterday").is_none());
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = repository().await;
        let created = repo
            .create(&NewSubscription::new("https://example.com/feed.xml", "general"))
            .await
            .unwrap();

        assert!(!created.id.is_empty());
        assert_eq!(created.url, "https://example.com/feed.xml");
        assert_eq!(created.channel_id, "general");
        assert_eq!(created.xml, "");

        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.url, created.url);
    }

    #[tokio::test]
    async fn test_list_all_is_ordered() {
        let repo = repository().await;
        for i in 0..3 {
            repo.create(&NewSubscription::new(
                format!("https://example.com/{i}.xml"),
                "general",
            ))
            .await
            .unwrap();
        }

        let listed = repo.list_all().await.unwrap();
        assert_eq!(listed.len(), 3);
        let mut ids: Vec<String> = listed.iter().map(|s| s.id.clone()).collect();
        ids.sort();
        assert_eq!(ids, listed.iter().map(|s| s.id.clone()).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_update_snapshot_round_trip() {
        let repo = repository().await;
        let sub = repo
            .create(&NewSubscription::new("https://example.com/feed.xml", "general"))
            .await
            .unwrap();

        repo.update_snapshot(&sub.id, "<rss version=\"2.0\"/>")
            .await
            .unwrap();

        let fetched = repo.get_by_id(&sub.id).await.unwrap().unwrap();
        assert_eq!(fetched.xml, "<rss version=\"2.0\"/>");
    }

    #[tokio::test]
    async fn test_update_snapshot_unknown_id() {
        let repo = repository().await;
        let err = repo.update_snapshot("missing", "<rss/>").await.unwrap_err();
        assert!(matches!(err, FeedbeatError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_management_update() {
        let repo = repository().await;
        let sub = repo
            .create(&NewSubscription::new("https://example.com/feed.xml", "general"))
            .await
            .unwrap();

        let edited = repo
            .update(
                &sub.id,
                &SubscriptionUpdate::new().with_channel_id("announcements"),
            )
            .await
            .unwrap();
        assert_eq!(edited.channel_id, "announcements");
        assert_eq!(edited.url, sub.url);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repository().await;
        let sub = repo
            .create(&NewSubscription::new("https://example.com/feed.xml", "general"))
            .await
            .unwrap();

        repo.delete(&sub.id).await.unwrap();
        assert!(repo.get_by_id(&sub.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(&sub.id).await.unwrap_err(),
            FeedbeatError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_store_trait_enumeration() {
        let repo = repository().await;
        repo.create(&NewSubscription::new("https://example.com/feed.xml", "general"))
            .await
            .unwrap();

        let store: &dyn SubscriptionStore = &repo;
        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
    }
}
