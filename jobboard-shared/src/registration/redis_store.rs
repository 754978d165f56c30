/// Redis-backed pending registration store
///
/// Records are stored as JSON strings under `pending_registration:{email}`
/// with a TTL. The TTL only reclaims abandoned records: expiry as seen by
/// users is still decided by the workflow against `issued_at`, so the
/// retention must be at least the code lifetime.
///
/// # Example
///
/// ```no_run
/// use jobboard_shared::redis::{RedisClient, RedisConfig};
/// use jobboard_shared::registration::redis_store::RedisPendingStore;
/// use std::time::Duration;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = RedisClient::new(RedisConfig::from_env()?).await?;
/// let store = RedisPendingStore::new(client, Duration::from_secs(20 * 60));
/// # Ok(())
/// # }
/// ```

use super::pending::{PendingRegistration, PendingStore, PendingStoreError};
use crate::redis::{RedisClient, RedisClientError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use std::time::Duration;

const KEY_PREFIX: &str = "pending_registration";

impl From<redis::RedisError> for PendingStoreError {
    fn from(err: redis::RedisError) -> Self {
        PendingStoreError::Backend(RedisClientError::from(err).to_string())
    }
}

impl From<RedisClientError> for PendingStoreError {
    fn from(err: RedisClientError) -> Self {
        PendingStoreError::Backend(err.to_string())
    }
}

/// Pending store shared across API instances through Redis
#[derive(Clone)]
pub struct RedisPendingStore {
    client: RedisClient,
    retention_secs: u64,
}

impl RedisPendingStore {
    /// Creates a store whose keys expire after `retention`
    pub fn new(client: RedisClient, retention: Duration) -> Self {
        Self {
            client,
            retention_secs: retention.as_secs().max(1),
        }
    }

    fn key(email: &str) -> String {
        format!("{}:{}", KEY_PREFIX, email)
    }

    fn decode(raw: Option<String>) -> Result<Option<PendingRegistration>, PendingStoreError> {
        raw.map(|json| PendingRegistration::from_json(&json))
            .transpose()
    }
}

#[async_trait]
impl PendingStore for RedisPendingStore {
    fn name(&self) -> &str {
        "redis"
    }

    async fn get(&self, email: &str) -> Result<Option<PendingRegistration>, PendingStoreError> {
        let mut conn = self.client.get_connection();
        let raw: Option<String> = conn.get(Self::key(email)).await?;
        Self::decode(raw)
    }

    async fn set(&self, record: PendingRegistration) -> Result<(), PendingStoreError> {
        let key = Self::key(&record.email);
        let value = record.to_json()?;

        let mut conn = self.client.get_connection();
        let _: () = conn.set_ex(&key, value, self.retention_secs).await?;

        tracing::trace!(key = %key, ttl = self.retention_secs, "Stored pending registration");
        Ok(())
    }

    async fn delete(&self, email: &str) -> Result<bool, PendingStoreError> {
        let mut conn = self.client.get_connection();
        let removed: i64 = conn.del(Self::key(email)).await?;
        Ok(removed > 0)
    }

    async fn take(&self, email: &str) -> Result<Option<PendingRegistration>, PendingStoreError> {
        let mut conn = self.client.get_connection();

        // GETDEL keeps get-and-remove atomic across API instances
        let raw: Option<String> = redis::cmd("GETDEL")
            .arg(Self::key(email))
            .query_async(&mut conn)
            .await?;

        Self::decode(raw)
    }

    async fn remove_issued_until(&self, _cutoff: DateTime<Utc>) -> Result<usize, PendingStoreError> {
        // Keys carry their own TTL; Redis reclaims them without a sweep.
        Ok(0)
    }

    async fn exists(&self, email: &str) -> Result<bool, PendingStoreError> {
        let mut conn = self.client.get_connection();
        let exists: bool = conn.exists(Self::key(email)).await?;
        Ok(exists)
    }

    async fn ping(&self) -> Result<(), PendingStoreError> {
        if self.client.ping().await? {
            Ok(())
        } else {
            Err(PendingStoreError::Backend(
                "Unexpected PING response".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redis::RedisConfig;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn test_key_format() {
        assert_eq!(
            RedisPendingStore::key("ana@x.com"),
            "pending_registration:ana@x.com"
        );
    }

    #[test]
    fn test_decode_missing_is_none() {
        assert!(RedisPendingStore::decode(None).unwrap().is_none());
    }

    #[tokio::test]
    #[ignore] // Requires running Redis instance
    async fn test_redis_round_trip_and_take() {
        let client = RedisClient::new(RedisConfig::default_for_test())
            .await
            .unwrap();
        let store = RedisPendingStore::new(client, Duration::from_secs(60));

        let record = PendingRegistration {
            email: "redis-test@x.com".to_string(),
            name: "Ana".to_string(),
            phone: Some("555-0100".to_string()),
            password_hash: "$argon2id$stub".to_string(),
            code: "482913".to_string(),
            issued_at: Utc::now() - ChronoDuration::seconds(5),
        };

        store.set(record.clone()).await.unwrap();
        assert!(store.exists(&record.email).await.unwrap());
        assert_eq!(store.get(&record.email).await.unwrap(), Some(record.clone()));

        assert_eq!(store.take(&record.email).await.unwrap(), Some(record.clone()));
        assert!(store.take(&record.email).await.unwrap().is_none());
    }
}
