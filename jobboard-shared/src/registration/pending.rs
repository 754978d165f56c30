/// Staging area for unconfirmed registrations
///
/// A `PendingRegistration` holds everything needed to create an account once
/// the submitter proves control of the email address. Records are keyed by
/// normalized email and live in a [`PendingStore`], which the workflow owns.
///
/// # Implementations
///
/// - [`InMemoryPendingStore`]: process-local map, the default
/// - [`RedisPendingStore`](super::redis_store::RedisPendingStore): shared,
///   with a Redis TTL as a backstop for abandoned records

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Pending store errors
#[derive(Error, Debug)]
pub enum PendingStoreError {
    /// Backend unavailable or command failed
    #[error("Pending store backend error: {0}")]
    Backend(String),

    /// Stored record could not be (de)serialized
    #[error("Pending record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// An unconfirmed registration awaiting its verification code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRegistration {
    /// Normalized email (store key)
    pub email: String,

    /// Display name
    pub name: String,

    /// Optional phone number, stored as submitted
    pub phone: Option<String>,

    /// Argon2id hash of the submitted password
    pub password_hash: String,

    /// Six-digit verification code
    pub code: String,

    /// When the current code was issued
    pub issued_at: DateTime<Utc>,
}

impl PendingRegistration {
    /// Returns true once `ttl` has passed since the code was issued
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.issued_at >= ttl
    }

    /// Serializes to JSON for external stores
    pub fn to_json(&self) -> Result<String, PendingStoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserializes from JSON
    pub fn from_json(json: &str) -> Result<Self, PendingStoreError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Key-value store for pending registrations
///
/// Keys are normalized emails. `set` overwrites, so a second registration
/// request replaces the first one's code.
#[async_trait]
pub trait PendingStore: Send + Sync {
    /// Short backend name for logs and health output
    fn name(&self) -> &str;

    /// Fetches the record for `email`
    async fn get(&self, email: &str) -> Result<Option<PendingRegistration>, PendingStoreError>;

    /// Inserts or replaces the record keyed by `record.email`
    async fn set(&self, record: PendingRegistration) -> Result<(), PendingStoreError>;

    /// Removes the record for `email`, returning whether one existed
    async fn delete(&self, email: &str) -> Result<bool, PendingStoreError>;

    /// Atomically removes and returns the record for `email`
    async fn take(&self, email: &str) -> Result<Option<PendingRegistration>, PendingStoreError>;

    /// Removes every record issued at or before `cutoff`
    async fn remove_issued_until(&self, cutoff: DateTime<Utc>) -> Result<usize, PendingStoreError>;

    /// Returns whether a record exists for `email`
    async fn exists(&self, email: &str) -> Result<bool, PendingStoreError> {
        Ok(self.get(email).await?.is_some())
    }

    /// Checks that the backend is reachable
    async fn ping(&self) -> Result<(), PendingStoreError> {
        Ok(())
    }
}

/// Process-local pending store
#[derive(Debug, Default)]
pub struct InMemoryPendingStore {
    entries: RwLock<HashMap<String, PendingRegistration>>,
}

impl InMemoryPendingStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pending records
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true when no records are pending
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl PendingStore for InMemoryPendingStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, email: &str) -> Result<Option<PendingRegistration>, PendingStoreError> {
        Ok(self.entries.read().await.get(email).cloned())
    }

    async fn set(&self, record: PendingRegistration) -> Result<(), PendingStoreError> {
        self.entries
            .write()
            .await
            .insert(record.email.clone(), record);
        Ok(())
    }

    async fn delete(&self, email: &str) -> Result<bool, PendingStoreError> {
        Ok(self.entries.write().await.remove(email).is_some())
    }

    async fn take(&self, email: &str) -> Result<Option<PendingRegistration>, PendingStoreError> {
        Ok(self.entries.write().await.remove(email))
    }

    async fn remove_issued_until(&self, cutoff: DateTime<Utc>) -> Result<usize, PendingStoreError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, record| record.issued_at > cutoff);
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(email: &str, code: &str, issued_at: DateTime<Utc>) -> PendingRegistration {
        PendingRegistration {
            email: email.to_string(),
            name: "Ana".to_string(),
            phone: None,
            password_hash: "$argon2id$stub".to_string(),
            code: code.to_string(),
            issued_at,
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let issued = Utc::now();
        let rec = record("ana@x.com", "123456", issued);
        let ttl = Duration::minutes(10);

        assert!(!rec.is_expired(issued, ttl));
        assert!(!rec.is_expired(issued + ttl - Duration::seconds(1), ttl));
        assert!(rec.is_expired(issued + ttl, ttl));
    }

    #[test]
    fn test_json_preserves_fields() {
        let rec = record("ana@x.com", "012345", Utc::now());
        let json = rec.to_json().unwrap();
        assert!(json.contains("\"code\":\"012345\""));
        assert_eq!(PendingRegistration::from_json(&json).unwrap(), rec);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            PendingRegistration::from_json("not json"),
            Err(PendingStoreError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_set_overwrites_previous_code() {
        let store = InMemoryPendingStore::new();
        let now = Utc::now();

        store.set(record("ana@x.com", "111111", now)).await.unwrap();
        store.set(record("ana@x.com", "222222", now)).await.unwrap();

        assert_eq!(store.len().await, 1);
        let current = store.get("ana@x.com").await.unwrap().unwrap();
        assert_eq!(current.code, "222222");
    }

    #[tokio::test]
    async fn test_take_removes_once() {
        let store = InMemoryPendingStore::new();
        store
            .set(record("ana@x.com", "111111", Utc::now()))
            .await
            .unwrap();

        assert!(store.exists("ana@x.com").await.unwrap());
        assert!(store.take("ana@x.com").await.unwrap().is_some());
        assert!(store.take("ana@x.com").await.unwrap().is_none());
        assert!(!store.exists("ana@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let store = InMemoryPendingStore::new();
        assert!(!store.delete("nobody@x.com").await.unwrap());

        store
            .set(record("ana@x.com", "111111", Utc::now()))
            .await
            .unwrap();
        assert!(store.delete("ana@x.com").await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove_issued_until_keeps_fresh_records() {
        let store = InMemoryPendingStore::new();
        let now = Utc::now();
        let cutoff = now - Duration::minutes(10);

        store
            .set(record("old@x.com", "111111", now - Duration::minutes(30)))
            .await
            .unwrap();
        store.set(record("edge@x.com", "333333", cutoff)).await.unwrap();
        store.set(record("new@x.com", "222222", now)).await.unwrap();

        let removed = store.remove_issued_until(cutoff).await.unwrap();

        assert_eq!(removed, 2);
        assert!(!store.exists("edge@x.com").await.unwrap());
        assert!(store.exists("new@x.com").await.unwrap());
        assert!(!store.exists("old@x.com").await.unwrap());
    }
}
