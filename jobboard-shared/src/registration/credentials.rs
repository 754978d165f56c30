/// Credential store: durable home of confirmed accounts
///
/// The workflow only needs two calls from the store (`find_by_email` and
/// `create`); login additionally uses `find_by_id` and `record_login`.
/// `create` must report an existing email as [`CredentialStoreError::DuplicateKey`]
/// so the workflow can tell a lost race apart from a transient failure.

use crate::models::user::{CreateUser, User};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Credential store errors
#[derive(Error, Debug)]
pub enum CredentialStoreError {
    /// Email already belongs to a confirmed account
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Any other storage failure
    #[error("Credential store error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for CredentialStoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                return CredentialStoreError::DuplicateKey(constraint);
            }
        }
        CredentialStoreError::Database(err.to_string())
    }
}

/// Persistence for confirmed accounts
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Looks up an account by normalized email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CredentialStoreError>;

    /// Looks up an account by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, CredentialStoreError>;

    /// Creates a confirmed account
    async fn create(&self, account: CreateUser) -> Result<User, CredentialStoreError>;

    /// Stamps a successful login
    async fn record_login(&self, id: Uuid) -> Result<(), CredentialStoreError>;
}

/// Credential store backed by the `users` table
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CredentialStoreError> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, CredentialStoreError> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn create(&self, account: CreateUser) -> Result<User, CredentialStoreError> {
        Ok(User::create(&self.pool, account).await?)
    }

    async fn record_login(&self, id: Uuid) -> Result<(), CredentialStoreError> {
        User::update_last_login(&self.pool, id).await?;
        Ok(())
    }
}

/// Process-local credential store
///
/// Keys are lowercased emails, mirroring the CITEXT column.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    accounts: RwLock<HashMap<String, User>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of confirmed accounts
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// Returns true when no accounts exist
    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CredentialStoreError> {
        Ok(self
            .accounts
            .read()
            .await
            .get(&email.to_lowercase())
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, CredentialStoreError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|user| user.id == id)
            .cloned())
    }

    async fn create(&self, account: CreateUser) -> Result<User, CredentialStoreError> {
        let key = account.email.to_lowercase();
        let mut accounts = self.accounts.write().await;

        if accounts.contains_key(&key) {
            return Err(CredentialStoreError::DuplicateKey(
                "users_email_key".to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: account.name,
            email: account.email,
            phone: account.phone,
            password_hash: account.password_hash,
            registered_at: now,
            updated_at: now,
            last_login_at: None,
        };

        accounts.insert(key, user.clone());
        Ok(user)
    }

    async fn record_login(&self, id: Uuid) -> Result<(), CredentialStoreError> {
        let mut accounts = self.accounts.write().await;
        if let Some(user) = accounts.values_mut().find(|user| user.id == id) {
            let now = Utc::now();
            user.last_login_at = Some(now);
            user.updated_at = now;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(email: &str) -> CreateUser {
        CreateUser {
            name: "Ana".to_string(),
            email: email.to_string(),
            phone: None,
            password_hash: "$argon2id$stub".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let store = InMemoryCredentialStore::new();
        let user = store.create(new_account("ana@x.com")).await.unwrap();

        let by_email = store.find_by_email("ANA@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        let by_id = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "ana@x.com");
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let store = InMemoryCredentialStore::new();
        store.create(new_account("ana@x.com")).await.unwrap();

        let err = store.create(new_account("Ana@X.com")).await.unwrap_err();
        assert!(matches!(err, CredentialStoreError::DuplicateKey(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_record_login_sets_timestamp() {
        let store = InMemoryCredentialStore::new();
        let user = store.create(new_account("ana@x.com")).await.unwrap();
        assert!(user.last_login_at.is_none());

        store.record_login(user.id).await.unwrap();

        let reloaded = store.find_by_id(user.id).await.unwrap().unwrap();
        assert!(reloaded.last_login_at.is_some());
    }

    #[test]
    fn test_non_database_sqlx_error_maps_to_database() {
        let err = CredentialStoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, CredentialStoreError::Database(_)));
    }
}
