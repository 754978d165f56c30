/// OTP-gated registration workflow
///
/// A registration is staged as a [`PendingRegistration`] and only promoted to
/// a confirmed account once the owner of the email returns the 6-digit code
/// that was sent to it.
///
/// ```text
///  [no record] --request--> [pending] --verify(match)--> [confirmed]
///  [pending]   --request--> [pending]  (code replaced)
///  [pending]   --resend---> [pending]  (code replaced)
///  [pending]   --verify(mismatch)--> [pending]
///  [pending]   --verify(expired)---> [no record]
///  [confirmed] --request--> DuplicateAccount
/// ```
///
/// Every operation on an email runs under that email's lock, and promotion
/// removes the pending record with an atomic `take`, so concurrent verifies
/// create at most one account.
///
/// # Example
///
/// ```no_run
/// use jobboard_shared::registration::{
///     InMemoryCredentialStore, InMemoryPendingStore, LogNotifier, RegistrationConfig,
///     RegistrationRequest, RegistrationWorkflow,
/// };
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let workflow = RegistrationWorkflow::new(
///     Arc::new(InMemoryPendingStore::new()),
///     Arc::new(InMemoryCredentialStore::new()),
///     Arc::new(LogNotifier),
///     RegistrationConfig::default(),
/// );
///
/// workflow
///     .request_registration(RegistrationRequest {
///         name: "Ana".to_string(),
///         email: "ana@x.com".to_string(),
///         phone: None,
///         password: "pw1".to_string(),
///     })
///     .await?;
///
/// let user = workflow.verify_registration("ana@x.com", "123456").await?;
/// println!("Registered {}", user.email);
/// # Ok(())
/// # }
/// ```

use super::clock::{Clock, SystemClock};
use super::credentials::{CredentialStore, CredentialStoreError};
use super::error::RegistrationError;
use super::locks::KeyedLocks;
use super::notifier::{verification_message, Notifier, NotifyError};
use super::otp::{CodeGenerator, RandomCodeGenerator};
use super::pending::{PendingRegistration, PendingStore};
use super::normalize_email;
use crate::auth::password::hash_password_async;
use crate::models::user::{CreateUser, UserProfile};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default code lifetime in seconds (10 minutes)
pub const DEFAULT_CODE_TTL_SECS: i64 = 600;

/// Default notification timeout in seconds
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

/// Workflow settings
#[derive(Debug, Clone)]
pub struct RegistrationConfig {
    /// How long an issued code stays valid
    pub code_ttl: Duration,

    /// Upper bound on a single notification attempt
    pub notify_timeout: std::time::Duration,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            code_ttl: Duration::seconds(DEFAULT_CODE_TTL_SECS),
            notify_timeout: std::time::Duration::from_secs(DEFAULT_NOTIFY_TIMEOUT_SECS),
        }
    }
}

/// Input of a registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

/// Registration state machine over injected stores
pub struct RegistrationWorkflow {
    pending: Arc<dyn PendingStore>,
    credentials: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    codes: Arc<dyn CodeGenerator>,
    locks: KeyedLocks,
    config: RegistrationConfig,
}

impl RegistrationWorkflow {
    /// Creates a workflow using the system clock and random codes
    pub fn new(
        pending: Arc<dyn PendingStore>,
        credentials: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
        config: RegistrationConfig,
    ) -> Self {
        Self {
            pending,
            credentials,
            notifier,
            clock: Arc::new(SystemClock),
            codes: Arc::new(RandomCodeGenerator),
            locks: KeyedLocks::new(),
            config,
        }
    }

    /// Replaces the clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the code generator
    pub fn with_code_generator(mut self, codes: Arc<dyn CodeGenerator>) -> Self {
        self.codes = codes;
        self
    }

    pub fn config(&self) -> &RegistrationConfig {
        &self.config
    }

    /// The pending store this workflow owns
    pub fn pending_store(&self) -> &Arc<dyn PendingStore> {
        &self.pending
    }

    /// The credential store accounts are promoted into
    pub fn credential_store(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Stages a registration and sends a verification code
    ///
    /// Any previous pending registration for the email is replaced, so only
    /// the most recent code is accepted.
    ///
    /// # Errors
    ///
    /// - `Validation` if name, email or password is blank
    /// - `DuplicateAccount` if the email is already confirmed
    /// - `NotificationFailed` if the code could not be delivered; the
    ///   pending record is kept so a resend can follow
    pub async fn request_registration(
        &self,
        request: RegistrationRequest,
    ) -> Result<(), RegistrationError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(RegistrationError::Validation("name is required".to_string()));
        }
        let email = normalize_email(&request.email);
        if email.is_empty() {
            return Err(RegistrationError::Validation("email is required".to_string()));
        }
        if request.password.trim().is_empty() {
            return Err(RegistrationError::Validation("password is required".to_string()));
        }

        let _guard = self.locks.lock(&email).await;

        if self
            .credentials
            .find_by_email(&email)
            .await
            .map_err(|e| RegistrationError::AccountCreationFailed(e.to_string()))?
            .is_some()
        {
            tracing::info!(email = %email, "Registration rejected: account exists");
            return Err(RegistrationError::DuplicateAccount);
        }

        let password_hash = hash_password_async(request.password).await?;
        let record = PendingRegistration {
            email: email.clone(),
            name: name.to_string(),
            phone: request.phone,
            password_hash,
            code: self.codes.generate(),
            issued_at: self.clock.now(),
        };
        let code = record.code.clone();

        self.pending.set(record).await?;
        tracing::debug!(email = %email, store = self.pending.name(), "Pending registration staged");

        self.dispatch(&email, &code).await?;

        tracing::info!(email = %email, "Verification code sent");
        Ok(())
    }

    /// Confirms a pending registration and creates the account
    ///
    /// # Errors
    ///
    /// - `Validation` if email or code is blank
    /// - `NoPendingRegistration` if nothing is staged for the email
    /// - `CodeExpired` if the code is older than the configured lifetime;
    ///   the pending record is deleted
    /// - `InvalidCode` on mismatch; the pending record is kept
    /// - `DuplicateAccount` if the credential store already has the email;
    ///   the pending record is discarded
    /// - `AccountCreationFailed` on any other store failure; the pending
    ///   record is restored
    pub async fn verify_registration(
        &self,
        email: &str,
        submitted_code: &str,
    ) -> Result<UserProfile, RegistrationError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(RegistrationError::Validation("email is required".to_string()));
        }
        if submitted_code.trim().is_empty() {
            return Err(RegistrationError::Validation("otp is required".to_string()));
        }

        let _guard = self.locks.lock(&email).await;

        let record = self
            .pending
            .get(&email)
            .await?
            .ok_or(RegistrationError::NoPendingRegistration)?;

        if record.is_expired(self.clock.now(), self.config.code_ttl) {
            self.pending.delete(&email).await?;
            tracing::info!(email = %email, "Verification code expired");
            return Err(RegistrationError::CodeExpired);
        }

        if record.code != submitted_code {
            tracing::debug!(email = %email, "Verification code mismatch");
            return Err(RegistrationError::InvalidCode);
        }

        // Another process sharing the store may have promoted or replaced it
        let record = self
            .pending
            .take(&email)
            .await?
            .ok_or(RegistrationError::NoPendingRegistration)?;
        if record.code != submitted_code {
            self.pending.set(record).await?;
            return Err(RegistrationError::InvalidCode);
        }

        let account = CreateUser {
            name: record.name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            password_hash: record.password_hash.clone(),
        };

        match self.credentials.create(account).await {
            Ok(user) => {
                tracing::info!(email = %email, user_id = %user.id, "Registration verified");
                Ok(user.profile())
            }
            Err(CredentialStoreError::DuplicateKey(constraint)) => {
                tracing::warn!(
                    email = %email,
                    constraint = %constraint,
                    "Verified email already has an account"
                );
                Err(RegistrationError::DuplicateAccount)
            }
            Err(CredentialStoreError::Database(message)) => {
                tracing::error!(email = %email, error = %message, "Failed to create account");
                if let Err(e) = self.pending.set(record).await {
                    tracing::error!(email = %email, error = %e, "Failed to restore pending registration");
                }
                Err(RegistrationError::AccountCreationFailed(message))
            }
        }
    }

    /// Issues a new code for an existing pending registration
    ///
    /// The staged fields are kept; the code and its issue time are replaced.
    ///
    /// # Errors
    ///
    /// - `NoPendingRegistration` if nothing is staged for the email
    /// - `CodeExpired` if the staged registration has lapsed; it is deleted
    ///   and the client must register again
    /// - `NotificationFailed` if delivery fails; the new code is kept
    pub async fn resend_code(&self, email: &str) -> Result<(), RegistrationError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(RegistrationError::Validation("email is required".to_string()));
        }

        let _guard = self.locks.lock(&email).await;

        let mut record = self
            .pending
            .get(&email)
            .await?
            .ok_or(RegistrationError::NoPendingRegistration)?;

        let now = self.clock.now();
        if record.is_expired(now, self.config.code_ttl) {
            self.pending.delete(&email).await?;
            return Err(RegistrationError::CodeExpired);
        }

        record.code = self.codes.generate();
        record.issued_at = now;
        let code = record.code.clone();

        self.pending.set(record).await?;
        self.dispatch(&email, &code).await?;

        tracing::info!(email = %email, "Verification code re-sent");
        Ok(())
    }

    /// Deletes every pending registration whose code has expired
    ///
    /// Returns the number of records removed.
    pub async fn sweep_expired(&self) -> Result<usize, RegistrationError> {
        let cutoff = self.clock.now() - self.config.code_ttl;
        let removed = self.pending.remove_issued_until(cutoff).await?;

        if removed > 0 {
            tracing::info!(removed = removed, "Swept expired pending registrations");
        }
        Ok(removed)
    }

    async fn dispatch(&self, email: &str, code: &str) -> Result<(), NotifyError> {
        let (subject, body) = verification_message(code, self.config.code_ttl.num_minutes());
        let timeout = self.config.notify_timeout;

        let result = match tokio::time::timeout(timeout, self.notifier.send(email, &subject, &body)).await {
            Ok(result) => result,
            Err(_) => Err(NotifyError::Timeout(timeout)),
        };

        if let Err(e) = &result {
            tracing::warn!(
                email = %email,
                notifier = self.notifier.name(),
                error = %e,
                "Failed to deliver verification code"
            );
        }
        result
    }
}
