use super::notifier::NotifyError;
use super::pending::PendingStoreError;
use crate::auth::password::PasswordError;
use thiserror::Error;

/// Registration workflow errors
///
/// The first seven variants are the outcomes a client can see; the last two
/// are infrastructure failures that the API reports as internal errors.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// Missing or empty input field
    #[error("Validation error: {0}")]
    Validation(String),

    /// A confirmed account already uses this email
    #[error("An account with this email already exists")]
    DuplicateAccount,

    /// Nothing is waiting for verification under this email
    #[error("No pending registration for this email")]
    NoPendingRegistration,

    /// The code was issued too long ago
    #[error("Verification code has expired")]
    CodeExpired,

    /// The submitted code does not match
    #[error("Invalid verification code")]
    InvalidCode,

    /// The code could not be delivered
    #[error("Failed to send verification code: {0}")]
    NotificationFailed(#[from] NotifyError),

    /// The account could not be written
    #[error("Failed to create account: {0}")]
    AccountCreationFailed(String),

    /// Pending store backend failure
    #[error("Pending store error: {0}")]
    PendingStore(#[from] PendingStoreError),

    /// Password could not be hashed
    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] PasswordError),
}

impl RegistrationError {
    /// Stable snake_case identifier used in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            RegistrationError::Validation(_) => "validation_error",
            RegistrationError::DuplicateAccount => "duplicate_account",
            RegistrationError::NoPendingRegistration => "no_pending_registration",
            RegistrationError::CodeExpired => "code_expired",
            RegistrationError::InvalidCode => "invalid_code",
            RegistrationError::NotificationFailed(_) => "notification_failed",
            RegistrationError::AccountCreationFailed(_) => "account_creation_failed",
            RegistrationError::PendingStore(_) => "pending_store_error",
            RegistrationError::PasswordHash(_) => "password_hash_error",
        }
    }

    /// True for outcomes caused by the caller's input rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RegistrationError::Validation(_)
                | RegistrationError::DuplicateAccount
                | RegistrationError::NoPendingRegistration
                | RegistrationError::CodeExpired
                | RegistrationError::InvalidCode
        )
    }
}
