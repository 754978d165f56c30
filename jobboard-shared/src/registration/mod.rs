/// OTP-gated registration
///
/// A new account is staged as a pending registration and only written to the
/// credential store after the email owner returns the code sent to them.
///
/// # Modules
///
/// - [`workflow`]: request, verify, resend and sweep operations
/// - [`pending`]: pending store trait and in-memory implementation
/// - [`redis_store`]: pending store shared through Redis
/// - [`credentials`]: credential store trait (Postgres and in-memory)
/// - [`notifier`]: code delivery (HTTP mail API, log, recording)
/// - [`otp`]: code generation
/// - [`clock`]: injectable time source
/// - [`locks`]: per-email serialization
/// - [`sweeper`]: background expiry sweep

pub mod clock;
pub mod credentials;
pub mod error;
pub mod locks;
pub mod notifier;
pub mod otp;
pub mod pending;
pub mod redis_store;
pub mod sweeper;
pub mod workflow;

pub use clock::{Clock, ManualClock, SystemClock};
pub use credentials::{
    CredentialStore, CredentialStoreError, InMemoryCredentialStore, PgCredentialStore,
};
pub use error::RegistrationError;
pub use notifier::{
    HttpMailer, LogNotifier, MailerConfig, Notification, Notifier, NotifyError, RecordingNotifier,
};
pub use otp::{CodeGenerator, RandomCodeGenerator, SequenceCodeGenerator};
pub use pending::{InMemoryPendingStore, PendingRegistration, PendingStore, PendingStoreError};
pub use redis_store::RedisPendingStore;
pub use sweeper::PendingSweeper;
pub use workflow::{RegistrationConfig, RegistrationRequest, RegistrationWorkflow};

/// Canonical form of an email address used as the registration key
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
