/// Notification senders for verification codes
///
/// The workflow only depends on the [`Notifier`] trait. Implementations:
///
/// - [`HttpMailer`]: POSTs the message to a transactional mail API
/// - [`LogNotifier`]: writes the message to the log (development)
/// - [`RecordingNotifier`]: keeps messages in memory and can be told to fail (tests)
///
/// # Mail API Contract
///
/// ```text
/// POST {api_url}
/// Authorization: Bearer {api_key}
/// Content-Type: application/json
///
/// {"from": "...", "to": "...", "subject": "...", "text": "..."}
/// ```
///
/// Any 2xx response counts as accepted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

/// Notification errors
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Could not reach the provider
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider answered with a non-success status
    #[error("Provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// Provider did not answer in time
    #[error("Notification timed out after {0:?}")]
    Timeout(Duration),
}

/// A delivered (or attempted) message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivers a message to an email address
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short sender name for logs
    fn name(&self) -> &str;

    /// Sends `body` to `to`
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Builds the subject and body of a verification email
pub fn verification_message(code: &str, valid_for_minutes: i64) -> (String, String) {
    let subject = "Your verification code".to_string();
    let body = format!(
        "Your verification code is {code}.\n\n\
         It expires in {valid_for_minutes} minutes. \
         If you did not try to register, you can ignore this email."
    );
    (subject, body)
}

/// Mail API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    /// Endpoint that accepts the JSON message
    pub api_url: String,

    /// Bearer token for the endpoint
    pub api_key: String,

    /// Sender address
    pub from: String,
}

#[derive(Serialize)]
struct MailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Sends mail through an HTTP mail API
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    config: MailerConfig,
}

impl HttpMailer {
    /// Creates a mailer whose requests give up after `timeout`
    pub fn new(config: MailerConfig, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Notifier for HttpMailer {
    fn name(&self) -> &str {
        "http_mailer"
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let request = MailRequest {
            from: &self.config.from,
            to,
            subject,
            text: body,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Mail API rejected message");
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(to = %to, "Mail API accepted message");
        Ok(())
    }
}

/// Logs messages instead of sending them
///
/// Only meant for local development: the code ends up in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(to = %to, subject = %subject, body = %body, "Notification (not delivered)");
        Ok(())
    }
}

/// Keeps every message in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent sends fail (without recording) until reset
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All messages delivered so far
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The most recent message sent to `to`
    pub fn last_to(&self, to: &str) -> Option<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .rev()
            .find(|n| n.to == to)
            .cloned()
    }

    /// The six-digit code in the most recent message sent to `to`
    pub fn last_code_to(&self, to: &str) -> Option<String> {
        self.last_to(to).and_then(|n| extract_code(&n.body))
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Transport("recording notifier set to fail".to_string()));
        }

        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Notification {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
        Ok(())
    }
}

fn extract_code(body: &str) -> Option<String> {
    body.split(|c: char| !c.is_ascii_digit())
        .find(|token| super::otp::is_well_formed(token))
        .map(str::to_string)
}
