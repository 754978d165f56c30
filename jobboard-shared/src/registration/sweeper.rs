/// Background removal of expired pending registrations
///
/// Expiry is also detected lazily on verification, so the sweeper only
/// bounds how long abandoned records linger in the store.
///
/// # Example
///
/// ```no_run
/// # use jobboard_shared::registration::{PendingSweeper, RegistrationWorkflow};
/// # use std::sync::Arc;
/// # use std::time::Duration;
/// # async fn example(workflow: Arc<RegistrationWorkflow>) {
/// let sweeper = PendingSweeper::new(workflow, Duration::from_secs(60));
/// let shutdown = sweeper.shutdown_token();
/// let handle = sweeper.spawn();
///
/// // ... on shutdown
/// shutdown.cancel();
/// handle.await.ok();
/// # }
/// ```

use super::workflow::RegistrationWorkflow;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Periodically calls [`RegistrationWorkflow::sweep_expired`]
pub struct PendingSweeper {
    workflow: Arc<RegistrationWorkflow>,
    interval: Duration,
    shutdown_token: CancellationToken,
}

impl PendingSweeper {
    pub fn new(workflow: Arc<RegistrationWorkflow>, interval: Duration) -> Self {
        Self {
            workflow,
            interval,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Uses an externally owned token, e.g. the server's shutdown token
    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown_token = token;
        self
    }

    /// Token that stops the loop when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Runs until the shutdown token is cancelled
    ///
    /// Sweep failures are logged and retried on the next tick.
    pub async fn run(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Pending registration sweeper starting");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown_token.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.workflow.sweep_expired().await {
                        tracing::error!(error = %e, "Failed to sweep pending registrations");
                    }
                }
            }
        }

        tracing::info!("Pending registration sweeper stopped");
    }

    /// Runs the sweeper on its own task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::clock::ManualClock;
    use crate::registration::credentials::InMemoryCredentialStore;
    use crate::registration::notifier::RecordingNotifier;
    use crate::registration::pending::{InMemoryPendingStore, PendingRegistration, PendingStore};
    use crate::registration::workflow::RegistrationConfig;
    use chrono::Utc;

    fn staged(email: &str, issued_at: chrono::DateTime<Utc>) -> PendingRegistration {
        PendingRegistration {
            email: email.to_string(),
            name: "Ana".to_string(),
            phone: None,
            password_hash: "$argon2id$stub".to_string(),
            code: "123456".to_string(),
            issued_at,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_removes_expired_until_cancelled() {
        let now = Utc::now();
        let pending = Arc::new(InMemoryPendingStore::new());
        let clock = Arc::new(ManualClock::new(now));

        let workflow = Arc::new(
            RegistrationWorkflow::new(
                pending.clone(),
                Arc::new(InMemoryCredentialStore::new()),
                Arc::new(RecordingNotifier::new()),
                RegistrationConfig::default(),
            )
            .with_clock(clock.clone()),
        );

        pending
            .set(staged("old@x.com", now - chrono::Duration::minutes(15)))
            .await
            .unwrap();
        pending.set(staged("fresh@x.com", now)).await.unwrap();

        let sweeper = PendingSweeper::new(workflow, Duration::from_secs(60));
        let shutdown = sweeper.shutdown_token();
        let handle = sweeper.spawn();

        // First tick fires immediately
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(pending.get("old@x.com").await.unwrap().is_none());
        assert!(pending.get("fresh@x.com").await.unwrap().is_some());

        // The fresh record lapses and the next tick collects it
        clock.advance(chrono::Duration::minutes(11));
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(pending.is_empty().await);

        shutdown.cancel();
        handle.await.unwrap();
    }
}
