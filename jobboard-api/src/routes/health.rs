/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "pending_store": "memory: connected"
/// }
/// ```
///
/// `status` is `degraded` when either dependency is unreachable; the
/// endpoint itself always answers 200.

use crate::app::AppState;
use axum::{extract::State, Json};
use jobboard_shared::db::pool::health_check as db_health_check;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub pending_store: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_ok = matches!(
        tokio::time::timeout(CHECK_TIMEOUT, db_health_check(&state.db)).await,
        Ok(Ok(()))
    );

    let pending = state.registration.pending_store();
    let pending_ok = matches!(
        tokio::time::timeout(CHECK_TIMEOUT, pending.ping()).await,
        Ok(Ok(()))
    );

    let describe = |ok: bool| if ok { "connected" } else { "disconnected" };

    Json(HealthResponse {
        status: if database_ok && pending_ok { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: describe(database_ok).to_string(),
        pending_store: format!("{}: {}", pending.name(), describe(pending_ok)),
    })
}
