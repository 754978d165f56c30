#![allow(dead_code)]

/// Common test utilities for API tests
///
/// Builds the full router over in-memory stores, a recording notifier and a
/// manual clock. Jobs 1 and 2 exist for applications. The database pool is lazy and never reachable, so only the
/// routes that stay off Postgres are exercised here.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{TimeZone, Utc};
use jobboard_api::{
    app::{build_router, AppState},
    config::Config,
};
use jobboard_shared::{
    applications::InMemoryApplicationStore,
    db::pool::{create_lazy_pool, DatabaseConfig},
    registration::{
        InMemoryCredentialStore, InMemoryPendingStore, ManualClock, RecordingNotifier,
        RegistrationWorkflow, SequenceCodeGenerator,
    },
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Router plus handles on its collaborators
pub struct TestContext {
    pub app: Router,
    pub pending: Arc<InMemoryPendingStore>,
    pub accounts: Arc<InMemoryCredentialStore>,
    pub applications: Arc<InMemoryApplicationStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<ManualClock>,
}

impl TestContext {
    /// Codes are handed out in order: 111111, 222222, 333333, ...
    pub fn new() -> Self {
        Self::with_config(Config::for_tests())
    }

    /// Same as [`TestContext::new`] with a caller-supplied configuration
    pub fn with_config(config: Config) -> Self {

        let db = create_lazy_pool(&DatabaseConfig {
            max_connections: 1,
            min_connections: 0,
            connect_timeout_seconds: 1,
            ..DatabaseConfig::new(config.database.url.clone())
        })
        .expect("lazy pool");

        let pending = Arc::new(InMemoryPendingStore::new());
        let accounts = Arc::new(InMemoryCredentialStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap(),
        ));

        let workflow = RegistrationWorkflow::new(
            pending.clone(),
            accounts.clone(),
            notifier.clone(),
            config.registration_config(),
        )
        .with_clock(clock.clone())
        .with_code_generator(Arc::new(SequenceCodeGenerator::new([
            "111111", "222222", "333333", "444444",
        ])));

        let applications = Arc::new(InMemoryApplicationStore::with_jobs([1, 2]));
        let state = AppState::new(db, config, workflow).with_applications(applications.clone());
        let app = build_router(state);

        Self {
            app,
            pending,
            accounts,
            applications,
            notifier,
            clock,
        }
    }

    /// POSTs a JSON body and returns the status and parsed response
    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.post_raw(uri, body.to_string()).await
    }

    /// POSTs an arbitrary body with a JSON content type
    pub async fn post_raw(&self, uri: &str, body: String) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// POSTs a JSON body with a Bearer token
    pub async fn post_authed(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// GETs `uri`, optionally with a Bearer token
    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Sends a prepared request and returns the raw response
    pub async fn raw(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.raw(request).await;
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                panic!("non-JSON body ({}): {}", status, String::from_utf8_lossy(&body))
            })
        };
        (status, json)
    }

    /// Registers `email` and returns the code that was sent
    pub async fn register(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/api/register",
                serde_json::json!({
                    "name": "Ana",
                    "email": email,
                    "phone": "555-0100",
                    "password": password,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {}", body);
        self.notifier.last_code_to(email).expect("code was sent")
    }

    /// Registers, verifies and logs in `email`; returns the access token
    pub async fn sign_in(&self, email: &str) -> String {
        let code = self.register(email, "pw1").await;
        let (status, body) = self
            .post("/api/verify-otp", serde_json::json!({ "email": email, "otp": code }))
            .await;
        assert_eq!(status, StatusCode::OK, "verify failed: {}", body);

        let (status, body) = self
            .post("/api/login", serde_json::json!({ "email": email, "password": "pw1" }))
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["access_token"].as_str().unwrap().to_string()
    }
}
