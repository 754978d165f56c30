/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use jobboard_api::{app, config::Config};
/// use jobboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig::new(config.database.url.clone())).await?;
/// let state = app::build_state(config, pool).await?;
/// let router = app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::{Config, PendingStoreConfig},
    error::ApiError,
    middleware::security::SecurityHeadersLayer,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use jobboard_shared::{
    applications::{ApplicationStore, PgApplicationStore},
    auth::jwt,
    redis::{RedisClient, RedisConfig},
    registration::{
        CredentialStore, HttpMailer, LogNotifier, Notifier, PendingStore, PgCredentialStore,
        RedisPendingStore, RegistrationWorkflow,
    },
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;

/// Shared application state
///
/// Cloned into every handler; all fields are reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (jobs, health)
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Registration workflow, owning the pending store
    pub registration: Arc<RegistrationWorkflow>,

    /// Job applications
    pub applications: Arc<dyn ApplicationStore>,
}

impl AppState {
    /// Applications go to Postgres on `db` unless replaced with
    /// [`AppState::with_applications`]
    pub fn new(db: PgPool, config: Config, registration: RegistrationWorkflow) -> Self {
        Self {
            applications: Arc::new(PgApplicationStore::new(db.clone())),
            db,
            config: Arc::new(config),
            registration: Arc::new(registration),
        }
    }

    pub fn with_applications(mut self, applications: Arc<dyn ApplicationStore>) -> Self {
        self.applications = applications;
        self
    }

    /// Confirmed accounts, shared with the registration workflow
    pub fn accounts(&self) -> &Arc<dyn CredentialStore> {
        self.registration.credential_store()
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Authenticated caller, inserted by the JWT layer
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Wires the production collaborators selected by `config`
///
/// - Postgres credential store on `db`
/// - In-memory or Redis pending store
/// - HTTP mailer, or the logging notifier when no mail API is configured
pub async fn build_state(config: Config, db: PgPool) -> anyhow::Result<AppState> {
    let credentials: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(db.clone()));

    let pending: Arc<dyn PendingStore> = match &config.pending_store {
        PendingStoreConfig::Memory => {
            tracing::info!("Using in-memory pending registration store");
            Arc::new(jobboard_shared::registration::InMemoryPendingStore::new())
        }
        PendingStoreConfig::Redis { url } => {
            let client = RedisClient::new(RedisConfig::new(url.clone())).await?;
            // Keep abandoned records a little past the code lifetime
            let retention =
                std::time::Duration::from_secs(config.registration.otp_ttl_secs.unsigned_abs() * 2);
            tracing::info!("Using Redis pending registration store");
            Arc::new(RedisPendingStore::new(client, retention))
        }
    };

    let notifier: Arc<dyn Notifier> = match config.mailer_config() {
        Some(mailer) => Arc::new(HttpMailer::new(
            mailer,
            std::time::Duration::from_secs(config.registration.notify_timeout_secs),
        )?),
        None => {
            tracing::warn!("MAIL_API_URL not set; verification codes will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let workflow =
        RegistrationWorkflow::new(pending, credentials, notifier, config.registration_config());

    Ok(AppState::new(db, config, workflow))
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /health                      GET   service health (public)
/// /api/register                POST  stage registration, send code
/// /api/verify-otp              POST  confirm code, create account
/// /api/resend-otp              POST  send a fresh code
/// /api/login                   POST  password login, issue tokens
/// /api/refresh                 POST  refresh access token
/// /api/me                      GET   current account (Bearer token)
/// /api/jobs                    GET   list jobs
/// /api/jobs/:id                GET   one job
/// /api/jobs/:id/apply          POST  apply to a job (Bearer token)
/// /api/applications            GET   caller's applications (Bearer token)
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let protected_routes = Router::new()
        .route("/me", get(routes::auth::me))
        .route("/jobs/:id/apply", post(routes::applications::apply))
        .route("/applications", get(routes::applications::list_applications))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new()
        .route("/register", post(routes::registration::register))
        .route("/verify-otp", post(routes::registration::verify_otp))
        .route("/resend-otp", post(routes::registration::resend_otp))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/jobs", get(routes::jobs::list_jobs))
        .route("/jobs/:id", get(routes::jobs::get_job))
        .merge(protected_routes);

    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins = &config.api.cors_origins;
    let wildcard = origins.iter().any(|o| o == "*");

    if (origins.is_empty() || wildcard) && !config.api.production {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Validates the Bearer access token and stores [`AuthUser`] in the request
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Expected Bearer token".to_string()))?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    req.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
        email: claims.email,
    });

    Ok(next.run(req).await)
}
