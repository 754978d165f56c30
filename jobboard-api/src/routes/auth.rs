/// Session endpoints for confirmed accounts
///
/// - `POST /api/login`: exchange email and password for tokens
/// - `POST /api/refresh`: exchange a refresh token for a new access token
/// - `GET /api/me`: current account (requires `Authorization: Bearer`)

use crate::{
    app::{AppState, AuthUser},
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use jobboard_shared::{
    auth::{jwt, password},
    models::user::UserProfile,
    registration::normalize_email,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: UserProfile,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub success: bool,

    /// New access token (24h)
    pub access_token: String,
}

/// Current account response
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: UserProfile,
}

/// Login with email and password
///
/// # Endpoint
///
/// ```text
/// POST /api/login
/// Content-Type: application/json
///
/// { "email": "ana@x.com", "password": "pw1" }
/// ```
///
/// # Errors
///
/// - `400 validation_error`: missing field
/// - `401 unauthorized`: unknown email or wrong password (same message for both)
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let email = normalize_email(&req.email);
    let user = state
        .accounts()
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    let valid = password::verify_password_async(req.password, user.password_hash.clone()).await?;
    if !valid {
        tracing::info!(email = %email, "Login failed: wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    state.accounts().record_login(user.id).await?;
    let tokens = jwt::issue_token_pair(user.id, &user.email, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        success: true,
        user: user.profile(),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
    }))
}

/// Refresh the access token
///
/// # Endpoint
///
/// ```text
/// POST /api/refresh
/// Content-Type: application/json
///
/// { "refresh_token": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `401 unauthorized`: invalid, expired, or access token supplied
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<Json<RefreshResponse>> {
    let Json(req) = payload?;

    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse {
        success: true,
        access_token,
    }))
}

/// Current account
///
/// # Errors
///
/// - `401 unauthorized`: missing or invalid token
/// - `404 not_found`: account no longer exists
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<MeResponse>> {
    let user = state
        .accounts()
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    Ok(Json(MeResponse {
        success: true,
        user: user.profile(),
    }))
}
