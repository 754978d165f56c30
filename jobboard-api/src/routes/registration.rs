/// Registration endpoints
///
/// - `POST /api/register`: stage a registration and email a 6-digit code
/// - `POST /api/verify-otp`: confirm the code and create the account
/// - `POST /api/resend-otp`: send a fresh code for a staged registration
///
/// Missing fields are reported as `400 validation_error`. Workflow outcomes
/// map to the error codes of [`RegistrationError`](jobboard_shared::registration::RegistrationError).

use crate::{app::AppState, error::ApiResult};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use jobboard_shared::models::user::UserProfile;
use jobboard_shared::registration::RegistrationRequest;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Email is required"))]
    pub email: String,

    pub phone: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Verify request
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "OTP is required"))]
    pub otp: String,
}

/// Resend request
#[derive(Debug, Deserialize, Validate)]
pub struct ResendOtpRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
}

/// Body of a successful register or resend
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Body of a successful verification
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyOtpResponse {
    pub success: bool,
    pub message: String,
    pub user: UserProfile,
}

/// Stage a registration
///
/// # Endpoint
///
/// ```text
/// POST /api/register
/// Content-Type: application/json
///
/// { "name": "Ana", "email": "ana@x.com", "phone": "555-0100", "password": "pw1" }
/// ```
///
/// # Response
///
/// ```json
/// { "success": true, "message": "Verification code sent to ana@x.com" }
/// ```
///
/// # Errors
///
/// - `400 validation_error`: missing name, email or password
/// - `400 duplicate_account`: email already registered
/// - `500 notification_failed`: code could not be sent; retry with resend
/// - `500`: server error
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let email = jobboard_shared::registration::normalize_email(&req.email);

    state
        .registration
        .request_registration(RegistrationRequest {
            name: req.name,
            email: req.email,
            phone: req.phone,
            password: req.password,
        })
        .await?;

    Ok(Json(MessageResponse {
        success: true,
        message: format!("Verification code sent to {}", email),
    }))
}

/// Confirm a registration
///
/// # Endpoint
///
/// ```text
/// POST /api/verify-otp
/// Content-Type: application/json
///
/// { "email": "ana@x.com", "otp": "482913" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "message": "Registration complete",
///   "user": { "id": "uuid", "name": "Ana", "email": "ana@x.com", "phone": null }
/// }
/// ```
///
/// # Errors
///
/// - `400 no_pending_registration`, `code_expired`, `invalid_code`,
///   `duplicate_account`
/// - `500 account_creation_failed`: store failure; the code stays valid
pub async fn verify_otp(
    State(state): State<AppState>,
    payload: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> ApiResult<Json<VerifyOtpResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let user = state
        .registration
        .verify_registration(&req.email, &req.otp)
        .await?;

    Ok(Json(VerifyOtpResponse {
        success: true,
        message: "Registration complete".to_string(),
        user,
    }))
}

/// Send a new code
///
/// # Endpoint
///
/// ```text
/// POST /api/resend-otp
/// Content-Type: application/json
///
/// { "email": "ana@x.com" }
/// ```
///
/// # Errors
///
/// - `400 no_pending_registration`, `code_expired`
/// - `500 notification_failed`
pub async fn resend_otp(
    State(state): State<AppState>,
    payload: Result<Json<ResendOtpRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    state.registration.resend_code(&req.email).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "A new verification code has been sent".to_string(),
    }))
}
