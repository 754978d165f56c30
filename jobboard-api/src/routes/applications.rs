/// Job application endpoints (require `Authorization: Bearer`)
///
/// - `POST /api/jobs/:id/apply`: submit an application
/// - `GET /api/applications`: the caller's applications
///
/// Resume files are not accepted here. Clients upload them elsewhere and
/// pass the returned reference as `resume_ref`.

use crate::{
    app::{AppState, AuthUser},
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use jobboard_shared::models::job_application::{CreateJobApplication, JobApplication};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Apply request
#[derive(Debug, Deserialize, Validate)]
pub struct ApplyRequest {
    #[serde(default, alias = "resume_path")]
    #[validate(length(min = 1, max = 1024, message = "Resume reference is required"))]
    pub resume_ref: String,

    pub cover_letter: Option<String>,
    pub interest_statement: Option<String>,

    #[serde(default)]
    pub availability: Vec<String>,
}

/// Apply response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApplyResponse {
    pub success: bool,
    pub message: String,
    pub application: JobApplication,
}

/// Application list response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApplicationListResponse {
    pub success: bool,
    pub applications: Vec<JobApplication>,
}

/// Submit an application
///
/// # Endpoint
///
/// ```text
/// POST /api/jobs/42/apply
/// Authorization: Bearer eyJ...
/// Content-Type: application/json
///
/// {
///   "resume_ref": "resumes/3f1c.pdf",
///   "cover_letter": "...",
///   "interest_statement": "...",
///   "availability": ["Weekdays", "Evenings"]
/// }
/// ```
///
/// # Errors
///
/// - `400 validation_error`: missing or blank resume reference
/// - `401 unauthorized`: missing or invalid token
/// - `404 not_found`: no such job
pub async fn apply(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(job_id): Path<i64>,
    payload: Result<Json<ApplyRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApplyResponse>)> {
    let Json(req) = payload?;
    req.validate()?;

    let data = CreateJobApplication {
        user_id: auth.user_id,
        job_id,
        resume_ref: req.resume_ref,
        cover_letter: req.cover_letter,
        interest_statement: req.interest_statement,
        availability: req.availability,
    }
    .normalized();

    if data.resume_ref.is_empty() {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "resume_ref".to_string(),
            message: "Resume reference is required".to_string(),
        }]));
    }

    let application = state.applications.submit(data).await?;

    tracing::info!(
        user_id = %auth.user_id,
        job_id = job_id,
        application_id = %application.id,
        "Job application submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApplyResponse {
            success: true,
            message: "Application submitted".to_string(),
            application,
        }),
    ))
}

/// The caller's applications, newest first
pub async fn list_applications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<ApplicationListResponse>> {
    let applications = state.applications.list_for_user(auth.user_id).await?;

    Ok(Json(ApplicationListResponse {
        success: true,
        applications,
    }))
}
