/// Job listing endpoints
///
/// - `GET /api/jobs?category=&location=&remote=&limit=&offset=`
/// - `GET /api/jobs/:id`

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use jobboard_shared::models::job::{Job, JobFilter};
use serde::{Deserialize, Serialize};

/// Job list response
#[derive(Debug, Serialize, Deserialize)]
pub struct JobListResponse {
    pub success: bool,
    pub jobs: Vec<Job>,
    pub limit: i64,
    pub offset: i64,
}

/// Single job response
#[derive(Debug, Serialize, Deserialize)]
pub struct JobResponse {
    pub success: bool,
    pub job: Job,
}

/// Lists jobs, newest first
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(filter): Query<JobFilter>,
) -> ApiResult<Json<JobListResponse>> {
    let jobs = Job::list(&state.db, &filter).await?;

    Ok(Json(JobListResponse {
        success: true,
        jobs,
        limit: filter.limit(),
        offset: filter.offset(),
    }))
}

/// Fetches one job
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<JobResponse>> {
    let job = Job::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Job {} not found", id)))?;

    Ok(Json(JobResponse { success: true, job }))
}
