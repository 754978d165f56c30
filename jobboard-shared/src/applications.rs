/// Application store: where submitted job applications are kept
///
/// The API submits through this trait so handlers can run against Postgres
/// or the in-memory store used in tests. `submit` reports a missing job as
/// [`ApplicationStoreError::UnknownJob`] rather than a generic failure.

use crate::models::job_application::{ApplicationStatus, CreateJobApplication, JobApplication};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashSet;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Postgres SQLSTATE for foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

const JOB_FOREIGN_KEY: &str = "job_applications_job_id_fkey";

/// Application store errors
#[derive(Error, Debug)]
pub enum ApplicationStoreError {
    /// No job listing with this ID
    #[error("Job {0} not found")]
    UnknownJob(i64),

    /// Any other storage failure
    #[error("Application store error: {0}")]
    Database(String),
}

/// Persistence for job applications
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Records an application in the `In Review` state
    async fn submit(&self, data: CreateJobApplication)
        -> Result<JobApplication, ApplicationStoreError>;

    /// Applications of one account, newest first
    async fn list_for_user(&self, user_id: Uuid)
        -> Result<Vec<JobApplication>, ApplicationStoreError>;
}

/// Application store backed by the `job_applications` table
#[derive(Debug, Clone)]
pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn submit(
        &self,
        data: CreateJobApplication,
    ) -> Result<JobApplication, ApplicationStoreError> {
        let job_id = data.job_id;

        JobApplication::create(&self.pool, data)
            .await
            .map_err(|err| {
                if let sqlx::Error::Database(db_err) = &err {
                    if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION)
                        && db_err.constraint() == Some(JOB_FOREIGN_KEY)
                    {
                        return ApplicationStoreError::UnknownJob(job_id);
                    }
                }
                ApplicationStoreError::Database(err.to_string())
            })
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<JobApplication>, ApplicationStoreError> {
        JobApplication::list_for_user(&self.pool, user_id)
            .await
            .map_err(|e| ApplicationStoreError::Database(e.to_string()))
    }
}

/// Process-local application store
///
/// Only the job IDs it was built with are accepted.
#[derive(Debug, Default)]
pub struct InMemoryApplicationStore {
    jobs: HashSet<i64>,
    applications: RwLock<Vec<JobApplication>>,
}

impl InMemoryApplicationStore {
    /// Creates a store that knows the listings in `job_ids`
    pub fn with_jobs(job_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            jobs: job_ids.into_iter().collect(),
            applications: RwLock::new(Vec::new()),
        }
    }

    /// Number of stored applications
    pub async fn len(&self) -> usize {
        self.applications.read().await.len()
    }

    /// Returns true when nothing has been submitted
    pub async fn is_empty(&self) -> bool {
        self.applications.read().await.is_empty()
    }
}

#[async_trait]
impl ApplicationStore for InMemoryApplicationStore {
    async fn submit(
        &self,
        data: CreateJobApplication,
    ) -> Result<JobApplication, ApplicationStoreError> {
        if !self.jobs.contains(&data.job_id) {
            return Err(ApplicationStoreError::UnknownJob(data.job_id));
        }

        let now = Utc::now();
        let application = JobApplication {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            job_id: data.job_id,
            resume_ref: data.resume_ref,
            cover_letter: data.cover_letter,
            interest_statement: data.interest_statement,
            availability: data.availability,
            status: ApplicationStatus::InReview,
            created_at: now,
            updated_at: now,
        };

        self.applications.write().await.push(application.clone());
        Ok(application)
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<JobApplication>, ApplicationStoreError> {
        Ok(self
            .applications
            .read()
            .await
            .iter()
            .rev()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }
}
