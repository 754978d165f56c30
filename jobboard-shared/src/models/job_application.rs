/// Job application model and database operations
///
/// An application links a confirmed account to a job listing. The resume is
/// uploaded and stored by another service; this row only keeps the opaque
/// reference (`resume_ref`) that service handed back.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE application_status AS ENUM ('In Review', 'Under Review', 'Accepted', 'Rejected');
///
/// CREATE TABLE job_applications (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
///     job_id BIGINT NOT NULL REFERENCES jobs (id) ON DELETE CASCADE,
///     resume_ref VARCHAR(1024) NOT NULL,
///     cover_letter TEXT,
///     interest_statement TEXT,
///     availability TEXT[] NOT NULL DEFAULT '{}',
///     status application_status NOT NULL DEFAULT 'In Review',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const APPLICATION_COLUMNS: &str = "id, user_id, job_id, resume_ref, cover_letter, \
     interest_statement, availability, status, created_at, updated_at";

/// Review state of an application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status")]
pub enum ApplicationStatus {
    #[default]
    #[sqlx(rename = "In Review")]
    #[serde(rename = "In Review")]
    InReview,

    #[sqlx(rename = "Under Review")]
    #[serde(rename = "Under Review")]
    UnderReview,

    Accepted,
    Rejected,
}

/// Submitted job application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobApplication {
    pub id: Uuid,

    /// Applicant (confirmed account)
    pub user_id: Uuid,

    pub job_id: i64,

    /// Where the resume lives, e.g. an object-store key
    pub resume_ref: String,

    pub cover_letter: Option<String>,
    pub interest_statement: Option<String>,

    /// Free-form availability slots, e.g. "Weekdays"
    pub availability: Vec<String>,

    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for submitting an application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateJobApplication {
    pub user_id: Uuid,
    pub job_id: i64,
    pub resume_ref: String,
    pub cover_letter: Option<String>,
    pub interest_statement: Option<String>,
    pub availability: Vec<String>,
}

impl CreateJobApplication {
    /// Trims free-text fields; blank optional text becomes `None` and blank
    /// availability entries are dropped
    pub fn normalized(self) -> Self {
        fn text(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            user_id: self.user_id,
            job_id: self.job_id,
            resume_ref: self.resume_ref.trim().to_string(),
            cover_letter: text(self.cover_letter),
            interest_statement: text(self.interest_statement),
            availability: self
                .availability
                .into_iter()
                .map(|slot| slot.trim().to_string())
                .filter(|slot| !slot.is_empty())
                .collect(),
        }
    }
}

impl JobApplication {
    /// Inserts an application in the `In Review` state
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error::Database` with constraint
    /// `job_applications_job_id_fkey` if the job does not exist.
    pub async fn create(pool: &PgPool, data: CreateJobApplication) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO job_applications \
             (user_id, job_id, resume_ref, cover_letter, interest_statement, availability) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {APPLICATION_COLUMNS}"
        );

        sqlx::query_as::<_, JobApplication>(&query)
            .bind(data.user_id)
            .bind(data.job_id)
            .bind(data.resume_ref)
            .bind(data.cover_letter)
            .bind(data.interest_statement)
            .bind(data.availability)
            .fetch_one(pool)
            .await
    }

    /// Lists the applications of one account, newest first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {APPLICATION_COLUMNS} FROM job_applications \
             WHERE user_id = $1 \
             ORDER BY created_at DESC"
        );

        sqlx::query_as::<_, JobApplication>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
