/// Job listing model
///
/// Listings are seeded outside this service; the API only reads them.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE jobs (
///     id BIGINT PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     company VARCHAR(255) NOT NULL,
///     location VARCHAR(255) NOT NULL,
///     salary VARCHAR(128) NOT NULL,
///     timing VARCHAR(128) NOT NULL,
///     category VARCHAR(128) NOT NULL,
///     description TEXT NOT NULL,
///     requirements TEXT[] NOT NULL DEFAULT '{}',
///     eligibility TEXT[] NOT NULL DEFAULT '{}',
///     benefits TEXT[] NOT NULL DEFAULT '{}',
///     gender VARCHAR(32) NOT NULL DEFAULT 'Any',
///     age_limit VARCHAR(32) NOT NULL DEFAULT '18+',
///     tags TEXT[] NOT NULL DEFAULT '{}',
///     experience VARCHAR(128) NOT NULL,
///     education VARCHAR(128) NOT NULL,
///     job_type VARCHAR(64) NOT NULL,
///     is_urgent BOOLEAN NOT NULL DEFAULT FALSE,
///     is_new BOOLEAN NOT NULL DEFAULT FALSE,
///     is_remote BOOLEAN NOT NULL DEFAULT FALSE,
///     is_accessible BOOLEAN NOT NULL DEFAULT FALSE,
///     has_benefits BOOLEAN NOT NULL DEFAULT FALSE,
///     is_disability_friendly BOOLEAN NOT NULL DEFAULT FALSE,
///     posted_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use jobboard_shared::models::job::{Job, JobFilter};
/// # async fn example(pool: sqlx::PgPool) -> Result<(), sqlx::Error> {
/// let filter = JobFilter {
///     category: Some("Delivery".to_string()),
///     remote: Some(true),
///     ..Default::default()
/// };
/// let jobs = Job::list(&pool, &filter).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Page size when none is requested
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page a client may request
pub const MAX_PAGE_SIZE: i64 = 100;

const JOB_COLUMNS: &str = "id, title, company, location, salary, timing, category, description, \
     requirements, eligibility, benefits, gender, age_limit, tags, experience, education, \
     job_type, is_urgent, is_new, is_remote, is_accessible, has_benefits, \
     is_disability_friendly, posted_at";

/// Job listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,

    /// Working hours, e.g. "9 AM - 6 PM"
    pub timing: String,

    pub category: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub eligibility: Vec<String>,
    pub benefits: Vec<String>,

    /// "Any" unless the listing restricts it
    pub gender: String,

    /// e.g. "18+"
    pub age_limit: String,

    pub tags: Vec<String>,
    pub experience: String,
    pub education: String,
    pub job_type: String,
    pub is_urgent: bool,
    pub is_new: bool,
    pub is_remote: bool,
    pub is_accessible: bool,
    pub has_benefits: bool,
    pub is_disability_friendly: bool,
    pub posted_at: DateTime<Utc>,
}

/// Listing query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilter {
    /// Exact category
    pub category: Option<String>,

    /// Case-insensitive substring of the location
    pub location: Option<String>,

    pub remote: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl JobFilter {
    /// Requested page size clamped to `1..=MAX_PAGE_SIZE`
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Requested offset, never negative
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    fn location(&self) -> Option<&str> {
        self.location.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

impl Job {
    /// Lists jobs matching `filter`, newest first
    pub async fn list(pool: &PgPool, filter: &JobFilter) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {JOB_COLUMNS} FROM jobs \
             WHERE ($1::text IS NULL OR category = $1) \
               AND ($2::text IS NULL OR location ILIKE '%' || $2 || '%') \
               AND ($3::boolean IS NULL OR is_remote = $3) \
             ORDER BY posted_at DESC, id DESC \
             LIMIT $4 OFFSET $5"
        );

        sqlx::query_as::<_, Job>(&query)
            .bind(filter.category())
            .bind(filter.location())
            .bind(filter.remote)
            .bind(filter.limit())
            .bind(filter.offset())
            .fetch_all(pool)
            .await
    }

    /// Finds a job by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");

        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Counts all listings
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_paging_is_clamped() {
        let filter = JobFilter::default();
        assert_eq!(filter.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(filter.offset(), 0);

        let filter = JobFilter {
            limit: Some(10_000),
            offset: Some(-5),
            ..Default::default()
        };
        assert_eq!(filter.limit(), MAX_PAGE_SIZE);
        assert_eq!(filter.offset(), 0);

        let filter = JobFilter {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(filter.limit(), 1);
    }

    #[test]
    fn test_blank_text_filters_are_ignored() {
        let filter = JobFilter {
            category: Some("  ".to_string()),
            location: Some(" Pune ".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.category(), None);
        assert_eq!(filter.location(), Some("Pune"));
    }
}
