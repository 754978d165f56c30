/// Database models
///
/// - `user`: confirmed accounts
/// - `job`: job listings (read-only)
/// - `job_application`: applications to listings
///
/// Pending registrations are not a table; they live in a pending store
/// (see `registration::pending`).
///
/// # Example
///
/// ```no_run
/// use jobboard_shared::models::user::User;
/// use jobboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::new(std::env::var("DATABASE_URL")?)).await?;
/// let user = User::find_by_email(&pool, "ana@x.com").await?;
/// # Ok(())
/// # }
/// ```

pub mod job;
pub mod job_application;
pub mod user;
