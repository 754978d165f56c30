/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: HS256 access and refresh tokens
///
/// # Example
///
/// ```no_run
/// use jobboard_shared::auth::password::{hash_password, verify_password};
/// use jobboard_shared::auth::jwt::issue_token_pair;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("pw1")?;
/// assert!(verify_password("pw1", &hash)?);
///
/// let tokens = issue_token_pair(Uuid::new_v4(), "ana@x.com", "secret-key-at-least-32-bytes-long")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod password;
