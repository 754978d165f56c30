/// Redis integration
///
/// Only used when pending registrations are shared between API instances
/// (`PENDING_STORE=redis`). Keys:
///
/// ```text
/// pending_registration:{email}  JSON PendingRegistration, SETEX retention
/// ```

pub mod client;

pub use client::{RedisClient, RedisClientError, RedisConfig};
