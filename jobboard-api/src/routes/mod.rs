/// API route handlers
///
/// - `health`: service health
/// - `registration`: register, verify-otp, resend-otp
/// - `auth`: login, refresh, me
/// - `jobs`: job listings
/// - `applications`: job applications (authenticated)

pub mod applications;
pub mod auth;
pub mod health;
pub mod jobs;
pub mod registration;
