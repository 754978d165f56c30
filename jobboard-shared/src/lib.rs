//! # Job Board Shared Library
//!
//! Domain logic used by the job board API server.
//!
//! ## Module Organization
//!
//! - `registration`: OTP-gated registration workflow and its stores
//! - `applications`: job application store
//! - `auth`: password hashing and session tokens
//! - `db`: connection pool and migrations
//! - `models`: database rows and queries
//! - `redis`: Redis client for the shared pending store

pub mod applications;
pub mod auth;
pub mod db;
pub mod models;
pub mod redis;
pub mod registration;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
