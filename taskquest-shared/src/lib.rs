//! # TaskQuest Shared Library
//!
//! This crate contains the data layer and business rules used by the
//! TaskQuest API server.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and migrations
//! - `auth`: Passwords, JWTs, email tokens and the request auth context
//! - `models`: Database models, their payloads and schema descriptors
//! - `query`: Owner-scoped search and pagination query construction
//! - `repository`: Generic reads shared by every resource
//! - `service`: Generic CRUD service and its error type
//! - `mailer`: Outgoing account emails

pub mod auth;
pub mod db;
pub mod mailer;
pub mod models;
pub mod query;
pub mod repository;
pub mod service;

/// Current version of the TaskQuest shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
