//! Infrastructure layer for external integrations.
//!
//! Concrete implementations of the contracts defined in [`crate::domain`].
//!
//! # Modules
//!
//! - [`cache`] - Redirect cache backends (Redis, in-process, disabled)
//! - [`persistence`] - PostgreSQL and SQLite link repositories
//! - [`phishing`] - Phishing gate backends
//! - [`telemetry`] - Metrics-backed event sink

pub mod cache;
pub mod persistence;
pub mod phishing;
pub mod telemetry;
