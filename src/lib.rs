//! # l1nkzip
//!
//! A URL shortener with reversible, non-sequential short codes, built with
//! Axum and SQLx.
//!
//! Short codes are never stored: each one is a bijective transform of the
//! link's row id, so a code decodes straight to a primary-key lookup.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Codec, link entities, repository and gate traits
//! - **Application Layer** ([`application`]) - Link store and lookup orchestration
//! - **Infrastructure Layer** ([`infrastructure`]) - Databases, caches, phishing list, metrics
//! - **API Layer** ([`api`]) - REST handlers, DTOs, and middleware
//!
//! ## Features
//!
//! - Deterministic, collision-free short codes over a configurable alphabet
//! - Idempotent shortening: one active link per normalized URL
//! - Cache-then-store redirects with deferred visit counting
//! - PostgreSQL or SQLite, Redis or in-process cache
//! - Phishing gate on creation and resolution
//!
//! ## Quick Start
//!
//! ```bash
//! export DATABASE_URL="sqlite://l1nkzip.sqlite"
//! export REDIS_URL="redis://localhost:6379"  # Optional
//!
//! # Migrations are applied at startup
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        Insertion, LinkService, RedirectService, RedirectSettings,
    };
    pub use crate::domain::codec::Codec;
    pub use crate::domain::entities::{Link, LinkRecord, ShortLink};
    pub use crate::domain::events::{LinkEvent, LinkEventSink};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
