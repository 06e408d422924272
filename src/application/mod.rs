//! Application layer services.
//!
//! Services consume the domain contracts and expose the operations used by
//! the HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Deduplicated link store over a repository and codec
//! - [`services::redirect_service::RedirectService`] - Creation, cache-then-store resolution, link info

pub mod services;
