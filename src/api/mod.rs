//! REST API layer for HTTP request/response handling.
//!
//! A thin adapter: handlers translate HTTP into
//! [`crate::application::services::RedirectService`] calls and back.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Request tracing

pub mod dto;
pub mod handlers;
pub mod middleware;
