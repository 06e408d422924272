//! Core domain entities.
//!
//! Entities are plain data structures; persistence mechanics live behind the
//! repository traits in [`crate::domain::repositories`].
//!
//! - [`LinkRecord`] - a stored link row (no code column)
//! - [`Link`] - a link with its recomputed short code
//! - [`ShortLink`] - a link plus its absolute short URL

pub mod link;

pub use link::{Link, LinkRecord, ShortLink};
