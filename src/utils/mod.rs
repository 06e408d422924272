//! Shared helpers.
//!
//! - [`url_normalizer`] - canonical form for target URLs

pub mod url_normalizer;
