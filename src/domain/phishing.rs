//! Phishing gate contract.
//!
//! The gate is consulted before a link is created and again when it is
//! resolved. How the phishing list is obtained and refreshed is outside this
//! crate; implementations only answer membership queries.

use async_trait::async_trait;

/// Decides whether a URL is a known phishing target.
///
/// # Implementations
///
/// - [`crate::infrastructure::phishing::BlocklistGate`] - in-memory URL set
/// - [`crate::infrastructure::phishing::NullGate`] - always `false` (gate disabled)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhishingGate: Send + Sync {
    /// Returns true if `url` (already normalized) is listed.
    async fn is_phishing(&self, url: &str) -> bool;
}
