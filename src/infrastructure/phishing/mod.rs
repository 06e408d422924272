//! Phishing gate backends.
//!
//! - [`BlocklistGate`] - in-memory set of listed URLs
//! - [`NullGate`] - gate disabled, nothing is listed

mod blocklist;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;

use crate::config::Config;
use crate::domain::phishing::PhishingGate;

pub use blocklist::BlocklistGate;

/// Gate that lets every URL through.
pub struct NullGate;

#[async_trait]
impl PhishingGate for NullGate {
    async fn is_phishing(&self, _url: &str) -> bool {
        false
    }
}

/// Builds the phishing gate selected by the configuration.
///
/// # Errors
///
/// Fails if `PHISHING_BLOCKLIST_PATH` is set but cannot be read.
pub async fn from_config(config: &Config) -> anyhow::Result<Arc<dyn PhishingGate>> {
    if !config.phishing_enabled {
        tracing::info!("Phishing gate disabled");
        return Ok(Arc::new(NullGate));
    }

    let gate = match &config.phishing_blocklist_path {
        Some(path) => BlocklistGate::from_file(path)
            .await
            .with_context(|| format!("Failed to read phishing blocklist {}", path))?,
        None => {
            tracing::info!("Phishing gate enabled with an empty blocklist");
            BlocklistGate::default()
        }
    };

    Ok(Arc::new(gate))
}
