//! In-memory phishing blocklist.

use std::collections::HashSet;
use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::phishing::PhishingGate;
use crate::utils::url_normalizer::normalize_url;

/// Phishing gate answering from a set of normalized URLs.
///
/// The set can be swapped wholesale with [`BlocklistGate::replace`] by
/// whatever refreshes the list; readers never observe a partial update.
#[derive(Default)]
pub struct BlocklistGate {
    urls: RwLock<HashSet<String>>,
}

impl BlocklistGate {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            urls: RwLock::new(normalize_all(urls)),
        }
    }

    /// Loads a newline-separated URL list; blank lines and `#` comments are skipped.
    pub async fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let contents = tokio::fs::read_to_string(path.as_ref()).await?;
        let gate = Self::new(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        );
        info!(
            "Loaded {} phishing URLs from {}",
            gate.len(),
            path.as_ref().display()
        );
        Ok(gate)
    }

    /// Replaces the whole list.
    pub fn replace<I, S>(&self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fresh = normalize_all(urls);
        match self.urls.write() {
            Ok(mut guard) => *guard = fresh,
            Err(poisoned) => *poisoned.into_inner() = fresh,
        }
    }

    pub fn len(&self) -> usize {
        self.urls.read().map(|set| set.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn normalize_all<I, S>(urls: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    urls.into_iter()
        .filter_map(|url| match normalize_url(url.as_ref()) {
            Ok(normalized) => Some(normalized),
            Err(e) => {
                warn!("Skipping blocklist entry {:?}: {}", url.as_ref(), e);
                None
            }
        })
        .collect()
}

#[async_trait]
impl PhishingGate for BlocklistGate {
    async fn is_phishing(&self, url: &str) -> bool {
        match self.urls.read() {
            Ok(set) => set.contains(url),
            Err(poisoned) => poisoned.into_inner().contains(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listed_url_is_phishing() {
        let gate = BlocklistGate::new(["https://phish.example/login"]);

        assert!(gate.is_phishing("https://phish.example/login").await);
        assert!(!gate.is_phishing("https://example.com/").await);
    }

    #[tokio::test]
    async fn test_entries_are_normalized() {
        let gate = BlocklistGate::new(["HTTPS://PHISH.EXAMPLE:443/login#top"]);

        assert!(gate.is_phishing("https://phish.example/login").await);
    }

    #[tokio::test]
    async fn test_invalid_entries_are_skipped() {
        let gate = BlocklistGate::new(["not a url", "https://phish.example/"]);

        assert_eq!(gate.len(), 1);
    }

    #[tokio::test]
    async fn test_replace_swaps_list() {
        let gate = BlocklistGate::new(["https://old.example/"]);
        gate.replace(["https://new.example/"]);

        assert!(!gate.is_phishing("https://old.example/").await);
        assert!(gate.is_phishing("https://new.example/").await);
    }

    #[tokio::test]
    async fn test_from_file_skips_comments() {
        let path = std::env::temp_dir().join(format!("l1nkzip-blocklist-{}.txt", std::process::id()));
        tokio::fs::write(&path, "# phishing\n\nhttps://phish.example/\n")
            .await
            .unwrap();

        let gate = BlocklistGate::from_file(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(gate.len(), 1);
        assert!(gate.is_phishing("https://phish.example/").await);
    }
}
