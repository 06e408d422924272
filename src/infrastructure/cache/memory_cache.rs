//! In-process cache backed by Moka.

use std::time::{Duration, Instant};

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use tracing::{debug, trace};

/// Default number of entries kept in process.
pub const DEFAULT_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
struct CachedUrl {
    url: String,
    ttl: Duration,
}

/// Gives every entry the TTL it was stored with.
struct PerEntryTtl;

impl Expiry<String, CachedUrl> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedUrl,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedUrl,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Single-node redirect cache.
///
/// Used when caching is enabled but no Redis is configured, or when Redis is
/// unreachable at startup. Entries are bounded by count and expire after
/// their individual TTL.
#[derive(Clone)]
pub struct MemoryCache {
    cache: Cache<String, CachedUrl>,
    default_ttl: Duration,
}

impl MemoryCache {
    pub fn new(max_capacity: u64, default_ttl_seconds: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self {
            cache,
            default_ttl: Duration::from_secs(default_ttl_seconds),
        }
    }

    fn ttl(&self, ttl_seconds: Option<u64>) -> Duration {
        ttl_seconds.map_or(self.default_ttl, Duration::from_secs)
    }

    async fn insert(&self, short_code: &str, original_url: &str, ttl: Duration) {
        self.cache
            .insert(
                short_code.to_string(),
                CachedUrl {
                    url: original_url.to_string(),
                    ttl,
                },
            )
            .await;
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        match self.cache.get(short_code).await {
            Some(entry) => {
                trace!("Memory cache HIT for {}", short_code);
                Ok(Some(entry.url))
            }
            None => {
                trace!("Memory cache MISS for {}", short_code);
                Ok(None)
            }
        }
    }

    async fn set_url(
        &self,
        short_code: &str,
        original_url: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let ttl = self.ttl(ttl_seconds);
        self.insert(short_code, original_url, ttl).await;
        debug!("Memory cache SET {} (TTL: {}s)", short_code, ttl.as_secs());
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        self.cache.invalidate(short_code).await;
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }

    fn is_shared(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new(100, 60);

        assert!(cache.get_url("5wppq").await.unwrap().is_none());

        cache
            .set_url("5wppq", "https://example.com/", None)
            .await
            .unwrap();

        assert_eq!(
            cache.get_url("5wppq").await.unwrap().as_deref(),
            Some("https://example.com/")
        );
    }

    #[tokio::test]
    async fn test_overwrite_replaces_url() {
        let cache = MemoryCache::new(100, 60);

        cache
            .set_url("5wppq", "https://old.example/", None)
            .await
            .unwrap();
        cache
            .set_url("5wppq", "https://new.example/", None)
            .await
            .unwrap();

        assert_eq!(
            cache.get_url("5wppq").await.unwrap().as_deref(),
            Some("https://new.example/")
        );
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let cache = MemoryCache::new(100, 60);

        cache
            .set_url("5wppq", "https://example.com/", None)
            .await
            .unwrap();
        cache.invalidate("5wppq").await.unwrap();
        cache.invalidate("5wppq").await.unwrap();

        assert!(cache.get_url("5wppq").await.unwrap().is_none());
    }

    #[test]
    fn test_memory_cache_is_process_local() {
        assert!(!MemoryCache::new(10, 60).is_shared());
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = MemoryCache::new(100, 60);

        cache
            .insert("5wppq", "https://example.com/", Duration::from_millis(50))
            .await;
        assert!(cache.get_url("5wppq").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(cache.get_url("5wppq").await.unwrap().is_none());
    }
}
