//! Redirect cache backends.
//!
//! Provides a [`CacheService`] trait with three implementations:
//! - [`RedisCache`] - shared Redis cache for multi-instance deployments
//! - [`MemoryCache`] - in-process Moka cache
//! - [`NullCache`] - no-op, caching disabled

mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

use std::sync::Arc;

use crate::config::Config;

pub use memory_cache::{DEFAULT_CAPACITY, MemoryCache};
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService, KEY_PREFIX, cache_key};

/// Builds the cache backend selected by the configuration.
///
/// A Redis connection failure degrades to the in-process cache rather than
/// failing startup.
pub async fn from_config(config: &Config) -> Arc<dyn CacheService> {
    if !config.cache_enabled {
        tracing::info!("Cache disabled");
        return Arc::new(NullCache::new());
    }

    if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                return Arc::new(redis);
            }
            Err(e) => {
                tracing::warn!(
                    "{}. Falling back to in-process cache; links disabled from \
                     another process keep resolving here until their entry expires.",
                    e
                );
            }
        }
    }

    tracing::info!(
        "Cache enabled (in-process, capacity {})",
        config.cache_capacity
    );
    Arc::new(MemoryCache::new(
        config.cache_capacity,
        config.cache_ttl_seconds,
    ))
}

/// Builds a cache handle for a process that edits links behind a running
/// server, such as the admin CLI.
///
/// An eviction only reaches the server when both sides talk to the same
/// backend, so the in-process cache is refused here, including as a fallback
/// for an unreachable Redis.
///
/// # Errors
///
/// Returns [`CacheError::ConnectionError`] if caching is enabled and Redis is
/// not configured or not reachable.
pub async fn shared_from_config(config: &Config) -> CacheResult<Arc<dyn CacheService>> {
    if !config.cache_enabled {
        return Ok(Arc::new(NullCache::new()));
    }

    let Some(redis_url) = &config.redis_url else {
        return Err(CacheError::ConnectionError(
            "the redirect cache is process-local (no REDIS_URL); \
             entries cached by the server cannot be evicted from here"
                .to_string(),
        ));
    };

    let redis = RedisCache::connect(redis_url, config.cache_ttl_seconds).await?;
    Ok(Arc::new(redis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_config_without_redis_is_process_local() {
        let cache = from_config(&Config::for_tests()).await;

        assert_eq!(cache.backend(), "memory");
        assert!(!cache.is_shared());
    }

    #[tokio::test]
    async fn test_shared_cache_refuses_process_local_backend() {
        let result = shared_from_config(&Config::for_tests()).await;

        assert!(matches!(result, Err(CacheError::ConnectionError(_))));
    }

    #[tokio::test]
    async fn test_shared_cache_when_caching_disabled() {
        let mut config = Config::for_tests();
        config.cache_enabled = false;

        let cache = shared_from_config(&config).await.unwrap();

        assert_eq!(cache.backend(), "disabled");
        assert!(cache.is_shared());
    }
}
