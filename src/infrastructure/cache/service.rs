//! Cache service trait and error types.

use async_trait::async_trait;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Key namespace for redirect entries.
pub const KEY_PREFIX: &str = "redirect:";

/// Builds the cache key for a short code.
pub fn cache_key(code: &str) -> String {
    format!("{}{}", KEY_PREFIX, code)
}

/// Short code -> target URL cache in front of the link store.
///
/// The cache is a best-effort accelerator. Callers treat every error as a
/// miss, so redirect results never depend on cache availability.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - shared Redis cache
/// - [`crate::infrastructure::cache::MemoryCache`] - in-process Moka cache
/// - [`crate::infrastructure::cache::NullCache`] - caching disabled
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the cached target URL for `short_code`.
    ///
    /// `Ok(None)` means the entry was never populated or has expired.
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>>;

    /// Stores a mapping, replacing any existing entry and restarting its TTL.
    ///
    /// `ttl_seconds = None` applies the backend's configured default.
    async fn set_url(
        &self,
        short_code: &str,
        original_url: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Removes a mapping. Removing a missing entry is not an error.
    async fn invalidate(&self, short_code: &str) -> CacheResult<()>;

    /// Checks if the cache backend is reachable.
    async fn health_check(&self) -> bool;

    /// Backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// Whether another process can invalidate entries this instance serves.
    ///
    /// False for process-local backends: an eviction issued elsewhere never
    /// reaches them.
    fn is_shared(&self) -> bool {
        true
    }
}
