//! Repository trait for link persistence.

use crate::domain::entities::LinkRecord;
use crate::error::AppError;
use async_trait::async_trait;

/// Storage backend for link rows.
///
/// One implementation exists per database backend; the active one is chosen
/// at startup from the `DATABASE_URL` scheme.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::SqliteLinkRepository`] - SQLite
/// - Test mocks available with `cfg(test)`
///
/// # Concurrency
///
/// Implementations are shared across request tasks and must not require
/// external locking.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new active row for `url` with zero visits.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if an active row with the same URL was
    /// committed first. Returns [`AppError::Storage`] on database errors.
    async fn create(&self, url: &str) -> Result<LinkRecord, AppError>;

    /// Finds a row by id, disabled or not.
    async fn find_by_id(&self, id: i64) -> Result<Option<LinkRecord>, AppError>;

    /// Finds the active row for a normalized URL.
    async fn find_active_by_url(&self, url: &str) -> Result<Option<LinkRecord>, AppError>;

    /// Atomically adds one to the visit counter of a row.
    ///
    /// Returns `Ok(false)` if no row has that id.
    async fn increment_visits(&self, id: i64) -> Result<bool, AppError>;

    /// Marks a row as disabled.
    ///
    /// Returns `Ok(false)` if no row has that id. Disabling a disabled row is a
    /// no-op that still returns `Ok(true)`.
    async fn disable(&self, id: i64) -> Result<bool, AppError>;

    /// Verifies the backend is reachable.
    async fn check_connection(&self) -> Result<(), AppError>;
}
