//! Database-backed link repositories.
//!
//! One [`LinkRepository`] implementation per backend; [`connect`] picks the
//! backend from the `DATABASE_URL` scheme, opens the pool and runs the
//! embedded migrations.
//!
//! - [`PgLinkRepository`] - `postgres://` / `postgresql://`
//! - [`SqliteLinkRepository`] - `sqlite:`

pub mod pg_link_repository;
pub mod sqlite_link_repository;

pub use pg_link_repository::PgLinkRepository;
pub use sqlite_link_repository::SqliteLinkRepository;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use crate::config::Config;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    /// Detects the backend from a connection string.
    pub fn from_url(database_url: &str) -> Option<Self> {
        if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
            Some(Self::Postgres)
        } else if database_url.starts_with("sqlite:") {
            Some(Self::Sqlite)
        } else {
            None
        }
    }
}

/// Returns true for SQLite URLs that address an in-memory database.
pub fn is_in_memory_sqlite(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Opens the configured backend and applies its migrations.
///
/// # Errors
///
/// Returns [`AppError::Validation`] for an unsupported URL scheme and
/// [`AppError::Storage`] if the connection or a migration fails.
pub async fn connect(config: &Config) -> Result<Arc<dyn LinkRepository>, AppError> {
    match Backend::from_url(&config.database_url) {
        Some(Backend::Postgres) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
                .idle_timeout(Duration::from_secs(config.db_idle_timeout))
                .max_lifetime(Duration::from_secs(config.db_max_lifetime))
                .connect(&config.database_url)
                .await?;
            PgLinkRepository::migrate(&pool).await?;
            tracing::info!("Connected to PostgreSQL");

            Ok(Arc::new(PgLinkRepository::new(Arc::new(pool))))
        }
        Some(Backend::Sqlite) => {
            let options = SqliteConnectOptions::from_str(&config.database_url)?
                .create_if_missing(true)
                .busy_timeout(Duration::from_secs(5));

            // Every connection to an in-memory database opens a fresh one, so
            // the pool must hold exactly one connection for the process lifetime.
            let pool = if is_in_memory_sqlite(&config.database_url) {
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options)
                    .await?
            } else {
                SqlitePoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
                    .connect_with(
                        options
                            .journal_mode(SqliteJournalMode::Wal)
                            .synchronous(SqliteSynchronous::Normal),
                    )
                    .await?
            };
            SqliteLinkRepository::migrate(&pool).await?;
            tracing::info!("Connected to SQLite");

            Ok(Arc::new(SqliteLinkRepository::new(Arc::new(pool))))
        }
        None => Err(AppError::bad_request(
            "Unsupported database URL scheme",
            json!({ "expected": ["postgres://", "postgresql://", "sqlite:"] }),
        )),
    }
}
