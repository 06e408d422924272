//! SQLite implementation of the link repository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::domain::entities::LinkRecord;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// SQLite link storage for single-node deployments and tests.
pub struct SqliteLinkRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteLinkRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Applies the embedded SQLite migrations.
    pub async fn migrate(pool: &SqlitePool) -> Result<(), AppError> {
        sqlx::migrate!("./migrations/sqlite").run(pool).await?;
        Ok(())
    }
}

#[async_trait]
impl LinkRepository for SqliteLinkRepository {
    async fn create(&self, url: &str) -> Result<LinkRecord, AppError> {
        let record = sqlx::query_as::<_, LinkRecord>(
            r#"
            INSERT INTO links (url, created_at)
            VALUES (?, ?)
            RETURNING id, url, visits, created_at, disabled
            "#,
        )
        .bind(url)
        .bind(Utc::now())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<LinkRecord>, AppError> {
        let record = sqlx::query_as::<_, LinkRecord>(
            "SELECT id, url, visits, created_at, disabled FROM links WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn find_active_by_url(&self, url: &str) -> Result<Option<LinkRecord>, AppError> {
        let record = sqlx::query_as::<_, LinkRecord>(
            r#"
            SELECT id, url, visits, created_at, disabled
            FROM links
            WHERE url = ? AND disabled = 0
            "#,
        )
        .bind(url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn increment_visits(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE links SET visits = visits + 1 WHERE id = ?")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn disable(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE links SET disabled = 1 WHERE id = ?")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
