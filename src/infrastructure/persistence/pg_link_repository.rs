//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::LinkRecord;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// PostgreSQL link storage.
///
/// Ids come from a `BIGSERIAL`; URL uniqueness among active rows is enforced
/// by the partial index `links_url_active_key`.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Applies the embedded PostgreSQL migrations.
    pub async fn migrate(pool: &PgPool) -> Result<(), AppError> {
        sqlx::migrate!("./migrations/postgres").run(pool).await?;
        Ok(())
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, url: &str) -> Result<LinkRecord, AppError> {
        let record = sqlx::query_as::<_, LinkRecord>(
            r#"
            INSERT INTO links (url, created_at)
            VALUES ($1, $2)
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
            r#"
            SELECT id, url, visits, created_at, disabled
            FROM links
            WHERE id = $1
            "#,
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
            WHERE url = $1 AND NOT disabled
            "#,
        )
        .bind(url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn increment_visits(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE links SET visits = visits + 1 WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn disable(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE links SET disabled = TRUE WHERE id = $1")
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
