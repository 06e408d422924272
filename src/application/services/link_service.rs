//! Link store: deduplicated insertion and code-based lookup.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::domain::codec::Codec;
use crate::domain::entities::{Link, LinkRecord};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::url_normalizer::normalize_url;

/// Upper bound on find/create rounds when concurrent writers race on a URL.
const MAX_INSERT_ATTEMPTS: usize = 3;

/// Result of [`LinkService::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// A new row was committed.
    Created(Link),
    /// An active row for the same URL already existed.
    Existing(Link),
}

impl Insertion {
    pub fn is_created(&self) -> bool {
        matches!(self, Insertion::Created(_))
    }

    pub fn link(&self) -> &Link {
        match self {
            Insertion::Created(link) | Insertion::Existing(link) => link,
        }
    }

    pub fn into_link(self) -> Link {
        match self {
            Insertion::Created(link) | Insertion::Existing(link) => link,
        }
    }
}

/// Durable mapping between row ids, short codes and target URLs.
///
/// Codes are never stored: they are derived from the row id with the
/// configured [`Codec`] on the way out and decoded back on the way in.
pub struct LinkService<R: LinkRepository + ?Sized> {
    repository: Arc<R>,
    codec: Arc<Codec>,
}

impl<R: LinkRepository + ?Sized> LinkService<R> {
    pub fn new(repository: Arc<R>, codec: Arc<Codec>) -> Self {
        Self { repository, codec }
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Returns the link for `url`, creating it if no active one exists.
    ///
    /// The URL is normalized first, so equivalent spellings share one link.
    /// When two callers insert the same new URL concurrently, the loser of the
    /// unique-index race re-reads and returns the winner's row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an invalid URL and
    /// [`AppError::Storage`] on database errors or if the race does not
    /// settle within a few rounds.
    pub async fn insert(&self, url: &str) -> Result<Insertion, AppError> {
        let normalized = normalize_url(url)?;

        for attempt in 1..=MAX_INSERT_ATTEMPTS {
            if let Some(record) = self.repository.find_active_by_url(&normalized).await? {
                return Ok(Insertion::Existing(self.to_link(record)?));
            }

            match self.repository.create(&normalized).await {
                Ok(record) => return Ok(Insertion::Created(self.to_link(record)?)),
                Err(AppError::Conflict { .. }) => {
                    debug!("Concurrent insert for {} (attempt {})", normalized, attempt);
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::storage(
            "Failed to insert link",
            json!({ "url": normalized, "attempts": MAX_INSERT_ATTEMPTS }),
        ))
    }

    /// Resolves a short code to its active link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is malformed, unknown, or
    /// names a disabled link. The three cases are indistinguishable.
    pub async fn lookup(&self, code: &str) -> Result<Link, AppError> {
        let id = self
            .codec
            .decode(code)
            .map_err(|_| AppError::link_not_found(code))?;

        match self.repository.find_by_id(id).await? {
            Some(record) if !record.disabled => self.to_link(record),
            _ => Err(AppError::link_not_found(code)),
        }
    }

    /// Fetches a row by id regardless of its state.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .map(|record| self.to_link(record))
            .transpose()
    }

    /// Adds one visit to a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no row has that id.
    pub async fn increment_visit(&self, id: i64) -> Result<(), AppError> {
        if self.repository.increment_visits(id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Link not found", json!({ "id": id })))
        }
    }

    /// Disables a link. Disabling twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no row has that id.
    pub async fn disable(&self, id: i64) -> Result<(), AppError> {
        if self.repository.disable(id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Link not found", json!({ "id": id })))
        }
    }

    pub async fn check_connection(&self) -> Result<(), AppError> {
        self.repository.check_connection().await
    }

    fn to_link(&self, record: LinkRecord) -> Result<Link, AppError> {
        let code = self.codec.encode(record.id)?;
        Ok(Link::from_record(record, code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use chrono::Utc;

    fn record(id: i64, url: &str) -> LinkRecord {
        LinkRecord {
            id,
            url: url.to_string(),
            visits: 0,
            created_at: Utc::now(),
            disabled: false,
        }
    }

    fn service(repo: MockLinkRepository) -> LinkService<MockLinkRepository> {
        LinkService::new(Arc::new(repo), Arc::new(Codec::default()))
    }

    #[tokio::test]
    async fn test_insert_creates_new_link() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_active_by_url()
            .withf(|url| url == "https://example.com/path")
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_create()
            .withf(|url| url == "https://example.com/path")
            .times(1)
            .returning(|url| Ok(record(23, url)));

        let insertion = service(repo)
            .insert("HTTPS://EXAMPLE.COM:443/path")
            .await
            .unwrap();

        assert!(insertion.is_created());
        assert_eq!(insertion.link().code, "5wppq");
        assert_eq!(insertion.link().visits, 0);
    }

    #[tokio::test]
    async fn test_insert_reuses_active_link() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_active_by_url()
            .times(1)
            .returning(|url| Ok(Some(record(7, url))));
        repo.expect_create().times(0);

        let insertion = service(repo).insert("https://example.com").await.unwrap();

        assert!(!insertion.is_created());
        assert_eq!(insertion.link().id, 7);
    }

    #[tokio::test]
    async fn test_insert_recovers_from_race() {
        let mut repo = MockLinkRepository::new();
        let mut seq = mockall::Sequence::new();
        repo.expect_find_active_by_url()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        repo.expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::conflict("Unique constraint violation", json!({}))));
        repo.expect_find_active_by_url()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|url| Ok(Some(record(42, url))));

        let insertion = service(repo).insert("https://example.com").await.unwrap();

        assert!(!insertion.is_created());
        assert_eq!(insertion.into_link().id, 42);
    }

    #[tokio::test]
    async fn test_insert_gives_up_after_bounded_conflicts() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_active_by_url()
            .times(MAX_INSERT_ATTEMPTS)
            .returning(|_| Ok(None));
        repo.expect_create()
            .times(MAX_INSERT_ATTEMPTS)
            .returning(|_| Err(AppError::conflict("Unique constraint violation", json!({}))));

        let result = service(repo).insert("https://example.com").await;

        assert!(matches!(result, Err(AppError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_url() {
        let repo = MockLinkRepository::new();

        let result = service(repo).insert("not-a-url").await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_insert_propagates_storage_error() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_active_by_url()
            .returning(|_| Err(AppError::storage("Database error", json!({}))));

        let result = service(repo).insert("https://example.com").await;

        assert!(matches!(result, Err(AppError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_lookup_decodes_code() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_id()
            .withf(|id| *id == 23)
            .times(1)
            .returning(|id| Ok(Some(record(id, "https://example.com/"))));

        let link = service(repo).lookup("5wppq").await.unwrap();

        assert_eq!(link.id, 23);
        assert_eq!(link.url, "https://example.com/");
    }

    #[tokio::test]
    async fn test_lookup_hides_disabled_and_malformed() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_id().returning(|id| {
            let mut row = record(id, "https://example.com/");
            row.disabled = true;
            Ok(Some(row))
        });
        let service = service(repo);

        assert!(matches!(
            service.lookup("5wppq").await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            service.lookup("!!!!!").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_disable_unknown_is_not_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_disable().returning(|_| Ok(false));

        let result = service(repo).disable(99).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_increment_visit() {
        let mut repo = MockLinkRepository::new();
        repo.expect_increment_visits()
            .withf(|id| *id == 5)
            .times(1)
            .returning(|_| Ok(true));

        assert!(service(repo).increment_visit(5).await.is_ok());
    }
}
