//! Lookup orchestration: creation, cache-then-store resolution and link info.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::application::services::link_service::{Insertion, LinkService};
use crate::domain::entities::{Link, ShortLink};
use crate::domain::events::{LinkEvent, LinkEventSink};
use crate::domain::phishing::PhishingGate;
use crate::domain::repositories::LinkRepository;
use crate::domain::visit_event::VisitEvent;
use crate::domain::visit_worker::VisitQueue;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::url_normalizer::normalize_url;

/// Settings the orchestrator needs beyond its collaborators.
#[derive(Debug, Clone)]
pub struct RedirectSettings {
    /// Prefix of every `full_link`, e.g. `https://l1nk.zip`.
    pub api_domain: String,
    pub cache_ttl_seconds: u64,
}

/// Front door for the three consumed operations.
///
/// # Resolution
///
/// A cache hit answers immediately and queues the visit increment for the
/// background worker, so counters on hot links are eventually consistent.
/// A cache miss reads the store, increments synchronously and then populates
/// the cache. Cache failures are logged and treated as misses: the cache
/// never changes *what* a code resolves to.
///
/// # Phishing
///
/// The gate is consulted before creation and on every resolution. A link that
/// turns out to be listed is disabled, evicted from the cache and reported as
/// not found.
pub struct RedirectService<R: LinkRepository + ?Sized> {
    links: Arc<LinkService<R>>,
    cache: Arc<dyn CacheService>,
    phishing: Arc<dyn PhishingGate>,
    events: Arc<dyn LinkEventSink>,
    visits: VisitQueue,
    settings: RedirectSettings,
}

impl<R: LinkRepository + ?Sized> RedirectService<R> {
    pub fn new(
        links: Arc<LinkService<R>>,
        cache: Arc<dyn CacheService>,
        phishing: Arc<dyn PhishingGate>,
        events: Arc<dyn LinkEventSink>,
        visits: mpsc::Sender<VisitEvent>,
        settings: RedirectSettings,
    ) -> Self {
        Self {
            links,
            cache,
            phishing,
            events,
            visits: VisitQueue::new(visits),
            settings,
        }
    }

    pub fn links(&self) -> &LinkService<R> {
        &self.links
    }

    /// Shortens `url`, reusing the existing link for an equivalent URL.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the URL is invalid
    /// - [`AppError::PhishingBlocked`] if the URL is on the phishing list
    /// - [`AppError::Storage`] on database errors
    pub async fn create_short_link(&self, url: &str) -> Result<ShortLink, AppError> {
        let normalized = normalize_url(url)?;

        if self.phishing.is_phishing(&normalized).await {
            warn!("Rejected phishing URL {}", normalized);
            self.events.emit(LinkEvent::Blocked {
                url: normalized.clone(),
            });
            return Err(AppError::phishing_blocked(
                "Phishing URLs are forbidden",
                json!({ "url": normalized }),
            ));
        }

        let link = match self.links.insert(&normalized).await? {
            Insertion::Created(link) => {
                self.events.emit(LinkEvent::Created { id: link.id });
                link
            }
            Insertion::Existing(link) => {
                self.events.emit(LinkEvent::Reused { id: link.id });
                link
            }
        };

        Ok(self.short_link(link))
    }

    /// Resolves a short code to its target URL and counts the visit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown, malformed, disabled or
    /// blocked codes and [`AppError::Storage`] if the store fails on a miss.
    pub async fn resolve_short_link(&self, code: &str) -> Result<String, AppError> {
        let url = match self.cached_url(code).await {
            Some(url) => self.resolve_hit(code, url).await?,
            None => self.resolve_miss(code).await?,
        };

        self.events.emit(LinkEvent::Resolved {
            code: code.to_string(),
        });
        Ok(url)
    }

    /// Returns the stored state of an active link without counting a visit.
    pub async fn get_link_info(&self, code: &str) -> Result<ShortLink, AppError> {
        let link = self.links.lookup(code).await?;
        Ok(self.short_link(link))
    }

    /// Disables a link and evicts it from the cache. Idempotent.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] for unknown or malformed codes
    /// - [`AppError::Storage`] if the store fails, or if the link was disabled
    ///   but its cache entry could not be evicted; the code may keep resolving
    ///   from the cache until the entry expires, so the call should be retried
    pub async fn disable_link(&self, code: &str) -> Result<(), AppError> {
        let id = self
            .links
            .codec()
            .decode(code)
            .map_err(|_| AppError::link_not_found(code))?;

        self.links.disable(id).await.map_err(|e| match e {
            AppError::NotFound { .. } => AppError::link_not_found(code),
            other => other,
        })?;

        self.cache.invalidate(code).await.map_err(|e| {
            error!("Link {} disabled but still cached: {}", code, e);
            AppError::storage(
                "Link disabled but cache invalidation failed",
                json!({ "code": code, "reason": e.to_string() }),
            )
        })
    }

    pub async fn check_connection(&self) -> Result<(), AppError> {
        self.links.check_connection().await
    }

    async fn cached_url(&self, code: &str) -> Option<String> {
        match self.cache.get_url(code).await {
            Ok(Some(url)) => Some(url),
            Ok(None) => None,
            Err(e) => {
                warn!("Cache read failed for {}, using store: {}", code, e);
                None
            }
        }
    }

    async fn resolve_hit(&self, code: &str, url: String) -> Result<String, AppError> {
        let Ok(id) = self.links.codec().decode(code) else {
            // Left over from a different alphabet.
            self.evict(code).await;
            return self.resolve_miss(code).await;
        };

        if self.phishing.is_phishing(&url).await {
            return Err(self.block(id, code, url).await);
        }

        debug!("Cache hit for {}", code);
        self.events.emit(LinkEvent::CacheHit {
            code: code.to_string(),
        });
        self.visits.enqueue(VisitEvent::new(id), &self.events);

        Ok(url)
    }

    async fn resolve_miss(&self, code: &str) -> Result<String, AppError> {
        debug!("Cache miss for {}", code);
        self.events.emit(LinkEvent::CacheMiss {
            code: code.to_string(),
        });

        let link = match self.links.lookup(code).await {
            Ok(link) => link,
            Err(e) => {
                if matches!(e, AppError::NotFound { .. }) {
                    self.events.emit(LinkEvent::NotFound {
                        code: code.to_string(),
                    });
                }
                return Err(e);
            }
        };

        if self.phishing.is_phishing(&link.url).await {
            return Err(self.block(link.id, code, link.url).await);
        }

        self.links.increment_visit(link.id).await?;

        if let Err(e) = self
            .cache
            .set_url(code, &link.url, Some(self.settings.cache_ttl_seconds))
            .await
        {
            warn!("Cache write failed for {}: {}", code, e);
        }

        Ok(link.url)
    }

    /// Withdraws a link found to be phishing and returns the error to answer with.
    async fn block(&self, id: i64, code: &str, url: String) -> AppError {
        warn!("Blocking phishing link {} -> {}", code, url);

        if let Err(e) = self.links.disable(id).await {
            error!("Failed to disable phishing link {}: {}", code, e);
        }
        self.evict(code).await;
        self.events.emit(LinkEvent::Blocked { url });

        AppError::link_not_found(code)
    }

    async fn evict(&self, code: &str) {
        if let Err(e) = self.cache.invalidate(code).await {
            warn!("Cache invalidation failed for {}: {}", code, e);
        }
    }

    fn short_link(&self, link: Link) -> ShortLink {
        let full_link = format!(
            "{}/{}",
            self.settings.api_domain.trim_end_matches('/'),
            link.code
        );
        ShortLink { link, full_link }
    }
}
