#![allow(dead_code)]

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use l1nkzip::application::services::{LinkService, RedirectService, RedirectSettings};
use l1nkzip::domain::codec::Codec;
use l1nkzip::domain::events::{LinkEvent, LinkEventSink};
use l1nkzip::domain::phishing::PhishingGate;
use l1nkzip::domain::repositories::LinkRepository;
use l1nkzip::domain::visit_event::VisitEvent;
use l1nkzip::domain::visit_worker::run_visit_worker;
use l1nkzip::infrastructure::cache::{CacheError, CacheResult, CacheService, MemoryCache};
use l1nkzip::infrastructure::persistence::SqliteLinkRepository;
use l1nkzip::infrastructure::phishing::NullGate;
use l1nkzip::state::AppState;

pub const API_DOMAIN: &str = "https://l1nk.zip";

/// Fresh in-memory database with migrations applied.
///
/// Every connection to `sqlite::memory:` opens its own database, so the pool
/// is pinned to a single long-lived connection.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    SqliteLinkRepository::migrate(&pool).await.unwrap();
    pool
}

pub async fn test_repository() -> (SqlitePool, Arc<SqliteLinkRepository>) {
    let pool = test_pool().await;
    let repository = Arc::new(SqliteLinkRepository::new(Arc::new(pool.clone())));
    (pool, repository)
}

pub async fn visits_of(pool: &SqlitePool, id: i64) -> i64 {
    sqlx::query_scalar("SELECT visits FROM links WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn count_links(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Event sink that keeps everything it receives.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<LinkEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<LinkEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.name() == name)
            .count()
    }
}

impl LinkEventSink for RecordingSink {
    fn emit(&self, event: LinkEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Cache backend that fails every operation.
pub struct FailingCache;

#[async_trait]
impl CacheService for FailingCache {
    async fn get_url(&self, _short_code: &str) -> CacheResult<Option<String>> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn set_url(
        &self,
        _short_code: &str,
        _original_url: &str,
        _ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn invalidate(&self, _short_code: &str) -> CacheResult<()> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn health_check(&self) -> bool {
        false
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

/// A fully wired service stack over an in-memory database.
pub struct TestApp {
    pub pool: SqlitePool,
    pub repository: Arc<dyn LinkRepository>,
    pub service: Arc<RedirectService<dyn LinkRepository>>,
    pub cache: Arc<dyn CacheService>,
    pub sink: Arc<RecordingSink>,
    pub visit_sender: mpsc::Sender<VisitEvent>,
    visit_receiver: Option<mpsc::Receiver<VisitEvent>>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with(Arc::new(MemoryCache::new(1_000, 60)), Arc::new(NullGate)).await
    }

    pub async fn with(cache: Arc<dyn CacheService>, gate: Arc<dyn PhishingGate>) -> Self {
        let pool = test_pool().await;
        let repository: Arc<dyn LinkRepository> =
            Arc::new(SqliteLinkRepository::new(Arc::new(pool.clone())));
        let sink = Arc::new(RecordingSink::default());
        let (visit_sender, visit_receiver) = mpsc::channel(1_000);

        let links = Arc::new(LinkService::new(
            repository.clone(),
            Arc::new(Codec::default()),
        ));
        let service = Arc::new(RedirectService::new(
            links,
            cache.clone(),
            gate,
            sink.clone(),
            visit_sender.clone(),
            RedirectSettings {
                api_domain: API_DOMAIN.to_string(),
                cache_ttl_seconds: 60,
            },
        ));

        Self {
            pool,
            repository,
            service,
            cache,
            sink,
            visit_sender,
            visit_receiver: Some(visit_receiver),
        }
    }

    pub fn state(&self) -> AppState {
        AppState {
            redirect_service: self.service.clone(),
            cache: self.cache.clone(),
            visit_sender: self.visit_sender.clone(),
        }
    }

    /// Starts the background visit worker. Callable once.
    pub fn spawn_visit_worker(&mut self) -> JoinHandle<()> {
        let receiver = self
            .visit_receiver
            .take()
            .expect("visit worker already started");
        tokio::spawn(run_visit_worker(
            receiver,
            self.repository.clone(),
            self.sink.clone(),
            4,
        ))
    }

    /// Drains queued visit events without applying them.
    pub fn queued_visits(&mut self) -> Vec<VisitEvent> {
        let receiver = self
            .visit_receiver
            .as_mut()
            .expect("visit worker already started");
        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Polls until the stored visit count of `id` reaches `expected`.
    pub async fn wait_for_visits(&self, id: i64, expected: i64) -> i64 {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let visits = visits_of(&self.pool, id).await;
            if visits >= expected || tokio::time::Instant::now() >= deadline {
                return visits;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}
