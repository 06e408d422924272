//! Shared state injected into every HTTP handler.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::services::RedirectService;
use crate::domain::repositories::LinkRepository;
use crate::domain::visit_event::VisitEvent;
use crate::infrastructure::cache::CacheService;

/// Application state shared across all HTTP handlers.
///
/// Cheap to clone: every field is reference-counted or a channel handle.
#[derive(Clone)]
pub struct AppState {
    pub redirect_service: Arc<RedirectService<dyn LinkRepository>>,
    /// Kept for health reporting; resolution goes through `redirect_service`.
    pub cache: Arc<dyn CacheService>,
    pub visit_sender: mpsc::Sender<VisitEvent>,
}
