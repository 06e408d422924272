//! Background worker applying queued visit increments.
//!
//! The cache-hit redirect path answers without touching the database and
//! queues a [`VisitEvent`] instead. This worker drains the queue with bounded
//! concurrency and retries failed increments with exponential backoff.
//!
//! Delivery is at-least-once from the queue's point of view: an event is
//! never discarded silently. Events that still fail after all retries, or that
//! cannot be queued because the worker is gone, are logged at `error` level
//! and reported as [`LinkEvent::VisitDropped`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc, mpsc::error::TrySendError};
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info, warn};

use crate::domain::events::{LinkEvent, LinkEventSink};
use crate::domain::repositories::LinkRepository;
use crate::domain::visit_event::VisitEvent;

/// Retries after the first failed attempt.
const MAX_RETRIES: usize = 3;

/// Runs until every sender is dropped, then waits for in-flight increments.
pub async fn run_visit_worker<R>(
    mut rx: mpsc::Receiver<VisitEvent>,
    repository: Arc<R>,
    sink: Arc<dyn LinkEventSink>,
    concurrency: usize,
) where
    R: LinkRepository + ?Sized + 'static,
{
    let concurrency = concurrency.max(1);
    let permits = Arc::new(Semaphore::new(concurrency));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let repository = repository.clone();
        let sink = sink.clone();
        tokio::spawn(async move {
            apply_visit(repository.as_ref(), sink.as_ref(), event).await;
            drop(permit);
        });
    }

    let _ = permits.acquire_many(concurrency as u32).await;
    info!("Visit worker stopped");
}

async fn apply_visit<R>(repository: &R, sink: &dyn LinkEventSink, event: VisitEvent)
where
    R: LinkRepository + ?Sized,
{
    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(MAX_RETRIES);

    match Retry::start(strategy, || repository.increment_visits(event.link_id)).await {
        Ok(true) => debug!("Visit recorded for link {}", event.link_id),
        Ok(false) => warn!("Visit for unknown link {} ignored", event.link_id),
        Err(e) => {
            error!(
                "Dropping visit for link {} after {} retries: {}",
                event.link_id, MAX_RETRIES, e
            );
            sink.emit(LinkEvent::VisitDropped { id: event.link_id });
        }
    }
}

/// Producer side of the visit queue.
///
/// A full queue hands the event to a spawned task that waits for space, so a
/// burst of cache hits delays increments instead of losing them. The number
/// of such waiting tasks is capped (by default at the queue capacity, so at
/// most twice the capacity is held in memory); past the cap the visit is
/// dropped and reported.
#[derive(Clone)]
pub struct VisitQueue {
    sender: mpsc::Sender<VisitEvent>,
    deferred: Arc<Semaphore>,
}

impl VisitQueue {
    pub fn new(sender: mpsc::Sender<VisitEvent>) -> Self {
        let limit = sender.max_capacity();
        Self::with_deferred_limit(sender, limit)
    }

    pub fn with_deferred_limit(sender: mpsc::Sender<VisitEvent>, limit: usize) -> Self {
        Self {
            sender,
            deferred: Arc::new(Semaphore::new(limit)),
        }
    }

    /// Queues a visit without blocking the caller.
    pub fn enqueue(&self, event: VisitEvent, sink: &Arc<dyn LinkEventSink>) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                let Ok(permit) = self.deferred.clone().try_acquire_owned() else {
                    error!(
                        "Visit queue saturated, dropping visit for link {}",
                        event.link_id
                    );
                    sink.emit(LinkEvent::VisitDropped { id: event.link_id });
                    return;
                };

                warn!("Visit queue full, deferring link {}", event.link_id);
                let sender = self.sender.clone();
                let sink = sink.clone();
                tokio::spawn(async move {
                    if sender.send(event).await.is_err() {
                        error!("Visit queue closed, dropping link {}", event.link_id);
                        sink.emit(LinkEvent::VisitDropped { id: event.link_id });
                    }
                    drop(permit);
                });
            }
            Err(TrySendError::Closed(event)) => {
                error!("Visit queue closed, dropping link {}", event.link_id);
                sink.emit(LinkEvent::VisitDropped { id: event.link_id });
            }
        }
    }
}
