//! HTTP server initialization and runtime setup.
//!
//! Wires the database, cache, phishing gate and visit worker together, then
//! runs the Axum server until a shutdown signal arrives.

use crate::application::services::{LinkService, RedirectService, RedirectSettings};
use crate::config::Config;
use crate::domain::events::LinkEventSink;
use crate::domain::visit_worker::run_visit_worker;
use crate::infrastructure::telemetry::MetricsEventSink;
use crate::infrastructure::{cache, persistence, phishing};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Upper bound on draining queued visits after the server stops.
const VISIT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Database pool for the configured backend, with migrations
/// - Redirect cache (Redis, in-process, or disabled)
/// - Phishing gate
/// - Background visit worker
/// - Axum HTTP server
///
/// On Ctrl+C / SIGTERM the server stops accepting connections, finishes
/// in-flight requests, and gives the visit worker a bounded window to drain.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - The alphabet or blocklist cannot be loaded
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository = persistence::connect(&config)
        .await
        .context("Failed to open database")?;
    let codec = Arc::new(config.codec()?);
    let cache = cache::from_config(&config).await;
    let phishing = phishing::from_config(&config).await?;
    let events: Arc<dyn LinkEventSink> = Arc::new(MetricsEventSink);

    let (visit_tx, visit_rx) = mpsc::channel(config.visit_queue_capacity);
    let worker = tokio::spawn(run_visit_worker(
        visit_rx,
        repository.clone(),
        events.clone(),
        config.visit_worker_concurrency,
    ));
    tracing::info!(
        "Visit worker started (concurrency {})",
        config.visit_worker_concurrency
    );

    let links = Arc::new(LinkService::new(repository, codec));
    let redirect_service = Arc::new(RedirectService::new(
        links,
        cache.clone(),
        phishing,
        events,
        visit_tx.clone(),
        RedirectSettings {
            api_domain: config.api_domain.clone(),
            cache_ttl_seconds: config.cache_ttl_seconds,
        },
    ));

    let state = AppState {
        redirect_service,
        cache,
        visit_sender: visit_tx,
    };

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router and every visit sender are gone now; the worker exits once
    // the queue is empty.
    tracing::info!("Server stopped, draining visit queue");
    match timeout(VISIT_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("Visit worker failed: {}", e),
        Err(_) => tracing::warn!(
            "Visit queue not drained after {}s, pending visits are lost",
            VISIT_DRAIN_TIMEOUT.as_secs()
        ),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
