//! Metrics-backed event sink.
//!
//! Counters go through the `metrics` facade. Without an installed recorder the
//! calls are no-ops; exporting them is left to the deployment.

use metrics::counter;

use crate::domain::events::{LinkEvent, LinkEventSink};

pub const URLS_CREATED_TOTAL: &str = "l1nkzip_urls_created_total";
pub const URLS_REUSED_TOTAL: &str = "l1nkzip_urls_reused_total";
pub const REDIRECTS_TOTAL: &str = "l1nkzip_redirects_total";
pub const REDIRECTS_NOT_FOUND_TOTAL: &str = "l1nkzip_redirects_not_found_total";
pub const PHISHING_BLOCKS_TOTAL: &str = "l1nkzip_phishing_blocks_total";
pub const CACHE_HITS_TOTAL: &str = "l1nkzip_cache_hits_total";
pub const CACHE_MISSES_TOTAL: &str = "l1nkzip_cache_misses_total";
pub const VISITS_FAILED_TOTAL: &str = "l1nkzip_visits_failed_total";

/// Default [`LinkEventSink`]: one counter per event kind plus a debug log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsEventSink;

impl MetricsEventSink {
    fn metric_name(event: &LinkEvent) -> &'static str {
        match event {
            LinkEvent::Created { .. } => URLS_CREATED_TOTAL,
            LinkEvent::Reused { .. } => URLS_REUSED_TOTAL,
            LinkEvent::Resolved { .. } => REDIRECTS_TOTAL,
            LinkEvent::NotFound { .. } => REDIRECTS_NOT_FOUND_TOTAL,
            LinkEvent::Blocked { .. } => PHISHING_BLOCKS_TOTAL,
            LinkEvent::CacheHit { .. } => CACHE_HITS_TOTAL,
            LinkEvent::CacheMiss { .. } => CACHE_MISSES_TOTAL,
            LinkEvent::VisitDropped { .. } => VISITS_FAILED_TOTAL,
        }
    }
}

impl LinkEventSink for MetricsEventSink {
    fn emit(&self, event: LinkEvent) {
        counter!(Self::metric_name(&event)).increment(1);
        tracing::debug!(event = event.name(), ?event, "link event");
    }
}
