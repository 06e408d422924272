//! Link lifecycle events emitted to the observability sink.
//!
//! The core emits events at fixed points:
//!
//! - after an insert commits ([`LinkEvent::Created`] / [`LinkEvent::Reused`])
//! - after the cache decision ([`LinkEvent::CacheHit`] / [`LinkEvent::CacheMiss`])
//! - after the resolve decision ([`LinkEvent::Resolved`] / [`LinkEvent::NotFound`] /
//!   [`LinkEvent::Blocked`])
//! - when a visit increment cannot be applied ([`LinkEvent::VisitDropped`])
//!
//! Emission is synchronous and infallible; sinks must not block.

/// An observable event in the link lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A new link row was committed.
    Created { id: i64 },
    /// Creation returned an existing link for the same URL.
    Reused { id: i64 },
    /// A short code resolved to its target.
    Resolved { code: String },
    /// A URL was rejected or a link withheld by the phishing gate.
    Blocked { url: String },
    /// The redirect cache answered.
    CacheHit { code: String },
    /// The redirect cache had nothing (or failed).
    CacheMiss { code: String },
    /// A short code did not resolve.
    NotFound { code: String },
    /// A visit increment could not be applied.
    VisitDropped { id: i64 },
}

impl LinkEvent {
    /// Stable event name used as a metric and log label.
    pub fn name(&self) -> &'static str {
        match self {
            LinkEvent::Created { .. } => "created",
            LinkEvent::Reused { .. } => "reused",
            LinkEvent::Resolved { .. } => "resolved",
            LinkEvent::Blocked { .. } => "blocked",
            LinkEvent::CacheHit { .. } => "cache_hit",
            LinkEvent::CacheMiss { .. } => "cache_miss",
            LinkEvent::NotFound { .. } => "not_found",
            LinkEvent::VisitDropped { .. } => "visit_dropped",
        }
    }
}

/// Fire-and-forget receiver of [`LinkEvent`]s.
pub trait LinkEventSink: Send + Sync {
    fn emit(&self, event: LinkEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(LinkEvent::Created { id: 1 }.name(), "created");
        assert_eq!(
            LinkEvent::CacheHit {
                code: "5wppq".to_string()
            }
            .name(),
            "cache_hit"
        );
        assert_eq!(LinkEvent::VisitDropped { id: 1 }.name(), "visit_dropped");
    }
}
