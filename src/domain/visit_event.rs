//! Visit event model for asynchronous visit accounting.

/// A pending `+1` on a link's visit counter.
///
/// Produced on the cache-hit redirect path, where the link row is not read,
/// and consumed by [`crate::domain::visit_worker::run_visit_worker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitEvent {
    pub link_id: i64,
}

impl VisitEvent {
    pub fn new(link_id: i64) -> Self {
        Self { link_id }
    }
}
