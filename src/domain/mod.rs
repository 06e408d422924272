//! Domain layer containing business entities and contracts.
//!
//! Nothing here depends on the infrastructure or presentation layers.
//!
//! - [`codec`] - Reversible id <-> short code transform
//! - [`entities`] - Link records and views
//! - [`repositories`] - Data access trait definitions
//! - [`phishing`] - Phishing gate contract
//! - [`events`] - Observable link events and their sink
//! - [`visit_event`] / [`visit_worker`] - Deferred visit accounting
//!
//! # Visit Processing Flow
//!
//! 1. A redirect is answered from the cache
//! 2. A [`visit_event::VisitEvent`] is queued with [`visit_worker::VisitQueue`]
//! 3. [`visit_worker::run_visit_worker`] applies the increment with retries
//! 4. The counter is persisted via [`repositories::LinkRepository::increment_visits`]

pub mod codec;
pub mod entities;
pub mod events;
pub mod phishing;
pub mod repositories;
pub mod visit_event;
pub mod visit_worker;
