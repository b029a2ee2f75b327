//! Visit event model for asynchronous counter updates.

use chrono::{DateTime, Utc};

/// A pending visit counter increment for one short code.
///
/// Produced by [`crate::application::services::RedirectService`] on a cache
/// hit and consumed by [`crate::domain::visit_worker::run_visit_worker`]. The
/// redirect itself never waits for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitEvent {
    pub code: String,
    pub enqueued_at: DateTime<Utc>,
}

impl VisitEvent {
    /// Creates a new visit event stamped with the current time.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            enqueued_at: Utc::now(),
        }
    }
}
