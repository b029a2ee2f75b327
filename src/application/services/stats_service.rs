//! Read-only link statistics.

use std::sync::Arc;

use crate::domain::entities::UrlRecord;
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use serde_json::json;

/// Service for reading a link's record and visit count.
///
/// Reads go straight to the store and never count as a visit. Counts may lag
/// by the increments still queued for the background worker.
pub struct StatsService<R: UrlRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: UrlRepository + ?Sized> StatsService<R> {
    /// Creates a new statistics service.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Retrieves the record for `code`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record exists for `code`.
    /// Returns [`AppError::StoreUnavailable`] on store failures.
    pub async fn get_stats(&self, code: &str) -> Result<UrlRecord, AppError> {
        self.repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))
    }
}
