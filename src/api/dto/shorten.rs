//! DTOs for link shortening endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::UrlRecord;

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL to shorten (must be an absolute HTTP/HTTPS URL).
    #[validate(url(message = "Invalid URL format"))]
    #[validate(length(max = 8192, message = "URL is too long"))]
    pub original_url: String,
}

/// The record a URL maps to. Repeated requests for one URL return the same code.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_code: String,
    pub original_url: String,
    pub visits: i64,
}

impl From<UrlRecord> for ShortenResponse {
    fn from(record: UrlRecord) -> Self {
        Self {
            short_code: record.code,
            original_url: record.target_url,
            visits: record.visits,
        }
    }
}
