//! Handler for link shortening endpoint.

use axum::{Json, extract::State};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::url_normalizer::canonicalize_target_url;

/// Returns the short code for a URL, creating it on first use.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "original_url": "https://example.com/a" }
/// ```
///
/// # Response
///
/// ```json
/// { "short_code": "abc123", "original_url": "https://example.com/a", "visits": 0 }
/// ```
///
/// Shortening a URL that is already stored returns the existing record,
/// visit count included.
///
/// # Errors
///
/// - 400 Bad Request if the URL is not an absolute http(s) URL
/// - 500 Internal Server Error if no free code was found
/// - 503 Service Unavailable if the store is unreachable
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;

    let target_url = canonicalize_target_url(&payload.original_url).map_err(|e| {
        AppError::bad_request(
            e.to_string(),
            json!({ "field": "original_url", "value": payload.original_url }),
        )
    })?;

    let record = state.shortening_service.shorten(&target_url).await?;

    Ok(Json(record.into()))
}
