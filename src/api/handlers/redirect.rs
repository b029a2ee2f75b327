//! Handler for short URL redirect.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Check cache for the code
/// 2. **Hit**: queue a background visit increment
/// 3. **Miss**: increment in the store and populate the cache
/// 4. Return 307 Temporary Redirect, or `200 {"original_url": ...}` when the
///    client sends `Accept: application/json`
///
/// Both forms count a visit.
///
/// Cache errors are treated as misses. A full visit queue drops the
/// increment rather than delaying the redirect.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
/// Returns 503 Service Unavailable if the store is unreachable on a miss.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let target_url = state.redirect_service.resolve(&code).await?;

    if wants_json(&headers) {
        return Ok(Json(json!({ "original_url": target_url })).into_response());
    }

    Ok(Redirect::temporary(&target_url).into_response())
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}
