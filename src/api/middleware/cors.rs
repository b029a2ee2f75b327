//! Cross-origin policy.

use tower_http::cors::CorsLayer;

/// Allows any origin, method and header.
///
/// The API is unauthenticated and meant to be called from browser frontends
/// served on other origins, so there is nothing a stricter policy would protect.
pub fn layer() -> CorsLayer {
    CorsLayer::permissive()
}
