//! Target URL canonicalization.
//!
//! Uniqueness is enforced on the stored string, so equivalent spellings of
//! one address must map to one string before they reach the store.

use url::Url;

/// Reasons a submitted URL cannot be shortened.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TargetUrlError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS URLs can be shortened")]
    UnsupportedScheme,

    #[error("URL must include a host")]
    MissingHost,
}

/// Parses `input` as an absolute http(s) URL and returns its canonical form.
///
/// Canonical form is the WHATWG serialization: scheme and host are
/// lowercased, default ports dropped and an empty path becomes `/`. Path,
/// query and fragment are kept as given.
///
/// # Errors
///
/// Returns [`TargetUrlError`] for unparsable, non-http(s) or hostless input.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     canonicalize_target_url("HTTPS://Example.COM:443").unwrap(),
///     "https://example.com/"
/// );
/// ```
pub fn canonicalize_target_url(input: &str) -> Result<String, TargetUrlError> {
    let url = Url::parse(input.trim()).map_err(|e| TargetUrlError::InvalidFormat(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(TargetUrlError::UnsupportedScheme);
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url.into()),
        _ => Err(TargetUrlError::MissingHost),
    }
}
