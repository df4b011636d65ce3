//! URL resolution for route rules and pre-cache manifests.
//!
//! Configured resources come in three shapes: absolute URLs, protocol-
//! relative URLs (`//host/path`, common for CDN assets), and same-origin
//! absolute paths (`/contact-us`). All three resolve to a full http(s) URL
//! against the site origin.

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    Invalid(String),
}

/// Resolve a configured resource reference against the site origin.
///
/// Resolution steps:
/// 1. Trim leading/trailing whitespace
/// 2. `//host/path` adopts the origin's scheme
/// 3. `/path` (and other relative forms) joins the origin
/// 4. Scheme restricted to http/https
/// 5. Fragment removed; query string preserved
pub fn resolve(origin: &url::Url, raw: &str) -> Result<url::Url, UrlError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = if trimmed.starts_with("//") {
        let with_scheme = format!("{}:{}", origin.scheme(), trimmed);
        url::Url::parse(&with_scheme).map_err(|e| UrlError::Invalid(e.to_string()))?
    } else if trimmed.contains("://") {
        url::Url::parse(trimmed).map_err(|e| UrlError::Invalid(e.to_string()))?
    } else {
        origin.join(trimmed).map_err(|e| UrlError::Invalid(e.to_string()))?
    };

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}
