//! Request key derivation.
//!
//! A request is cached under its origin + path only. Query strings and
//! fragments never participate, so two query-varying resources collapse to
//! one entry. Accepted behavior, not a bug: the routing rules match on
//! origin + path for the same reason.

use sha2::{Digest, Sha256};
use url::Url;

/// Origin + path form of a URL, the identity a request is cached under.
pub fn normalized_url(url: &Url) -> String {
    format!("{}{}", url.origin().ascii_serialization(), url.path())
}

/// Compute the cache key for a request URL.
pub fn request_key(url: &Url) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized_url(url).as_bytes());
    hex::encode(hasher.finalize())
}
