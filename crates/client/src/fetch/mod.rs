//! HTTP transport used by the request handler and the pre-cache step.
//!
//! Transport failure means the request never produced an HTTP response
//! (DNS, connect, TLS, timeout, body read). Any status code, including
//! 4xx/5xx, resolves as a successful fetch; strategy code decides what a
//! non-ok status means for caching and fallback.

pub mod url;

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::{Duration, Instant};

pub use bytes::Bytes;
pub use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
pub use reqwest::{Method, StatusCode};
pub use url::{UrlError, resolve};

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// User agent string (default: "waycache/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self { user_agent: "waycache/0.1".to_string(), timeout: Duration::from_millis(20_000), max_redirects: 5 }
    }
}

/// Transport-level failure. Never represents an HTTP status.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// A response that arrived over the network.
///
/// The body is fully read into owned bytes before this is constructed, so a
/// snapshot written to the cache and the response handed to the caller see
/// the same bytes.
#[derive(Debug, Clone)]
pub struct NetResponse {
    /// Final URL after redirects.
    pub url: Url,
    /// HTTP status code, possibly non-2xx.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body bytes.
    pub body: Bytes,
}

impl NetResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }
}

/// Network transport seam.
///
/// The production implementation is [`HttpTransport`]; tests substitute a
/// scripted stub to simulate offline conditions and canned statuses.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET for `url`. Exactly one attempt, no retries.
    async fn fetch(&self, url: &Url) -> Result<NetResponse, TransportError>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    /// Create a transport with the given configuration.
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &Url) -> Result<NetResponse, TransportError> {
        let start = Instant::now();

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let final_url = response.url().clone();
        let headers = response.headers().clone();

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        tracing::debug!(
            %url,
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "fetched"
        );

        Ok(NetResponse { url: final_url, status, headers, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_config_default() {
        let config = TransportConfig::default();
        assert_eq!(config.user_agent, "waycache/0.1");
        assert_eq!(config.timeout, Duration::from_millis(20_000));
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_transport_new() {
        let transport = HttpTransport::new(TransportConfig::default());
        assert!(transport.is_ok());
    }

    #[test]
    fn test_net_response_ok_range() {
        let response = NetResponse {
            url: Url::parse("https://example.com").unwrap(),
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        };
        assert!(response.is_ok());

        let not_found = NetResponse { status: StatusCode::NOT_FOUND, ..response };
        assert!(!not_found.is_ok());
    }
}
