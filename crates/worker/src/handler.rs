//! Strategy execution.
//!
//! One network attempt and at most one cache read per request, no retries.
//! Per request the flow is classify, run the selected strategy, settle with
//! a response or a transport failure. Concurrent requests share nothing but
//! the cache store.

use std::sync::Arc;

use url::Url;
use waycache_client::{Bytes, HeaderMap, HeaderName, HeaderValue, Method, NetResponse, StatusCode, Transport};
use waycache_core::cache::key::request_key;
use waycache_core::{Error, GenerationCache, StoredResponse};

use crate::classify::{Classifier, Strategy};

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Network,
    Cache,
}

/// A settled response, ready to hand back to the interception host.
#[derive(Debug, Clone)]
pub struct Served {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub source: Source,
}

impl Served {
    fn from_network(response: NetResponse) -> Self {
        Self { status: response.status, headers: response.headers, body: response.body, source: Source::Network }
    }

    fn from_cache(stored: StoredResponse) -> Self {
        Self {
            status: StatusCode::from_u16(stored.status).unwrap_or(StatusCode::OK),
            headers: headers_from_pairs(&stored.headers),
            body: Bytes::from(stored.body),
            source: Source::Cache,
        }
    }
}

/// Executes the strategy the classifier picks for each request.
pub struct RequestHandler {
    classifier: Classifier,
    cache: GenerationCache,
    transport: Arc<dyn Transport>,
    offline_fallback: Option<StoredResponse>,
}

impl RequestHandler {
    pub fn new(classifier: Classifier, cache: GenerationCache, transport: Arc<dyn Transport>) -> Self {
        Self { classifier, cache, transport, offline_fallback: None }
    }

    /// Response served when a fresh-first request fails with nothing cached,
    /// typically a pre-rendered offline page. Without one, the transport
    /// failure surfaces to the caller.
    pub fn with_offline_fallback(mut self, fallback: StoredResponse) -> Self {
        self.offline_fallback = Some(fallback);
        self
    }

    /// Resolve one intercepted request.
    pub async fn handle(&self, method: &Method, url: &Url) -> Result<Served, Error> {
        match self.classifier.classify(method, url) {
            Strategy::NetworkOnly => self.network_only(url).await,
            Strategy::NetworkThenCache => self.network_then_cache(url).await,
            Strategy::CacheThenNetwork => self.cache_then_network(url).await,
        }
    }

    /// Straight to the network; failure propagates untouched.
    async fn network_only(&self, url: &Url) -> Result<Served, Error> {
        let response = self
            .transport
            .fetch(url)
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(Served::from_network(response))
    }

    /// Fresh-first. The cache write happens off the response path; the
    /// cached copy only matters the next time the network is down.
    async fn network_then_cache(&self, url: &Url) -> Result<Served, Error> {
        let key = request_key(url);

        match self.transport.fetch(url).await {
            Ok(response) => {
                if response.is_ok() {
                    self.store_in_background(key, snapshot(&response));
                }
                Ok(Served::from_network(response))
            }
            Err(err) => {
                tracing::debug!(%url, error = %err, "network failed, trying cache fallback");
                if let Some(stored) = self.cache.lookup(&key).await? {
                    return Ok(Served::from_cache(stored));
                }
                if let Some(fallback) = &self.offline_fallback {
                    return Ok(Served::from_cache(fallback.clone()));
                }
                Err(Error::Transport(err.to_string()))
            }
        }
    }

    /// Cache-first with fill-on-miss. A hit is served as-is, never
    /// revalidated; the miss path has no fallback beyond the one fetch.
    async fn cache_then_network(&self, url: &Url) -> Result<Served, Error> {
        let key = request_key(url);

        if let Some(stored) = self.cache.lookup(&key).await? {
            tracing::debug!(%url, "cache hit");
            return Ok(Served::from_cache(stored));
        }

        let response = self
            .transport
            .fetch(url)
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if response.is_ok()
            && let Err(err) = self.cache.put(&key, &snapshot(&response)).await
        {
            // A failed write must not clobber a good response.
            tracing::warn!(%url, error = %err, "cache write failed");
        }

        Ok(Served::from_network(response))
    }

    fn store_in_background(&self, key: String, stored: StoredResponse) {
        let cache = self.cache.clone();
        tokio::spawn(async move {
            if let Err(err) = cache.put(&key, &stored).await {
                tracing::warn!(url = %stored.url, error = %err, "background cache write failed");
            }
        });
    }
}

/// Capture a byte-for-byte snapshot of a network response for storage.
///
/// Header values that are not valid UTF-8 are dropped from the snapshot.
pub(crate) fn snapshot(response: &NetResponse) -> StoredResponse {
    StoredResponse {
        url: response.url.to_string(),
        status: response.status.as_u16(),
        headers: response
            .headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect(),
        body: response.body.to_vec(),
        stored_at: chrono::Utc::now().to_rfc3339(),
    }
}

fn headers_from_pairs(pairs: &[(String, String)]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            headers.append(name, value);
        }
    }
    headers
}
