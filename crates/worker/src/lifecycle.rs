//! Install and activate handling.
//!
//! Install opens the new generation and populates it with the configured
//! pages and static assets, all-or-nothing. Activate wipes every other
//! generation and hands already-open contexts to this worker. Keep activate
//! lean: it is only for work that can't happen while the previous worker is
//! still running.

use std::sync::Arc;

use futures_util::future::try_join_all;
use url::Url;
use waycache_client::{Transport, resolve};
use waycache_core::cache::key::request_key;
use waycache_core::{AppConfig, CacheStore, Error, GenerationCache};

use crate::handler::snapshot;

/// Host takeover primitives.
///
/// The hosting runtime decides what these mean; a worker embedded in an
/// environment without takeover semantics uses [`NoopHost`].
pub trait HostControl: Send + Sync {
    /// Let this worker take over from the previous one without waiting.
    fn skip_waiting(&self) {}

    /// Begin handling already-open contexts immediately, not only new ones.
    fn claim_clients(&self) {}
}

/// Host with no takeover capability.
#[derive(Debug, Default)]
pub struct NoopHost;

impl HostControl for NoopHost {}

/// Drives generation rollover on install and activate signals.
pub struct LifecycleController {
    store: CacheStore,
    transport: Arc<dyn Transport>,
    host: Arc<dyn HostControl>,
    origin: Url,
    generation: String,
    page_paths: Vec<String>,
    static_assets: Vec<String>,
}

impl LifecycleController {
    pub fn from_config(
        store: CacheStore, transport: Arc<dyn Transport>, host: Arc<dyn HostControl>, config: &AppConfig,
    ) -> Result<Self, Error> {
        let origin = Url::parse(&config.site_origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        Ok(Self {
            store,
            transport,
            host,
            origin,
            generation: config.cache_generation.clone(),
            page_paths: config.page_paths.clone(),
            static_assets: config.static_assets.clone(),
        })
    }

    /// Handle the install signal.
    ///
    /// Opens the generation for this deployment and pre-caches every listed
    /// page and static asset. If any resource fails (transport failure or
    /// non-2xx status), the generation is discarded and the error
    /// propagates, so a partially-populated cache never rolls out.
    pub async fn install(&self) -> Result<GenerationCache, Error> {
        self.host.skip_waiting();

        let cache = self.store.open_generation(&self.generation).await?;

        match self.precache(&cache).await {
            Ok(resources) => {
                tracing::info!(generation = %self.generation, resources, "install complete");
                Ok(cache)
            }
            Err(err) => {
                if let Err(cleanup) = self.store.delete_generation(&self.generation).await {
                    tracing::warn!(
                        generation = %self.generation,
                        error = %cleanup,
                        "failed to discard generation after pre-cache failure"
                    );
                }
                Err(err)
            }
        }
    }

    /// Handle the activate signal.
    ///
    /// Deletes every generation except the current one, then claims open
    /// contexts. The wipe completes before this returns, so no request is
    /// ever served from storage that is mid-deletion.
    pub async fn activate(&self) -> Result<(), Error> {
        let removed = self.store.purge_except(&self.generation).await?;
        tracing::info!(generation = %self.generation, removed, "activate complete");

        self.host.claim_clients();
        Ok(())
    }

    async fn precache(&self, cache: &GenerationCache) -> Result<usize, Error> {
        let mut urls = Vec::new();
        for reference in self.page_paths.iter().chain(&self.static_assets) {
            urls.push(resolve(&self.origin, reference).map_err(|e| Error::InvalidUrl(e.to_string()))?);
        }

        let total = urls.len();
        try_join_all(urls.into_iter().map(|url| self.fetch_into(cache, url))).await?;
        Ok(total)
    }

    async fn fetch_into(&self, cache: &GenerationCache, url: Url) -> Result<(), Error> {
        let response = self
            .transport
            .fetch(&url)
            .await
            .map_err(|err| Error::Precache { url: url.to_string(), reason: err.to_string() })?;

        if !response.is_ok() {
            return Err(Error::Precache { url: url.to_string(), reason: format!("status {}", response.status.as_u16()) });
        }

        cache.put(&request_key(&url), &snapshot(&response)).await
    }
}
