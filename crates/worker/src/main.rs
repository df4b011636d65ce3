//! waycache smoke binary.
//!
//! Runs the full lifecycle against the configured site: install
//! (pre-cache), activate (generation cleanup), then serves each URL given on
//! the command line through the request handler. Logging goes to stderr,
//! controlled by RUST_LOG.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use waycache_client::{HttpTransport, Method, TransportConfig, resolve};
use waycache_core::{AppConfig, CacheStore};
use waycache_worker::{Classifier, LifecycleController, NoopHost, RequestHandler};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load()?;
    tracing::info!(origin = %config.site_origin, generation = %config.cache_generation, "starting waycache");

    let store = CacheStore::open(&config.db_path).await?;
    let transport = Arc::new(HttpTransport::new(TransportConfig {
        user_agent: config.user_agent.clone(),
        timeout: config.timeout(),
        max_redirects: config.max_redirects,
    })?);

    let lifecycle = LifecycleController::from_config(store, transport.clone(), Arc::new(NoopHost), &config)?;
    let cache = lifecycle.install().await?;
    lifecycle.activate().await?;

    let origin = url::Url::parse(&config.site_origin)?;
    let handler = RequestHandler::new(Classifier::from_config(&config)?, cache, transport);

    for arg in std::env::args().skip(1) {
        let url = resolve(&origin, &arg)?;
        let served = handler.handle(&Method::GET, &url).await?;
        println!("{url} {} {} bytes ({:?})", served.status.as_u16(), served.body.len(), served.source);
    }

    Ok(())
}
