//! Request classification.
//!
//! Maps a (method, URL) pair to the strategy that resolves it. The rule
//! sets are disjoint in intent but evaluated in a fixed priority order, so
//! overlaps resolve deterministically:
//!
//! network-only > page / network-then-cache > cache-then-network
//!
//! All matching is against origin + path. Query strings and fragments never
//! participate.

use std::collections::HashSet;

use regex::RegexSet;
use url::Url;
use waycache_client::Method;
use waycache_core::AppConfig;
use waycache_core::config::ConfigError;

/// Resolution policy applied to a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Straight to the network; the cache is never read or written.
    NetworkOnly,
    /// Fresh-first: network response wins, cache is the offline fallback.
    NetworkThenCache,
    /// Cache-first: cached entry wins, network fills misses.
    CacheThenNetwork,
}

/// Compiled routing rules.
///
/// Built once from configuration at startup; immutable afterwards.
#[derive(Debug)]
pub struct Classifier {
    site_origin: String,
    page_paths: Vec<String>,
    network_only: HashSet<String>,
    network_only_patterns: RegexSet,
    network_then_cache: HashSet<String>,
    network_then_cache_patterns: RegexSet,
}

impl Classifier {
    /// Compile the rule sets out of configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the site origin does not parse or a
    /// pattern does not compile. `AppConfig::validate` catches both earlier;
    /// this re-check keeps the constructor total for hand-built configs.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let origin = Url::parse(&config.site_origin)
            .map_err(|e| ConfigError::Invalid { field: "site_origin".into(), reason: e.to_string() })?;

        Ok(Self {
            site_origin: origin.origin().ascii_serialization(),
            page_paths: config.page_paths.clone(),
            network_only: config.network_only_urls.iter().cloned().collect(),
            network_only_patterns: compile(&config.network_only_patterns, "network_only_patterns")?,
            network_then_cache: config.network_then_cache_urls.iter().cloned().collect(),
            network_then_cache_patterns: compile(&config.network_then_cache_patterns, "network_then_cache_patterns")?,
        })
    }

    /// Classify one request.
    pub fn classify(&self, method: &Method, url: &Url) -> Strategy {
        // Non-GET requests and non-standard schemes (browser extensions and
        // the like) are non-cacheable by construction.
        if *method != Method::GET || !matches!(url.scheme(), "http" | "https") {
            return Strategy::NetworkOnly;
        }

        let origin = url.origin().ascii_serialization();
        let full = format!("{origin}{}", url.path());

        if self.network_only.contains(&origin)
            || self.network_only.contains(&full)
            || self.network_only_patterns.is_match(&full)
        {
            return Strategy::NetworkOnly;
        }

        if self.is_page(&origin, url.path())
            || self.network_then_cache.contains(&origin)
            || self.network_then_cache.contains(&full)
            || self.network_then_cache_patterns.is_match(&full)
        {
            return Strategy::NetworkThenCache;
        }

        Strategy::CacheThenNetwork
    }

    fn is_page(&self, origin: &str, path: &str) -> bool {
        origin == self.site_origin && self.page_paths.iter().any(|p| p == path)
    }
}

fn compile(patterns: &[String], field: &str) -> Result<RegexSet, ConfigError> {
    RegexSet::new(patterns).map_err(|e| ConfigError::Invalid { field: field.into(), reason: e.to_string() })
}
