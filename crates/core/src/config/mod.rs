//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (WAYCACHE_*)
//! 2. TOML config file (if WAYCACHE_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The route rule lists are immutable for the process lifetime: they are
//! loaded once at startup and compiled into the classifier. There is no
//! dynamic rule registration.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (WAYCACHE_*)
/// 2. TOML config file (if WAYCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin of the site this worker serves, e.g. `https://example.com`.
    ///
    /// Page-path routing and pre-caching are evaluated against this origin.
    #[serde(default = "default_site_origin")]
    pub site_origin: String,

    /// Name of the current cache generation.
    ///
    /// Opaque string, unique per deployment (the site typically appends a
    /// build timestamp). Changing it across deployments is what triggers
    /// generation rollover: the new name is populated on install and every
    /// other name is wiped on activate.
    #[serde(default = "default_cache_generation")]
    pub cache_generation: String,

    /// Path to the SQLite cache database.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Same-origin page paths to pre-cache and serve network-then-cache.
    /// Exact path match, e.g. `/`, `/services`, `/contact-us`.
    #[serde(default)]
    pub page_paths: Vec<String>,

    /// Static asset URLs to pre-cache. Absolute or protocol-relative;
    /// cross-origin allowed.
    #[serde(default)]
    pub static_assets: Vec<String>,

    /// Exact URLs (full URL or bare origin) that must never touch the cache.
    #[serde(default)]
    pub network_only_urls: Vec<String>,

    /// Regex patterns, matched against origin + path, that must never touch
    /// the cache.
    #[serde(default)]
    pub network_only_patterns: Vec<String>,

    /// Exact URLs (full URL or bare origin) served network-then-cache.
    #[serde(default)]
    pub network_then_cache_urls: Vec<String>,

    /// Regex patterns, matched against origin + path, served
    /// network-then-cache.
    #[serde(default)]
    pub network_then_cache_patterns: Vec<String>,

    /// User-Agent string for outgoing requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Network request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_site_origin() -> String {
    "https://example.com".into()
}

fn default_cache_generation() -> String {
    "waycache-dev".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./waycache.sqlite")
}

fn default_user_agent() -> String {
    "waycache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_redirects() -> usize {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            site_origin: default_site_origin(),
            cache_generation: default_cache_generation(),
            db_path: default_db_path(),
            page_paths: Vec::new(),
            static_assets: Vec::new(),
            network_only_urls: Vec::new(),
            network_only_patterns: Vec::new(),
            network_then_cache_urls: Vec::new(),
            network_then_cache_patterns: Vec::new(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `WAYCACHE_`
    /// 2. TOML file from `WAYCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("WAYCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("WAYCACHE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.site_origin, "https://example.com");
        assert_eq!(config.cache_generation, "waycache-dev");
        assert_eq!(config.db_path, PathBuf::from("./waycache.sqlite"));
        assert_eq!(config.user_agent, "waycache/0.1");
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.max_redirects, 5);
        assert!(config.page_paths.is_empty());
        assert!(config.static_assets.is_empty());
        assert!(config.network_only_urls.is_empty());
        assert!(config.network_only_patterns.is_empty());
        assert!(config.network_then_cache_urls.is_empty());
        assert!(config.network_then_cache_patterns.is_empty());
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }
}
