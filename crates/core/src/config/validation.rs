//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `site_origin` is not a valid http(s) URL with a host
    /// - `cache_generation` or `user_agent` is empty
    /// - a page path does not start with `/`
    /// - a routing pattern does not compile as a regex
    /// - `timeout_ms` is outside [100ms, 5 minutes]
    /// - `max_redirects` exceeds 20
    pub fn validate(&self) -> Result<(), ConfigError> {
        let origin = url::Url::parse(&self.site_origin)
            .map_err(|e| ConfigError::Invalid { field: "site_origin".into(), reason: e.to_string() })?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                field: "site_origin".into(),
                reason: format!("unsupported scheme: {}", origin.scheme()),
            });
        }
        if origin.host_str().is_none() {
            return Err(ConfigError::Invalid { field: "site_origin".into(), reason: "must have a host".into() });
        }

        if self.cache_generation.is_empty() {
            return Err(ConfigError::Invalid { field: "cache_generation".into(), reason: "must not be empty".into() });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        for path in &self.page_paths {
            if !path.starts_with('/') {
                return Err(ConfigError::Invalid {
                    field: "page_paths".into(),
                    reason: format!("{path:?} must start with '/'"),
                });
            }
        }

        validate_patterns("network_only_patterns", &self.network_only_patterns)?;
        validate_patterns("network_then_cache_patterns", &self.network_then_cache_patterns)?;

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.max_redirects > 20 {
            return Err(ConfigError::Invalid { field: "max_redirects".into(), reason: "must not exceed 20".into() });
        }

        Ok(())
    }
}

fn validate_patterns(field: &str, patterns: &[String]) -> Result<(), ConfigError> {
    for pattern in patterns {
        regex::Regex::new(pattern)
            .map_err(|e| ConfigError::Invalid { field: field.into(), reason: e.to_string() })?;
    }
    Ok(())
}
