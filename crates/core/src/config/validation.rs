//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::cache::parse_url;
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
    /// - `redis_hostname` is empty
    /// - `redis_port` is 0
    /// - `connect_timeout_ms` is less than 100ms or exceeds 60 seconds
    /// - `site_url` has no scheme or host
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.redis_hostname.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "redis_hostname".into(), reason: "must not be empty".into() });
        }

        if self.redis_port == 0 {
            return Err(ConfigError::Invalid { field: "redis_port".into(), reason: "must be greater than 0".into() });
        }

        if self.connect_timeout_ms < 100 {
            return Err(ConfigError::Invalid {
                field: "connect_timeout_ms".into(),
                reason: "must be at least 100ms".into(),
            });
        }
        if self.connect_timeout_ms > 60_000 {
            return Err(ConfigError::Invalid {
                field: "connect_timeout_ms".into(),
                reason: "must not exceed 60 seconds (60000ms)".into(),
            });
        }

        if let Err(e) = parse_url(&self.site_url) {
            return Err(ConfigError::Invalid { field: "site_url".into(), reason: e.to_string() });
        }

        if self.redis_prefix.trim().is_empty() {
            tracing::warn!(
                redis_hostname = %self.redis_hostname,
                "redis_prefix is empty; a network-wide purge will match every key in the database"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_hostname() {
        let config = AppConfig { redis_hostname: "  ".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "redis_hostname"));
    }

    #[test]
    fn test_validate_port_zero() {
        let config = AppConfig { redis_port: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "redis_port"));
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { connect_timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "connect_timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { connect_timeout_ms: 60_001, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "connect_timeout_ms"));
    }

    #[test]
    fn test_validate_site_url_without_host() {
        let config = AppConfig { site_url: "/just/a/path".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "site_url"));
    }

    #[test]
    fn test_validate_empty_prefix_allowed() {
        let config = AppConfig { redis_prefix: String::new(), ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig { connect_timeout_ms: 100, redis_port: 1, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_max_values() {
        let config = AppConfig { connect_timeout_ms: 60_000, redis_port: u16::MAX, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
