//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PURGEKIT_*)
//! 2. TOML config file (if PURGEKIT_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::{PurgeContext, parse_purge_urls};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PURGEKIT_*)
/// 2. TOML config file (if PURGEKIT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Redis host holding the page cache.
    ///
    /// Set via PURGEKIT_REDIS_HOSTNAME environment variable.
    #[serde(default = "default_redis_hostname")]
    pub redis_hostname: String,

    /// Redis port.
    ///
    /// Set via PURGEKIT_REDIS_PORT environment variable.
    #[serde(default = "default_redis_port")]
    pub redis_port: u16,

    /// Prefix the caching layer puts in front of every key.
    ///
    /// Set via PURGEKIT_REDIS_PREFIX environment variable.
    #[serde(default = "default_redis_prefix")]
    pub redis_prefix: String,

    /// Extra paths to purge on a custom purge, one per line.
    ///
    /// Set via PURGEKIT_PURGE_URL environment variable.
    #[serde(default)]
    pub purge_url: String,

    /// Connect timeout in milliseconds.
    ///
    /// Set via PURGEKIT_CONNECT_TIMEOUT_MS environment variable.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Base URL of the current site.
    ///
    /// Set via PURGEKIT_SITE_URL environment variable.
    #[serde(default = "default_site_url")]
    pub site_url: String,
}

fn default_redis_hostname() -> String {
    "127.0.0.1".into()
}

fn default_redis_port() -> u16 {
    6379
}

fn default_redis_prefix() -> String {
    "nginx-cache:".into()
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_site_url() -> String {
    "http://localhost/".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            redis_hostname: default_redis_hostname(),
            redis_port: default_redis_port(),
            redis_prefix: default_redis_prefix(),
            purge_url: String::new(),
            connect_timeout_ms: default_connect_timeout_ms(),
            site_url: default_site_url(),
        }
    }
}

/// Immutable connection settings handed to the engine at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    /// Key prefix, already trimmed.
    pub prefix: String,
    pub connect_timeout: Duration,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>, port: u16, prefix: &str, connect_timeout: Duration) -> Self {
        Self { host: host.into(), port, prefix: prefix.trim().to_string(), connect_timeout }
    }
}

impl AppConfig {
    /// Connect timeout as Duration for use with tokio.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Connection settings for [`crate::cache::Purger::connect`].
    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig::new(&self.redis_hostname, self.redis_port, &self.redis_prefix, self.connect_timeout())
    }

    /// The configured custom purge list, split into entries.
    pub fn purge_urls(&self) -> Vec<String> {
        parse_purge_urls(&self.purge_url)
    }

    /// Purge context for the configured site.
    pub fn context(&self, network_admin: bool) -> PurgeContext {
        PurgeContext { site_url: self.site_url.clone(), network_admin }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PURGEKIT_`
    /// 2. TOML file from `PURGEKIT_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("PURGEKIT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PURGEKIT_")
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
        assert_eq!(config.redis_hostname, "127.0.0.1");
        assert_eq!(config.redis_port, 6379);
        assert_eq!(config.redis_prefix, "nginx-cache:");
        assert!(config.purge_url.is_empty());
        assert_eq!(config.connect_timeout_ms, 5_000);
        assert_eq!(config.site_url, "http://localhost/");
    }

    #[test]
    fn test_connect_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_connection_trims_prefix() {
        let config = AppConfig { redis_prefix: "  nginx-cache:  ".into(), ..Default::default() };
        let conn = config.connection();
        assert_eq!(conn.prefix, "nginx-cache:");
        assert_eq!(conn.host, "127.0.0.1");
        assert_eq!(conn.port, 6379);
    }

    #[test]
    fn test_purge_urls_split() {
        let config = AppConfig { purge_url: "/about/\r\n/blog/*\n".into(), ..Default::default() };
        assert_eq!(config.purge_urls(), vec!["/about/".to_string(), "/blog/*".to_string()]);
    }

    #[test]
    fn test_load_from_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PURGEKIT_REDIS_PORT", "6380");
            jail.set_env("PURGEKIT_REDIS_PREFIX", "page:");
            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.redis_port, 6380);
            assert_eq!(config.redis_prefix, "page:");
            assert_eq!(config.redis_hostname, "127.0.0.1");
            Ok(())
        });
    }

    #[test]
    fn test_load_from_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "purgekit.toml",
                r#"
                redis_hostname = "cache.internal"
                site_url = "https://example.com/"
                "#,
            )?;
            jail.set_env("PURGEKIT_CONFIG_FILE", "purgekit.toml");
            jail.set_env("PURGEKIT_SITE_URL", "https://www.example.com/");
            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.redis_hostname, "cache.internal");
            assert_eq!(config.site_url, "https://www.example.com/");
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PURGEKIT_REDIS_PORT", "0");
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid { .. })));
            Ok(())
        });
    }
}
