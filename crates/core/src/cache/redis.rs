//! Redis connection management and delete commands.
//!
//! This module opens a multiplexed async connection bounded by the configured
//! connect timeout and issues `DEL` for exact keys. Wildcard deletes run as a
//! Lua script so matching and deleting happen as one step on the server.

use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Script};

use super::key::{CacheKey, WildcardPattern};
use super::store::CacheStore;
use crate::Error;
use crate::config::ConnectionConfig;

/// Deletes every key matching `KEYS[1]` and returns how many were removed.
const DELETE_BY_PATTERN_LUA: &str = r"
local k = 0
for i, name in ipairs(redis.call('KEYS', KEYS[1]))
do
    redis.call('DEL', name)
    k = k + 1
end
return k
";

/// Redis-backed cache store.
///
/// Wraps a multiplexed connection, cloned per command so concurrent purges
/// share one socket.
pub struct RedisStore {
    conn: MultiplexedConnection,
    delete_script: Script,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Connect to the configured Redis server.
    ///
    /// The connect and the initial `PING` together must finish within
    /// `config.connect_timeout`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connection` if the server is unreachable, rejects the
    /// connection, or does not answer in time.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self, Error> {
        let client =
            redis::Client::open((config.host.as_str(), config.port)).map_err(|e| Error::Connection(e.to_string()))?;

        let connect = async {
            let mut conn = client.get_multiplexed_async_connection().await?;
            let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<_, redis::RedisError>(conn)
        };

        let conn = tokio::time::timeout(config.connect_timeout, connect)
            .await
            .map_err(|_| {
                Error::Connection(format!(
                    "timed out connecting to {}:{} after {}ms",
                    config.host,
                    config.port,
                    config.connect_timeout.as_millis()
                ))
            })?
            .map_err(|e| Error::Connection(format!("{}:{}: {e}", config.host, config.port)))?;

        tracing::debug!(host = %config.host, port = config.port, "connected to redis");

        Ok(Self { conn, delete_script: Script::new(DELETE_BY_PATTERN_LUA) })
    }
}

#[async_trait::async_trait]
impl CacheStore for RedisStore {
    async fn delete_one(&self, key: &CacheKey) -> Result<u64, Error> {
        let mut conn = self.conn.clone();
        let deleted: u64 = conn.del(key.as_str()).await?;
        tracing::debug!(key = %key, deleted, "DEL");
        Ok(deleted)
    }

    async fn delete_by_pattern(&self, pattern: &WildcardPattern) -> Result<u64, Error> {
        let mut conn = self.conn.clone();
        let deleted: u64 = self
            .delete_script
            .key(pattern.as_str())
            .invoke_async(&mut conn)
            .await?;
        tracing::debug!(pattern = %pattern, deleted, "EVAL delete_by_pattern");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::cache::key::{derive_all_pattern, derive_key, derive_pattern};

    /// Live server for the `redis-tests` feature: `PURGEKIT_TEST_REDIS_HOST`
    /// and `PURGEKIT_TEST_REDIS_PORT`, defaulting to `127.0.0.1:6379`.
    fn local_config() -> ConnectionConfig {
        let host = std::env::var("PURGEKIT_TEST_REDIS_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PURGEKIT_TEST_REDIS_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(6379);
        ConnectionConfig::new(host, port, "purgekit-test:", Duration::from_secs(2))
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Port 1 is reserved and never has a Redis server behind it.
        let config = ConnectionConfig::new("127.0.0.1", 1, "p:", Duration::from_millis(500));
        let result = RedisStore::connect(&config).await;
        assert!(matches!(result, Err(Error::Connection(_))));
    }

    #[tokio::test]
    #[cfg_attr(not(feature = "redis-tests"), ignore = "requires a running Redis server")]
    async fn test_delete_one_and_idempotence() {
        let store = RedisStore::connect(&local_config()).await.unwrap();
        let key = derive_key("purgekit-test:", "http", "example.com", "/").unwrap();

        let mut conn = store.conn.clone();
        let _: () = conn.set(key.as_str(), "cached").await.unwrap();

        assert_eq!(store.delete_one(&key).await.unwrap(), 1);
        assert_eq!(store.delete_one(&key).await.unwrap(), 0);
    }

    #[tokio::test]
    #[cfg_attr(not(feature = "redis-tests"), ignore = "requires a running Redis server")]
    async fn test_delete_by_pattern_counts() {
        let store = RedisStore::connect(&local_config()).await.unwrap();
        let mut conn = store.conn.clone();
        for path in ["/blog/a/", "/blog/b/", "/about/"] {
            let key = derive_key("purgekit-test:", "http", "example.com", path).unwrap();
            let _: () = conn.set(key.as_str(), "cached").await.unwrap();
        }

        let pattern = derive_pattern("purgekit-test:", "http", "example.com", "/blog/*").unwrap();
        assert_eq!(store.delete_by_pattern(&pattern).await.unwrap(), 2);
        assert_eq!(store.delete_by_pattern(&pattern).await.unwrap(), 0);

        let about = derive_key("purgekit-test:", "http", "example.com", "/about/").unwrap();
        assert_eq!(store.delete_one(&about).await.unwrap(), 1);
    }

    #[tokio::test]
    #[cfg_attr(not(feature = "redis-tests"), ignore = "requires a running Redis server")]
    async fn test_delete_all_spares_other_prefixes() {
        let store = RedisStore::connect(&local_config()).await.unwrap();
        let mut conn = store.conn.clone();
        for key in ["purgekit-all:httpGETa.com/", "purgekit-all:httpsGETb.com/x/", "purgekit-keep:httpGETa.com/"] {
            let _: () = conn.set(key, "cached").await.unwrap();
        }

        let all = derive_all_pattern("purgekit-all:");
        assert_eq!(store.delete_by_pattern(&all).await.unwrap(), 2);
        assert_eq!(store.delete_by_pattern(&all).await.unwrap(), 0);

        let kept: bool = conn.exists("purgekit-keep:httpGETa.com/").await.unwrap();
        assert!(kept);
        let _: () = conn.del("purgekit-keep:httpGETa.com/").await.unwrap();
    }
}
