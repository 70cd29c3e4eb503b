//! Invalidation engine.
//!
//! Turns a [`PurgeScope`] into exact or wildcard deletes against a
//! [`CacheStore`], writes every outcome to the [`AuditLog`], and hands the
//! caller a [`PurgeResult`]. Store failures are logged and counted as zero
//! deletions; only a URL the engine cannot derive a key from is returned as
//! an error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::audit::AuditLog;
use super::key::{CacheKey, WildcardPattern, derive_all_pattern, derive_key, derive_pattern, is_wildcard};
use super::redis::RedisStore;
use super::store::CacheStore;
use super::url::parse_url;
use crate::Error;
use crate::config::ConnectionConfig;

const MARKER: &str = "* * * * *";

/// What the caller wants purged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeScope {
    /// Everything under the prefix for a network admin, else the current site.
    All,
    /// Every key under one site's base URL.
    Site { base_url: String },
    /// The exact key of one URL.
    ///
    /// `include_feed` is accepted for feed-aware callers; feed variants share
    /// the base URL's key, so it does not change what gets deleted.
    Url { url: String, include_feed: bool },
    /// Paths relative to the current site, exact or containing `*`.
    PatternList { patterns: Vec<String> },
}

/// Where a purge was requested from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeContext {
    /// Base URL of the current site.
    pub site_url: String,
    /// The action came from a network-wide admin screen.
    pub network_admin: bool,
}

impl PurgeContext {
    pub fn site(site_url: impl Into<String>) -> Self {
        Self { site_url: site_url.into(), network_admin: false }
    }

    pub fn network(site_url: impl Into<String>) -> Self {
        Self { site_url: site_url.into(), network_admin: true }
    }
}

/// Outcome of one purge call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PurgeResult {
    /// Number of keys removed.
    pub keys_deleted: u64,
    /// `keys_deleted > 0`.
    pub found: bool,
}

impl PurgeResult {
    pub fn from_count(keys_deleted: u64) -> Self {
        Self { keys_deleted, found: keys_deleted > 0 }
    }
}

/// Hook that may extend or replace the custom purge list before it runs.
pub trait PurgeUrlFilter: Send + Sync {
    fn filter(&self, urls: Vec<String>, allow_wildcard: bool) -> Vec<String>;
}

impl<F> PurgeUrlFilter for F
where
    F: Fn(Vec<String>, bool) -> Vec<String> + Send + Sync,
{
    fn filter(&self, urls: Vec<String>, allow_wildcard: bool) -> Vec<String> {
        self(urls, allow_wildcard)
    }
}

/// Filter that passes the list through untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFilter;

impl PurgeUrlFilter for NoFilter {
    fn filter(&self, urls: Vec<String>, _allow_wildcard: bool) -> Vec<String> {
        urls
    }
}

/// Split a newline-separated purge list into entries.
pub fn parse_purge_urls(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.lines().map(str::to_string).collect()
}

/// Connection state of the engine.
#[derive(Clone)]
pub enum StoreState {
    Connected(Arc<dyn CacheStore>),
    /// The last connect attempt failed with `reason`.
    Disconnected { reason: String },
}

/// The invalidation engine.
pub struct Purger {
    prefix: String,
    state: StoreState,
    audit: Arc<dyn AuditLog>,
}

impl std::fmt::Debug for Purger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Purger")
            .field("prefix", &self.prefix)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl Purger {
    /// Connect to Redis and build an engine.
    ///
    /// A failed connect is logged and leaves the engine disconnected; every
    /// purge then becomes a logged no-op until [`Purger::reconnect`] succeeds.
    pub async fn connect(config: &ConnectionConfig, audit: Arc<dyn AuditLog>) -> Self {
        let state = Self::open(config, audit.as_ref()).await;
        Self { prefix: config.prefix.clone(), state, audit }
    }

    /// Build an engine over an existing store.
    pub fn with_store(prefix: &str, store: Arc<dyn CacheStore>, audit: Arc<dyn AuditLog>) -> Self {
        Self { prefix: prefix.trim().to_string(), state: StoreState::Connected(store), audit }
    }

    /// Build an engine that is already disconnected.
    pub fn disconnected(prefix: &str, reason: impl Into<String>, audit: Arc<dyn AuditLog>) -> Self {
        Self { prefix: prefix.trim().to_string(), state: StoreState::Disconnected { reason: reason.into() }, audit }
    }

    /// Try a fresh connect. Returns whether the engine is now connected.
    ///
    /// On failure the previous state is kept only if it was already
    /// connected; a disconnected engine records the new reason.
    pub async fn reconnect(&mut self, config: &ConnectionConfig) -> bool {
        match Self::open(config, self.audit.as_ref()).await {
            StoreState::Connected(store) => {
                self.state = StoreState::Connected(store);
                self.prefix = config.prefix.clone();
            }
            disconnected @ StoreState::Disconnected { .. } => {
                if !self.is_connected() {
                    self.state = disconnected;
                }
            }
        }
        self.is_connected()
    }

    async fn open(config: &ConnectionConfig, audit: &dyn AuditLog) -> StoreState {
        match RedisStore::connect(config).await {
            Ok(store) => StoreState::Connected(Arc::new(store)),
            Err(e) => {
                let reason = e.to_string();
                audit.error(&reason);
                StoreState::Disconnected { reason }
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, StoreState::Connected(_))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Exact key a `PurgeScope::Url` purge of `url` would delete.
    pub fn key_for_url(&self, url: &str) -> Result<CacheKey, Error> {
        let parts = parse_url(url)?;
        derive_key(&self.prefix, &parts.scheme, &parts.host, parts.path_or(""))
    }

    /// Run one purge.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedUrl` if a URL involved has no scheme or host;
    /// the error is also written to the audit log.
    /// Store failures are never returned; they are logged and count as zero.
    pub async fn purge(&self, scope: PurgeScope, context: &PurgeContext) -> Result<PurgeResult, Error> {
        let store = match &self.state {
            StoreState::Connected(store) => store.as_ref(),
            StoreState::Disconnected { reason } => {
                self.audit.info(MARKER);
                self.audit.error(reason);
                return Ok(self.summary(0));
            }
        };

        let result = match scope {
            PurgeScope::All if context.network_admin => Ok(self.purge_everything(store).await),
            PurgeScope::All => self.purge_site(store, &context.site_url).await,
            PurgeScope::Site { base_url } => self.purge_site(store, &base_url).await,
            PurgeScope::Url { url, include_feed: _ } => self.purge_url(store, &url).await,
            PurgeScope::PatternList { patterns } => self.purge_patterns(store, &context.site_url, &patterns).await,
        };
        result.inspect_err(|e| self.audit.error(&e.to_string()))
    }

    /// Parse the configured list, let `filter` adjust it, then purge it.
    pub async fn custom_purge(
        &self, raw_list: &str, filter: &dyn PurgeUrlFilter, context: &PurgeContext,
    ) -> Result<PurgeResult, Error> {
        let patterns = filter.filter(parse_purge_urls(raw_list), true);
        self.purge(PurgeScope::PatternList { patterns }, context).await
    }

    async fn purge_everything(&self, store: &dyn CacheStore) -> PurgeResult {
        self.audit.info(MARKER);
        let pattern = derive_all_pattern(&self.prefix);
        let deleted = self.delete_pattern(store, &pattern).await;
        self.audit.info("* Purged Everything! * ");
        self.summary(deleted)
    }

    async fn purge_site(&self, store: &dyn CacheStore, base_url: &str) -> Result<PurgeResult, Error> {
        let parts = parse_url(base_url)?;
        let glob = format!("{}*", parts.path_or("/"));
        let pattern = derive_pattern(&self.prefix, &parts.scheme, &parts.host, &glob)?;

        self.audit.info(MARKER);
        let deleted = self.delete_pattern(store, &pattern).await;
        self.audit.info(&format!("* {base_url} Purged! * "));
        Ok(self.summary(deleted))
    }

    async fn purge_url(&self, store: &dyn CacheStore, url: &str) -> Result<PurgeResult, Error> {
        let key = self.key_for_url(url)?;

        self.audit.info(MARKER);
        let deleted = self.delete_key(store, &key).await;
        if deleted > 0 {
            self.audit.info(&format!("- Purged URL | {url}"));
        } else {
            self.audit.error(&format!("- Cache Not Found | {url}"));
        }
        Ok(self.summary(deleted))
    }

    async fn purge_patterns(
        &self, store: &dyn CacheStore, site_url: &str, patterns: &[String],
    ) -> Result<PurgeResult, Error> {
        let site = parse_url(site_url)?;
        let origin = format!("{}://{}", site.scheme, site.host);

        self.audit.info(MARKER);
        let mut total = 0;
        for entry in patterns.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
            if is_wildcard(entry) {
                let pattern = derive_pattern(&self.prefix, &site.scheme, &site.host, entry)?;
                let deleted = self.delete_pattern(store, &pattern).await;
                if deleted > 0 {
                    self.audit.info(&format!("- Purge Wild Card URL | {origin}{entry} | {deleted} url purged"));
                } else {
                    self.audit.error(&format!("- Cache Not Found | {origin}{entry}"));
                }
                total += deleted;
            } else {
                let key = derive_key(&self.prefix, &site.scheme, &site.host, entry)?;
                let deleted = self.delete_key(store, &key).await;
                if deleted > 0 {
                    self.audit.info(&format!("- Purge URL | {origin}{entry}"));
                } else {
                    self.audit.error(&format!("- Cache Not Found | {origin}{entry}"));
                }
                total += deleted;
            }
        }
        Ok(self.summary(total))
    }

    async fn delete_key(&self, store: &dyn CacheStore, key: &CacheKey) -> u64 {
        store.delete_one(key).await.unwrap_or_else(|e| {
            self.audit.error(&e.to_string());
            0
        })
    }

    async fn delete_pattern(&self, store: &dyn CacheStore, pattern: &WildcardPattern) -> u64 {
        store.delete_by_pattern(pattern).await.unwrap_or_else(|e| {
            self.audit.error(&e.to_string());
            0
        })
    }

    fn summary(&self, deleted: u64) -> PurgeResult {
        if deleted > 0 {
            self.audit.info(&format!("Total {deleted} urls purged."));
        } else {
            self.audit.info("No Cache found.");
        }
        self.audit.info(MARKER);
        PurgeResult::from_count(deleted)
    }
}
