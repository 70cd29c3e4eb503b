//! Page cache invalidation against a key-value store.
//!
//! This module derives the keys the page cache writes and deletes them:
//!
//! - Deterministic key derivation (`<prefix><scheme>GET<host><path>`)
//! - Exact deletes with `DEL`, wildcard deletes as one server-side script
//! - Per-site, network-wide, single URL and custom list purges
//! - An audit trail of every decision

pub mod audit;
pub mod key;
pub mod memory;
pub mod purge;
pub mod redis;
pub mod store;
pub mod url;

pub use crate::Error;

pub use self::audit::{AuditEntry, AuditLog, MemoryAudit, Severity, TracingAudit};
pub use self::key::{CacheKey, WildcardPattern, derive_all_pattern, derive_key, derive_pattern, is_wildcard};
pub use self::memory::MemoryStore;
pub use self::purge::{
    NoFilter, PurgeContext, PurgeResult, PurgeScope, PurgeUrlFilter, Purger, StoreState, parse_purge_urls,
};
pub use self::redis::RedisStore;
pub use self::store::CacheStore;
pub use self::url::{UrlParts, parse_url};
