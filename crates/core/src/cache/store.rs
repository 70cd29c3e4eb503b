//! Key-value store abstraction the engine deletes from.

use super::key::{CacheKey, WildcardPattern};
use crate::Error;

/// Delete operations against a key-value store.
///
/// Both operations must be atomic on the store side; the engine never
/// serializes concurrent purges itself. Backend failures come back as
/// `Error::Store`.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Delete one key. Returns 1 if it existed, 0 otherwise.
    async fn delete_one(&self, key: &CacheKey) -> Result<u64, Error>;

    /// Delete every key matching `pattern` in one indivisible operation.
    ///
    /// Returns the number of keys removed; 0 means nothing matched.
    async fn delete_by_pattern(&self, pattern: &WildcardPattern) -> Result<u64, Error>;
}
