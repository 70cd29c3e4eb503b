//! In-process cache store.
//!
//! Holds keys in an ordered set behind a mutex and matches patterns with the
//! same glob rules Redis uses for `KEYS`, compiled with `globset`. Useful for
//! tests and for embedding the engine without a Redis server.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard};

use globset::{GlobBuilder, GlobMatcher};

use super::key::{CacheKey, WildcardPattern};
use super::store::CacheStore;
use crate::Error;

#[derive(Debug, Default)]
struct Inner {
    keys: BTreeSet<String>,
    /// Keys or patterns whose delete should fail.
    failing: HashSet<String>,
}

/// Cache store kept in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the given keys.
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        for key in keys {
            store.insert(key);
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert(&self, key: impl Into<String>) {
        self.lock().keys.insert(key.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.lock().keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All keys, in order.
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys.iter().cloned().collect()
    }

    /// Make deletes of this exact key or pattern fail with `Error::Store`.
    pub fn fail_on(&self, key_or_pattern: impl Into<String>) {
        self.lock().failing.insert(key_or_pattern.into());
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryStore {
    async fn delete_one(&self, key: &CacheKey) -> Result<u64, Error> {
        let mut inner = self.lock();
        if inner.failing.contains(key.as_str()) {
            return Err(Error::Store(format!("simulated failure deleting {key}")));
        }
        Ok(u64::from(inner.keys.remove(key.as_str())))
    }

    async fn delete_by_pattern(&self, pattern: &WildcardPattern) -> Result<u64, Error> {
        let mut inner = self.lock();
        if inner.failing.contains(pattern.as_str()) {
            return Err(Error::Store(format!("simulated failure deleting {pattern}")));
        }
        let matcher = compile_pattern(pattern.as_str())?;
        let before = inner.keys.len();
        inner.keys.retain(|key| !matcher.is_match(key));
        Ok((before - inner.keys.len()) as u64)
    }
}

/// Compile a Redis `KEYS` pattern into a matcher.
///
/// Wildcards cross `/`. `[^...]` negates like `[!...]`.
/// Braces are literal in Redis, so they are escaped before compiling.
fn compile_pattern(pattern: &str) -> Result<GlobMatcher, Error> {
    let mut glob = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                glob.push(c);
                if let Some(next) = chars.next() {
                    glob.push(next);
                }
            }
            '[' if chars.peek() == Some(&'^') => {
                chars.next();
                glob.push_str("[!");
            }
            '{' | '}' => {
                glob.push('\\');
                glob.push(c);
            }
            _ => glob.push(c),
        }
    }

    let matcher = GlobBuilder::new(&glob)
        .literal_separator(false)
        .backslash_escape(true)
        .build()
        .map_err(|e| Error::InvalidPattern(format!("{pattern}: {e}")))?
        .compile_matcher();
    Ok(matcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::key::{derive_all_pattern, derive_key, derive_pattern};

    fn glob(pattern: &str, text: &str) -> bool {
        compile_pattern(pattern).unwrap().is_match(text)
    }

    #[test]
    fn test_glob_star() {
        assert!(glob("p:*", "p:httpGETexample.com/"));
        assert!(glob("p:httpGETexample.com/blog/*", "p:httpGETexample.com/blog/a/"));
        assert!(glob("p:httpGETexample.com/blog/*", "p:httpGETexample.com/blog/"));
        assert!(!glob("p:httpGETexample.com/blog/*", "p:httpGETexample.com/about/"));
        assert!(glob("*/feed/", "p:httpGETexample.com/blog/feed/"));
        assert!(!glob("*/feed/", "p:httpGETexample.com/blog/feed/x"));
    }

    #[test]
    fn test_glob_question_and_class() {
        assert!(glob("h?llo", "hello"));
        assert!(!glob("h?llo", "hllo"));
        assert!(glob("h[ae]llo", "hallo"));
        assert!(!glob("h[ae]llo", "hillo"));
        assert!(glob("h[^e]llo", "hallo"));
        assert!(!glob("h[^e]llo", "hello"));
        assert!(glob("h[a-c]llo", "hbllo"));
    }

    #[test]
    fn test_glob_escape() {
        assert!(glob(r"a\*b", "a*b"));
        assert!(!glob(r"a\*b", "axb"));
    }

    #[test]
    fn test_glob_braces_are_literal() {
        assert!(glob("p:/{a,b}/*", "p:/{a,b}/x"));
        assert!(!glob("p:/{a,b}/*", "p:/a/x"));
    }

    #[test]
    fn test_compile_pattern_unterminated_class() {
        assert!(matches!(compile_pattern("p:[abc"), Err(Error::InvalidPattern(_))));
    }

    #[test]
    fn test_glob_exact() {
        assert!(glob("abc", "abc"));
        assert!(!glob("abc", "abcd"));
        assert!(!glob("abcd", "abc"));
    }

    #[tokio::test]
    async fn test_delete_one() {
        let key = derive_key("p:", "http", "example.com", "/").unwrap();
        let store = MemoryStore::with_keys([key.to_string()]);

        assert_eq!(store.delete_one(&key).await.unwrap(), 1);
        assert!(!store.contains(key.as_str()));
        assert_eq!(store.delete_one(&key).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_by_pattern_counts() {
        let store = MemoryStore::with_keys([
            "p:httpGETexample.com/blog/a/",
            "p:httpGETexample.com/blog/b/",
            "p:httpGETexample.com/about/",
        ]);
        let pattern = derive_pattern("p:", "http", "example.com", "/blog/*").unwrap();

        assert_eq!(store.delete_by_pattern(&pattern).await.unwrap(), 2);
        assert_eq!(store.delete_by_pattern(&pattern).await.unwrap(), 0);
        assert_eq!(store.keys(), vec!["p:httpGETexample.com/about/".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_all_respects_prefix() {
        let store = MemoryStore::with_keys(["p:httpGETa.com/", "p:httpGETb.com/", "other:httpGETa.com/"]);

        assert_eq!(store.delete_by_pattern(&derive_all_pattern("p:")).await.unwrap(), 2);
        assert_eq!(store.keys(), vec!["other:httpGETa.com/".to_string()]);
    }

    #[tokio::test]
    async fn test_fail_on() {
        let key = derive_key("p:", "http", "example.com", "/").unwrap();
        let store = MemoryStore::with_keys([key.to_string()]);
        store.fail_on(key.as_str());

        assert!(matches!(store.delete_one(&key).await, Err(Error::Store(_))));
        assert!(store.contains(key.as_str()));
    }
}
