//! Cache key derivation.
//!
//! Keys follow the layout the page cache writes:
//! `<prefix><scheme>GET<host><path>`, e.g. `nginx-cache:httpGETexample.com/`.
//! Only the request method `GET` participates, so only GET responses can be
//! targeted. Components are concatenated as given; case, trailing slashes and
//! percent-encoding are never normalized here.

use std::fmt;

use crate::Error;

/// The only request method that is ever part of a key.
pub const KEY_METHOD: &str = "GET";

/// Glob character that marks a wildcard purge.
pub const WILDCARD: char = '*';

/// Canonical key of one cached response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key template with at least one `*`, matched by the store's glob syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WildcardPattern(String);

impl WildcardPattern {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a caller-supplied path should be routed to a pattern delete.
///
/// There is no escape for a literal `*` in a real path segment.
pub fn is_wildcard(path: &str) -> bool {
    path.contains(WILDCARD)
}

fn concat(prefix: &str, scheme: &str, host: &str, tail: &str) -> Result<String, Error> {
    if scheme.is_empty() || host.is_empty() {
        return Err(Error::MalformedUrl(format!("scheme and host are required (scheme={scheme:?}, host={host:?})")));
    }
    Ok(format!("{prefix}{scheme}{KEY_METHOD}{host}{tail}"))
}

/// Derive the exact key for a GET response.
pub fn derive_key(prefix: &str, scheme: &str, host: &str, path: &str) -> Result<CacheKey, Error> {
    concat(prefix, scheme, host, path).map(CacheKey)
}

/// Derive a wildcard pattern; `path_or_glob` must contain `*`.
pub fn derive_pattern(prefix: &str, scheme: &str, host: &str, path_or_glob: &str) -> Result<WildcardPattern, Error> {
    if !is_wildcard(path_or_glob) {
        return Err(Error::InvalidPattern(format!("{path_or_glob:?} has no '{WILDCARD}'")));
    }
    concat(prefix, scheme, host, path_or_glob).map(WildcardPattern)
}

/// Pattern matching every key under `prefix`, across all hosts.
pub fn derive_all_pattern(prefix: &str) -> WildcardPattern {
    WildcardPattern(format!("{prefix}{WILDCARD}"))
}
