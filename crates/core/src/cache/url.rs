//! URL decomposition into the parts a cache key is built from.
//!
//! Parsing goes through the `url` crate, so the host comes back lowercased
//! and the path percent-encoded the way a browser would send it. Nothing else
//! is rewritten: trailing slashes and query strings are left alone (the
//! query is simply not part of a key). Ports are dropped, matching the
//! `$host` variable the page cache builds its keys from.

use crate::Error;

/// Scheme, host and path of a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    pub scheme: String,
    pub host: String,
    /// `None` when the input had nothing after the authority.
    pub path: Option<String>,
}

impl UrlParts {
    /// Path, or `default` when the URL had none (or an empty one).
    pub fn path_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.path.as_deref() {
            Some(path) if !path.is_empty() => path,
            _ => default,
        }
    }
}

/// Split a URL into scheme, host and path.
///
/// # Errors
///
/// Returns `Error::MalformedUrl` if the input is empty, does not parse, or
/// has no host.
pub fn parse_url(input: &str) -> Result<UrlParts, Error> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(Error::MalformedUrl("empty URL".into()));
    }

    let parsed = url::Url::parse(trimmed).map_err(|e| Error::MalformedUrl(format!("{trimmed}: {e}")))?;

    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => return Err(Error::MalformedUrl(format!("{trimmed}: missing host"))),
    };

    let path = has_explicit_path(trimmed).then(|| parsed.path().to_string());

    Ok(UrlParts { scheme: parsed.scheme().to_string(), host, path })
}

/// `url` always reports `/` for http(s) URLs, so look at the raw input.
fn has_explicit_path(raw: &str) -> bool {
    let Some((_, rest)) = raw.split_once("://") else {
        return false;
    };
    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    rest[authority_end..].starts_with('/')
}
