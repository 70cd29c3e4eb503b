//! cache_purge tool implementation.
//!
//! Purges the page cache for the whole network, one site, one URL, or the
//! configured custom list.

use purgekit_core::{AppConfig, Error, PurgeResult, PurgeScope, Purger};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which part of the cache to purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PurgeTarget {
    /// Everything under the prefix when `network_admin` is set, else the configured site.
    All,
    /// Every page of one site (`url`, or the configured site).
    Site,
    /// A single page (`url` required).
    Url,
    /// The configured custom purge list plus any extra `patterns`.
    Custom,
}

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// What to purge.
    pub scope: PurgeTarget,

    /// Page or site URL, for the `url` and `site` scopes.
    pub url: Option<String>,

    /// Also purge the page's feed. Feeds share the page's key.
    pub include_feed: Option<bool>,

    /// Purge across every site (only meaningful for `all`).
    pub network_admin: Option<bool>,

    /// Extra paths for the `custom` scope; may contain `*`.
    pub patterns: Option<Vec<String>>,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of keys deleted.
    pub keys_deleted: u64,

    /// Whether anything was deleted.
    pub found: bool,
}

impl From<PurgeResult> for CachePurgeOutput {
    fn from(result: PurgeResult) -> Self {
        Self { keys_deleted: result.keys_deleted, found: result.found }
    }
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(
    purger: &Purger, config: &AppConfig, params: CachePurgeParams,
) -> Result<CallToolResult, McpError> {
    let context = config.context(params.network_admin.unwrap_or(false));

    let result = match params.scope {
        PurgeTarget::All => purger.purge(PurgeScope::All, &context).await?,
        PurgeTarget::Site => {
            let base_url = params.url.unwrap_or_else(|| config.site_url.clone());
            purger.purge(PurgeScope::Site { base_url }, &context).await?
        }
        PurgeTarget::Url => {
            let url = params
                .url
                .ok_or_else(|| Error::InvalidInput("url is required for the url scope".to_string()))?;
            let scope = PurgeScope::Url { url, include_feed: params.include_feed.unwrap_or(true) };
            purger.purge(scope, &context).await?
        }
        PurgeTarget::Custom => {
            let extra = params.patterns.unwrap_or_default();
            let append = move |mut urls: Vec<String>, _allow_wildcard: bool| {
                urls.extend(extra.iter().cloned());
                urls
            };
            purger.custom_purge(&config.purge_url, &append, &context).await?
        }
    };

    let output = CachePurgeOutput::from(result);
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
