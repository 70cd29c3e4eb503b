//! cache_key tool implementation.
//!
//! Shows the exact key a URL purge would delete, without deleting anything.

use purgekit_core::{Error, Purger};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the cache_key tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeyParams {
    /// The page URL.
    pub url: String,
}

/// Output from the cache_key tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeyOutput {
    /// The derived cache key.
    pub key: String,
}

/// Implementation of the cache_key tool.
pub fn key_impl(purger: &Purger, params: CacheKeyParams) -> Result<CallToolResult, McpError> {
    let key = purger.key_for_url(&params.url)?;

    let output = CacheKeyOutput { key: key.to_string() };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize key: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use purgekit_core::cache::{MemoryAudit, MemoryStore};

    fn purger() -> Purger {
        Purger::with_store("nginx-cache:", Arc::new(MemoryStore::new()), Arc::new(MemoryAudit::new()))
    }

    #[test]
    fn test_key_impl_derives_key() {
        let result = key_impl(&purger(), CacheKeyParams { url: "http://example.com/".to_string() }).unwrap();
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        let output: CacheKeyOutput = serde_json::from_str(text).unwrap();
        assert_eq!(output.key, "nginx-cache:httpGETexample.com/");
    }

    #[test]
    fn test_key_impl_malformed() {
        let result = key_impl(&purger(), CacheKeyParams { url: "not a url".to_string() });
        assert!(result.is_err());
    }
}
