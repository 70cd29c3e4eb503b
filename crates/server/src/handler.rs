//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::cache::{CacheKeyParams, CachePurgeParams, key_impl, purge_impl};
use purgekit_core::{AppConfig, Purger};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for purgekit.
#[derive(Clone)]
pub struct PurgeServer {
    tool_router: ToolRouter<Self>,
    purger: Arc<Purger>,
    config: Arc<AppConfig>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl PurgeServer {
    /// Create a new server handler around a connected (or degraded) engine.
    pub fn new(purger: Purger, config: AppConfig) -> Self {
        Self { tool_router: Self::tool_router(), purger: Arc::new(purger), config: Arc::new(config) }
    }

    /// Purge cached pages.
    ///
    /// Store failures are reported in the audit log and count as nothing deleted.
    #[tool(
        description = "Purge cached pages. scope is one of all, site, url, custom. Returns keys_deleted and found."
    )]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.purger, &self.config, params.0).await
    }

    /// Show the cache key a URL purge would delete.
    #[tool(description = "Derive the cache key for a URL without deleting anything.")]
    async fn cache_key(&self, params: Parameters<CacheKeyParams>) -> Result<CallToolResult, McpError> {
        key_impl(&self.purger, params.0)
    }
}

impl ServerHandler for PurgeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "purgekit".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
