//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the lifecycle controller.
use std::sync::Arc;

use offcache_client::Lifecycle;
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

use crate::tools::{
    cache,
    clients::{self, ClientCloseParams},
    notify::{self, NotificationClickParams, PushNotifyParams},
    resource_fetch::{self, ResourceFetchParams},
    sync::{self, BackgroundSyncParams},
};

/// The main MCP server handler for offcache.
#[derive(Clone)]
pub struct OfflineCacheServer {
    lifecycle: Arc<Lifecycle>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl OfflineCacheServer {
    /// Create a new server handler around a running lifecycle.
    pub fn new(lifecycle: Arc<Lifecycle>) -> Self {
        Self { lifecycle, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Fetch a resource through the offline cache. Picks network-first, cache-first or stale-while-revalidate by URL and destination, and reports which one answered."
    )]
    async fn resource_fetch(&self, params: Parameters<ResourceFetchParams>) -> Result<CallToolResult, McpError> {
        resource_fetch::fetch_impl(&self.lifecycle, params.0).await
    }

    #[tool(description = "Run the install event: cache every manifest asset into the static partition, all or nothing.")]
    async fn cache_install(&self) -> Result<CallToolResult, McpError> {
        cache::install_impl(&self.lifecycle).await
    }

    #[tool(description = "Run the activate event: delete obsolete partitions and take control of open clients.")]
    async fn cache_activate(&self) -> Result<CallToolResult, McpError> {
        cache::activate_impl(&self.lifecycle).await
    }

    #[tool(description = "Run one periodic cleanup sweep and return the stale partitions it deleted.")]
    async fn cache_cleanup(&self) -> Result<CallToolResult, McpError> {
        cache::cleanup_impl(&self.lifecycle).await
    }

    #[tool(description = "List cache partitions with entry counts and the current partition names.")]
    async fn cache_partitions(&self) -> Result<CallToolResult, McpError> {
        cache::partitions_impl(&self.lifecycle).await
    }

    #[tool(description = "Forget a client context so it no longer holds back activation.")]
    async fn client_close(&self, params: Parameters<ClientCloseParams>) -> Result<CallToolResult, McpError> {
        clients::close_impl(&self.lifecycle, params.0)
    }

    #[tool(description = "Build the notification shown for a push message. Malformed payloads fall back to defaults.")]
    async fn push_notify(&self, params: Parameters<PushNotifyParams>) -> Result<CallToolResult, McpError> {
        notify::push_impl(params.0)
    }

    #[tool(description = "Resolve a notification click: \"open\" navigates home, anything else dismisses.")]
    async fn notification_click(&self, params: Parameters<NotificationClickParams>) -> Result<CallToolResult, McpError> {
        notify::click_impl(params.0)
    }

    #[tool(description = "Deliver a background sync event. Only the \"background-sync\" tag runs a sync.")]
    async fn background_sync(&self, params: Parameters<BackgroundSyncParams>) -> Result<CallToolResult, McpError> {
        sync::sync_impl(&self.lifecycle, params.0).await
    }
}

impl ServerHandler for OfflineCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "offcache".into(),
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
