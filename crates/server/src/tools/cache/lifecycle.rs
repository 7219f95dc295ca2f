//! cache_install and cache_activate tool implementations.

use offcache_client::Lifecycle;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Output from the cache_install tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheInstallOutput {
    /// Lifecycle phase after the event.
    pub phase: String,
    /// Static partition that received the manifest.
    pub partition: String,
    /// Every manifest URL now cached.
    pub cached: Vec<String>,
}

/// Output from the cache_activate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheActivateOutput {
    pub phase: String,
    /// Partitions deleted because they were not current.
    pub deleted: Vec<String>,
    /// Clients that switched to this version.
    pub claimed: usize,
}

/// Implementation of the cache_install tool.
pub async fn install_impl(lifecycle: &Lifecycle) -> Result<CallToolResult, McpError> {
    let report = lifecycle.on_install().await?;
    json_result(&CacheInstallOutput {
        phase: lifecycle.phase().as_str().to_string(),
        partition: report.partition,
        cached: report.cached,
    })
}

/// Implementation of the cache_activate tool.
pub async fn activate_impl(lifecycle: &Lifecycle) -> Result<CallToolResult, McpError> {
    let report = lifecycle.on_activate().await?;
    json_result(&CacheActivateOutput {
        phase: lifecycle.phase().as_str().to_string(),
        deleted: report.deleted,
        claimed: report.claimed,
    })
}
