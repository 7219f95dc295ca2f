//! cache_cleanup and cache_partitions tool implementations.

use offcache_client::Lifecycle;
use offcache_core::PartitionInfo;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Output from the cache_cleanup tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheCleanupOutput {
    /// Stale partitions removed by this sweep.
    pub deleted: Vec<String>,
}

/// Output from the cache_partitions tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePartitionsOutput {
    pub phase: String,
    pub current_static: String,
    pub current_dynamic: String,
    /// All partitions in creation order.
    pub partitions: Vec<PartitionInfo>,
}

/// Implementation of the cache_cleanup tool.
pub async fn cleanup_impl(lifecycle: &Lifecycle) -> Result<CallToolResult, McpError> {
    let deleted = lifecycle.cleanup_task().run_once().await?;
    json_result(&CacheCleanupOutput { deleted })
}

/// Implementation of the cache_partitions tool.
pub async fn partitions_impl(lifecycle: &Lifecycle) -> Result<CallToolResult, McpError> {
    let partitions = lifecycle.partitions().await?;
    let names = lifecycle.names();
    json_result(&CachePartitionsOutput {
        phase: lifecycle.phase().as_str().to_string(),
        current_static: names.static_name().to_string(),
        current_dynamic: names.dynamic_name().to_string(),
        partitions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{StubNetwork, lifecycle, output};
    use offcache_core::CacheStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_cleanup_removes_stale_versions_only() {
        let (store, lifecycle) = lifecycle(Arc::new(StubNetwork::site()));
        for name in ["app-static-v2", "app-dynamic-v1", "notes"] {
            store.open(name).await.unwrap();
        }

        let out: CacheCleanupOutput = output(&cleanup_impl(&lifecycle).await.unwrap());
        assert_eq!(out.deleted, vec!["app-dynamic-v1"]);
        assert_eq!(store.keys().await.unwrap(), vec!["app-static-v2", "notes"]);
    }

    #[tokio::test]
    async fn test_partitions_lists_counts() {
        let (_, lifecycle) = lifecycle(Arc::new(StubNetwork::site()));
        lifecycle.on_install().await.unwrap();

        let out: CachePartitionsOutput = output(&partitions_impl(&lifecycle).await.unwrap());
        assert_eq!(out.current_static, "app-static-v2");
        assert_eq!(out.current_dynamic, "app-dynamic-v2");
        assert_eq!(out.partitions.len(), 1);
        assert_eq!(out.partitions[0].entries, 2);
    }
}
