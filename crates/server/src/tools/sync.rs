//! background_sync tool implementation.

use offcache_client::Lifecycle;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Parameters for the background_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BackgroundSyncParams {
    /// Sync tag registered by the client.
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BackgroundSyncOutput {
    pub tag: String,
    /// Whether a sync routine ran for this tag.
    pub handled: bool,
}

/// Implementation of the background_sync tool.
pub async fn sync_impl(lifecycle: &Lifecycle, params: BackgroundSyncParams) -> Result<CallToolResult, McpError> {
    let handled = lifecycle.background_sync(&params.tag).await;
    json_result(&BackgroundSyncOutput { tag: params.tag, handled })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{StubNetwork, lifecycle, output};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_sync_tags() {
        let (_, lifecycle) = lifecycle(Arc::new(StubNetwork::site()));

        let params = BackgroundSyncParams { tag: "background-sync".into() };
        let out: BackgroundSyncOutput = output(&sync_impl(&lifecycle, params).await.unwrap());
        assert!(out.handled);

        let params = BackgroundSyncParams { tag: "periodic".into() };
        let out: BackgroundSyncOutput = output(&sync_impl(&lifecycle, params).await.unwrap());
        assert!(!out.handled);
    }
}
