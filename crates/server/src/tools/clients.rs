//! client_close tool implementation.

use offcache_client::Lifecycle;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::error::HostError;

/// Parameters for the client_close tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClientCloseParams {
    /// Id the client passed to resource_fetch.
    pub client_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClientCloseOutput {
    pub client_id: String,
    /// False when the id was never registered.
    pub closed: bool,
}

/// Implementation of the client_close tool.
pub fn close_impl(lifecycle: &Lifecycle, params: ClientCloseParams) -> Result<CallToolResult, McpError> {
    if params.client_id.trim().is_empty() {
        return Err(HostError::InvalidInput("client_id cannot be empty".into()).into());
    }
    let closed = lifecycle.disconnect_client(&params.client_id);
    json_result(&ClientCloseOutput { client_id: params.client_id, closed })
}
