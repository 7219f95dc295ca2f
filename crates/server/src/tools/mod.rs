//! MCP tool implementations.
//!
//! This module contains all tools exposed by the offcache server.

pub mod cache;
pub mod clients;
pub mod notify;
pub mod resource_fetch;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::HostError;

/// Pretty JSON text content, the shape every tool answers with.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(HostError::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
