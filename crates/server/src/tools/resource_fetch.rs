//! resource_fetch tool implementation.
//!
//! Routes a request through the offline cache and returns the response
//! together with the strategy that produced it.

use offcache_client::Lifecycle;
use offcache_core::{Destination, ResourceRequest, ResponseSource, Strategy, StoredResponse};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::error::HostError;

/// Input parameters for resource_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResourceFetchParams {
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,

    /// HTTP method (default: GET). Only GET responses are cached.
    #[serde(default = "default_method")]
    pub method: String,

    /// Request destination: "document", "style", "script", "image", ...
    #[serde(default)]
    pub destination: Destination,

    /// Client context making the request. Registered on first use.
    #[serde(default)]
    pub client_id: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for resource_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResourceFetchOutput {
    /// The resolved request URL.
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    /// Strategy the router picked; absent when the request passed through.
    pub strategy: Option<Strategy>,
    /// Where the response came from; absent when the request passed through.
    pub source: Option<ResponseSource>,
    /// When the response was written to a partition, if it came from one.
    pub stored_at: Option<String>,
    /// Cache version controlling the requesting client, if any.
    pub controlled_by: Option<String>,
}

impl ResourceFetchOutput {
    fn new(
        request: &ResourceRequest, response: StoredResponse, strategy: Option<Strategy>, source: Option<ResponseSource>,
    ) -> Self {
        Self {
            url: request.url.to_string(),
            status: response.status,
            body: response.body_text(),
            status_text: response.status_text,
            headers: response.headers,
            strategy,
            source,
            stored_at: response.stored_at.map(|t| t.to_rfc3339()),
            controlled_by: None,
        }
    }
}

fn validate_method(method: &str) -> Result<(), HostError> {
    if method.is_empty() || !method.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(HostError::InvalidInput(format!("invalid method: {method:?}")));
    }
    Ok(())
}

/// Implementation of the resource_fetch tool.
pub async fn fetch_impl(lifecycle: &Lifecycle, params: ResourceFetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(HostError::InvalidInput("url cannot be empty".into()).into());
    }
    validate_method(&params.method)?;

    let request = ResourceRequest::resolve(lifecycle.origin(), &params.method, &params.url, params.destination)?;
    let controlled_by = params.client_id.as_deref().and_then(|id| lifecycle.connect_client(id));

    let mut output = match lifecycle.intercept(&request).await {
        Some(resolved) => {
            ResourceFetchOutput::new(&request, resolved.response, Some(resolved.strategy), Some(resolved.source))
        }
        None => {
            let response = lifecycle.passthrough(&request).await?;
            ResourceFetchOutput::new(&request, response, None, None)
        }
    };
    output.controlled_by = controlled_by;

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{StubNetwork, lifecycle, output};
    use offcache_core::CacheStore;
    use std::sync::Arc;

    fn params(url: &str) -> ResourceFetchParams {
        ResourceFetchParams {
            url: url.into(),
            method: default_method(),
            destination: Destination::Empty,
            client_id: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_empty_url() {
        let (_, lifecycle) = lifecycle(Arc::new(StubNetwork::site()));
        assert!(fetch_impl(&lifecycle, params("  ")).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_bad_method() {
        let (_, lifecycle) = lifecycle(Arc::new(StubNetwork::site()));
        let params = ResourceFetchParams { method: "GET /".into(), ..params("/") };
        assert!(fetch_impl(&lifecycle, params).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_static_asset_then_cache() {
        let (_, lifecycle) = lifecycle(Arc::new(StubNetwork::site()));

        let first: ResourceFetchOutput = output(&fetch_impl(&lifecycle, params("/style.css")).await.unwrap());
        assert_eq!(first.strategy, Some(Strategy::CacheFirst));
        assert_eq!(first.source, Some(ResponseSource::Network));
        assert_eq!(first.body, "body{}");

        let second: ResourceFetchOutput = output(&fetch_impl(&lifecycle, params("/style.css")).await.unwrap());
        assert_eq!(second.source, Some(ResponseSource::Cache));
        assert_eq!(second.body, "body{}");
        assert!(second.stored_at.is_some());
    }

    #[tokio::test]
    async fn test_fetch_always_fresh_offline() {
        let network = Arc::new(StubNetwork::site());
        network.set_offline(true);
        let (_, lifecycle) = lifecycle(network);

        let out: ResourceFetchOutput = output(&fetch_impl(&lifecycle, params("/api/contact")).await.unwrap());
        assert_eq!(out.strategy, Some(Strategy::NetworkFirst));
        assert_eq!(out.source, Some(ResponseSource::Fallback));
        assert_eq!(out.status, 503);
        assert_eq!(out.body, "Content not available");
    }

    #[tokio::test]
    async fn test_fetch_post_is_not_cached() {
        let (store, lifecycle) = lifecycle(Arc::new(StubNetwork::site()));
        let params = ResourceFetchParams { method: "post".into(), ..params("/api/contact") };

        let out: ResourceFetchOutput = output(&fetch_impl(&lifecycle, params).await.unwrap());
        assert_eq!(out.status, 200);
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_passthrough() {
        let (store, lifecycle) = lifecycle(Arc::new(StubNetwork::site()));

        let out: ResourceFetchOutput = output(&fetch_impl(&lifecycle, params("data:,hello")).await.unwrap());
        assert!(out.strategy.is_none());
        assert!(out.source.is_none());
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_registers_client() {
        let (_, lifecycle) = lifecycle(Arc::new(StubNetwork::site()));
        let params = ResourceFetchParams { client_id: Some("tab".into()), ..params("/style.css") };

        let before: ResourceFetchOutput = output(&fetch_impl(&lifecycle, params.clone()).await.unwrap());
        assert!(before.controlled_by.is_none());

        lifecycle.on_install().await.unwrap();
        let report = lifecycle.on_activate().await.unwrap();
        assert_eq!(report.claimed, 1);

        let after: ResourceFetchOutput = output(&fetch_impl(&lifecycle, params).await.unwrap());
        assert_eq!(after.controlled_by.as_deref(), Some("v2"));
    }
}
