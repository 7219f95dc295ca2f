//! Shared fixtures for tool tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use offcache_client::{Lifecycle, Network};
use offcache_core::{AppConfig, Error, MemoryStore, ResourceRequest, StoredResponse};
use rmcp::model::CallToolResult;
use serde::de::DeserializeOwned;

/// Network that serves a fixed site and can be switched off.
#[derive(Default)]
pub struct StubNetwork {
    pages: HashMap<String, StoredResponse>,
    offline: AtomicBool,
}

impl StubNetwork {
    pub fn site() -> Self {
        let mut pages = HashMap::new();
        pages.insert("http://site.test/".to_string(), StoredResponse::ok("text/html", "<h1>home</h1>"));
        pages.insert("http://site.test/style.css".to_string(), StoredResponse::ok("text/css", "body{}"));
        pages.insert("http://site.test/api/contact".to_string(), StoredResponse::ok("application/json", "{}"));
        Self { pages, offline: AtomicBool::new(false) }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &ResourceRequest) -> Result<StoredResponse, Error> {
        if request.url.scheme() == "data" {
            return Ok(StoredResponse::ok("text/plain", "inline"));
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network("offline".into()));
        }
        Ok(self
            .pages
            .get(request.url.as_str())
            .cloned()
            .unwrap_or_else(|| StoredResponse::new(404, "Not Found", vec![], Vec::new())))
    }
}

pub fn config() -> AppConfig {
    AppConfig {
        app_name: "app".into(),
        version: "v2".into(),
        origin: "http://site.test".into(),
        manifest: vec!["/".into(), "/style.css".into()],
        ..AppConfig::default()
    }
}

pub fn lifecycle(network: Arc<StubNetwork>) -> (Arc<MemoryStore>, Lifecycle) {
    let store = Arc::new(MemoryStore::new());
    let lifecycle = Lifecycle::new(&config(), store.clone(), network).unwrap();
    (store, lifecycle)
}

/// Decode the JSON text content of a tool result.
pub fn output<T: DeserializeOwned>(result: &CallToolResult) -> T {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    let text = content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
