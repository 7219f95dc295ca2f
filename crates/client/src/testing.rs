//! Test doubles shared by the strategy and lifecycle tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use offcache_core::{CacheStore, Error, PartitionInfo, RequestKey, ResourceRequest, StoredResponse};
use tokio::sync::watch;

use crate::fetch::Network;

/// Scripted network: answers from a URL table, counts calls, can go offline.
#[derive(Default)]
pub struct FakeNetwork {
    routes: Mutex<HashMap<String, StoredResponse>>,
    calls: AtomicUsize,
    offline: AtomicBool,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: &str, response: StoredResponse) {
        self.routes.lock().unwrap().insert(url.to_string(), response);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &ResourceRequest) -> Result<StoredResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if request.url.scheme() == "data" {
            return crate::fetch::data::decode(&request.url);
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network("offline".into()));
        }
        let routes = self.routes.lock().unwrap();
        Ok(routes
            .get(request.url.as_str())
            .cloned()
            .unwrap_or_else(|| StoredResponse::new(404, "Not Found", vec![], b"not found".to_vec())))
    }
}

/// Network whose fetches block until the test calls `release`.
pub struct GatedNetwork {
    inner: FakeNetwork,
    gate: watch::Sender<bool>,
}

impl GatedNetwork {
    pub fn new(inner: FakeNetwork) -> Self {
        let (gate, _) = watch::channel(false);
        Self { inner, gate }
    }

    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    pub fn calls(&self) -> usize {
        self.inner.calls()
    }
}

#[async_trait]
impl Network for GatedNetwork {
    async fn fetch(&self, request: &ResourceRequest) -> Result<StoredResponse, Error> {
        let mut open = self.gate.subscribe();
        let _ = open.wait_for(|released| *released).await;
        self.inner.fetch(request).await
    }
}

/// Network that panics on every fetch.
pub struct PanickingNetwork;

#[async_trait]
impl Network for PanickingNetwork {
    async fn fetch(&self, request: &ResourceRequest) -> Result<StoredResponse, Error> {
        panic!("fetch of {} blew up", request.url);
    }
}

/// Store whose every operation fails, as if the disk went away.
pub struct BrokenStore;

fn broken() -> Error {
    Error::CorruptEntry("store unavailable".into())
}

#[async_trait]
impl CacheStore for BrokenStore {
    async fn open(&self, _partition: &str) -> Result<(), Error> {
        Err(broken())
    }

    async fn get(&self, _partition: &str, _key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        Err(broken())
    }

    async fn match_any(&self, _key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        Err(broken())
    }

    async fn put(&self, _partition: &str, _key: &RequestKey, _response: &StoredResponse) -> Result<(), Error> {
        Err(broken())
    }

    async fn put_all(&self, _partition: &str, _entries: Vec<(RequestKey, StoredResponse)>) -> Result<(), Error> {
        Err(broken())
    }

    async fn delete(&self, _partition: &str) -> Result<bool, Error> {
        Err(broken())
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        Err(broken())
    }

    async fn info(&self) -> Result<Vec<PartitionInfo>, Error> {
        Err(broken())
    }
}
