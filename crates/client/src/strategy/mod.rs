//! Fetch/cache strategies.
//!
//! Every strategy resolves to exactly one response. Network failures fall
//! back to the cache or to a synthesized 503. Store failures during lookup
//! count as misses and failed write-backs are logged; neither reaches the
//! caller.

use std::sync::{Arc, Mutex, MutexGuard};

use offcache_core::{
    CacheStore, Error, PartitionNames, RequestKey, ResourceRequest, ResponseSource, Strategy, StoredResponse,
};
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinSet};

use crate::fetch::Network;

/// A response together with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub response: StoredResponse,
    pub source: ResponseSource,
    pub strategy: Strategy,
}

/// Runs the three strategies against a store and a network.
#[derive(Clone)]
pub struct StrategyEngine {
    store: Arc<dyn CacheStore>,
    network: Arc<dyn Network>,
    names: PartitionNames,
    revalidations: Arc<Mutex<JoinSet<()>>>,
}

impl StrategyEngine {
    pub fn new(store: Arc<dyn CacheStore>, network: Arc<dyn Network>, names: PartitionNames) -> Self {
        Self { store, network, names, revalidations: Arc::new(Mutex::new(JoinSet::new())) }
    }

    pub fn names(&self) -> &PartitionNames {
        &self.names
    }

    /// Resolve a request with the given strategy.
    pub async fn handle(&self, request: &ResourceRequest, strategy: Strategy) -> Resolved {
        let (response, source) = match strategy {
            Strategy::CacheFirst => self.cache_first(request).await,
            Strategy::NetworkFirst => self.network_first(request).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request).await,
        };
        tracing::debug!(
            url = %request.url,
            strategy = strategy.as_str(),
            source = ?source,
            status = response.status,
            "resolved request"
        );
        Resolved { response, source, strategy }
    }

    async fn cache_first(&self, request: &ResourceRequest) -> (StoredResponse, ResponseSource) {
        let key = request.key();

        if let Some(hit) = self.lookup_any(&key).await {
            return (hit, ResponseSource::Cache);
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_success() {
                    write_back(self.store.as_ref(), self.names.dynamic_name(), request, &key, &response).await;
                }
                (response, ResponseSource::Network)
            }
            Err(e) => {
                log_fetch_failure(request, &e, "cache first: serving offline fallback");
                (StoredResponse::offline(), ResponseSource::Fallback)
            }
        }
    }

    async fn network_first(&self, request: &ResourceRequest) -> (StoredResponse, ResponseSource) {
        let key = request.key();

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_success() {
                    write_back(self.store.as_ref(), self.names.dynamic_name(), request, &key, &response).await;
                }
                (response, ResponseSource::Network)
            }
            Err(e) => {
                log_fetch_failure(request, &e, "network first: trying cache");
                match self.lookup_any(&key).await {
                    Some(hit) => (hit, ResponseSource::Cache),
                    None => (StoredResponse::unavailable(), ResponseSource::Fallback),
                }
            }
        }
    }

    async fn stale_while_revalidate(&self, request: &ResourceRequest) -> (StoredResponse, ResponseSource) {
        let key = request.key();
        let dynamic = self.names.dynamic_name().to_string();

        let cached = match self.store.open(&dynamic).await {
            Ok(()) => self.lookup_in(&dynamic, &key).await,
            Err(e) => {
                tracing::warn!(partition = %dynamic, error = %e, "failed to open dynamic partition");
                None
            }
        };

        let (tx, rx) = oneshot::channel();
        let store = Arc::clone(&self.store);
        let network = Arc::clone(&self.network);
        let request_bg = request.clone();
        let fallback = cached.clone();

        self.spawn_revalidation(async move {
            let outcome = match network.fetch(&request_bg).await {
                Ok(fresh) => {
                    if fresh.is_success() {
                        write_back(store.as_ref(), &dynamic, &request_bg, &key, &fresh).await;
                    }
                    Some((fresh, ResponseSource::Network))
                }
                Err(e) => {
                    log_fetch_failure(&request_bg, &e, "revalidation: keeping cached copy");
                    fallback.map(|c| (c, ResponseSource::Cache))
                }
            };
            // The caller may already have its answer.
            let _ = tx.send(outcome);
        });

        if let Some(hit) = cached {
            return (hit, ResponseSource::Cache);
        }

        match rx.await {
            Ok(Some(resolved)) => resolved,
            _ => (StoredResponse::offline(), ResponseSource::Fallback),
        }
    }

    fn revalidations(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.revalidations.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Spawn a detached revalidation, first reaping any that already ended.
    fn spawn_revalidation(&self, task: impl Future<Output = ()> + Send + 'static) {
        let mut set = self.revalidations();
        reap_finished(&mut set);
        set.spawn(task);
    }

    /// Number of background revalidations still running.
    pub fn pending_revalidations(&self) -> usize {
        let mut set = self.revalidations();
        reap_finished(&mut set);
        set.len()
    }

    /// Wait for every background revalidation started so far.
    ///
    /// Task failures are logged and swallowed.
    pub async fn settle(&self) {
        let mut pending = std::mem::take(&mut *self.revalidations());
        while let Some(result) = pending.join_next().await {
            if let Err(e) = result {
                log_task_failure(&e);
            }
        }
    }

    async fn lookup_any(&self, key: &RequestKey) -> Option<StoredResponse> {
        match self.store.match_any(key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(url = %key.url, error = %e, "store lookup failed, treating as miss");
                None
            }
        }
    }

    async fn lookup_in(&self, partition: &str, key: &RequestKey) -> Option<StoredResponse> {
        match self.store.get(partition, key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(partition, url = %key.url, error = %e, "store lookup failed, treating as miss");
                None
            }
        }
    }
}

fn reap_finished(set: &mut JoinSet<()>) {
    while let Some(result) = set.try_join_next() {
        if let Err(e) = result {
            log_task_failure(&e);
        }
    }
}

fn log_task_failure(err: &JoinError) {
    tracing::error!(error = %err, panicked = err.is_panic(), "background revalidation task failed");
}

/// Network errors are the expected offline case; anything else is logged louder.
fn log_fetch_failure(request: &ResourceRequest, err: &Error, action: &str) {
    if err.is_network() {
        tracing::warn!(url = %request.url, error = %err, "network unavailable, {action}");
    } else {
        tracing::error!(url = %request.url, error = %err, "unexpected fetch error, {action}");
    }
}

/// Write a copy of `response` into `partition`; failures are only logged.
async fn write_back(
    store: &dyn CacheStore, partition: &str, request: &ResourceRequest, key: &RequestKey, response: &StoredResponse,
) {
    if !request.is_cacheable_method() {
        tracing::debug!(method = %request.method, url = %request.url, "skipping write-back for non-GET request");
        return;
    }
    if let Err(e) = store.put(partition, key, response).await {
        tracing::warn!(partition, url = %key.url, error = %e, "write-back failed");
    }
}
