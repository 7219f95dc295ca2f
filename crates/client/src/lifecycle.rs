//! Lifecycle controller.
//!
//! Owns the install and activate events, the router and the strategy
//! engine. Phases move `New -> Installing -> Installed -> Activating -> Active`.
//! With `skip_waiting` off a finished install parks in `Waiting` until no
//! client is held by an older version. A failed install ends in `Redundant`
//! and activation is refused from there.
//!
//! Every transition is checked and applied in one step on the watch channel,
//! so two concurrent events cannot both leave the same phase.

use std::sync::Arc;
use std::time::Duration;

use offcache_core::{
    AppConfig, CacheStore, Destination, Error, PartitionInfo, PartitionNames, ResourceRequest, RouteDecision, Router,
    Strategy, StoredResponse,
};
use serde::Serialize;
use tokio::sync::watch;
use url::Url;

use crate::cleanup::CleanupTask;
use crate::clients::ClientRegistry;
use crate::fetch::Network;
use crate::partitions::PartitionManager;
use crate::strategy::{Resolved, StrategyEngine};

/// Tag that triggers the sync routine.
pub const SYNC_TAG: &str = "background-sync";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    New,
    Installing,
    Installed,
    Waiting,
    Activating,
    Active,
    Redundant,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::New => "new",
            Phase::Installing => "installing",
            Phase::Installed => "installed",
            Phase::Waiting => "waiting",
            Phase::Activating => "activating",
            Phase::Active => "active",
            Phase::Redundant => "redundant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub partition: String,
    pub cached: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivationReport {
    pub deleted: Vec<String>,
    pub claimed: usize,
}

pub struct Lifecycle {
    version: String,
    origin: Url,
    manifest: Vec<String>,
    skip_waiting: bool,
    cleanup_interval: Duration,
    router: Router,
    engine: StrategyEngine,
    store: Arc<dyn CacheStore>,
    network: Arc<dyn Network>,
    partitions: Arc<PartitionManager>,
    clients: ClientRegistry,
    phase: watch::Sender<Phase>,
}

impl Lifecycle {
    pub fn new(config: &AppConfig, store: Arc<dyn CacheStore>, network: Arc<dyn Network>) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.origin)))?;
        let names = config.partition_names();
        let (phase, _) = watch::channel(Phase::New);

        Ok(Self {
            version: config.version.clone(),
            origin,
            manifest: config.manifest.clone(),
            skip_waiting: config.skip_waiting,
            cleanup_interval: config.cleanup_interval(),
            router: Router::new(config.always_fresh.clone()),
            engine: StrategyEngine::new(Arc::clone(&store), Arc::clone(&network), names.clone()),
            partitions: Arc::new(PartitionManager::new(Arc::clone(&store), names)),
            store,
            network,
            clients: ClientRegistry::new(),
            phase,
        })
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Watch phase transitions.
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Move to `next` if `check` accepts the current phase. Returns the phase left.
    fn enter(&self, next: Phase, check: impl FnOnce(Phase) -> Result<(), Error>) -> Result<Phase, Error> {
        let mut outcome = Ok(next);
        self.phase.send_if_modified(|current| {
            let prev = *current;
            outcome = check(prev).map(|()| prev);
            if outcome.is_ok() {
                *current = next;
            }
            outcome.is_ok()
        });
        let prev = outcome?;
        tracing::info!(from = prev.as_str(), to = next.as_str(), "lifecycle transition");
        Ok(prev)
    }

    fn transition(&self, next: Phase) {
        let prev = self.phase.send_replace(next);
        if prev != next {
            tracing::info!(from = prev.as_str(), to = next.as_str(), "lifecycle transition");
        }
    }

    pub fn names(&self) -> &PartitionNames {
        self.engine.names()
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn engine(&self) -> &StrategyEngine {
        &self.engine
    }

    /// Register a client context and return the version controlling it.
    ///
    /// Clients that first appear while active start out controlled; earlier
    /// ones wait for activation to claim them.
    pub fn connect_client(&self, id: &str) -> Option<String> {
        let controller = (self.phase() == Phase::Active).then(|| self.version.clone());
        self.clients.register(id, controller);
        self.clients.controller(id)
    }

    pub fn disconnect_client(&self, id: &str) -> bool {
        self.clients.unregister(id)
    }

    /// Populate the static partition from the manifest.
    ///
    /// All assets are fetched before anything is written, then stored in one
    /// transaction. Any failure leaves no static partition and the phase
    /// becomes `Redundant`. Success lands in `Installed`, or `Waiting` when
    /// `skip_waiting` is off.
    pub async fn on_install(&self) -> Result<InstallReport, Error> {
        self.enter(Phase::Installing, |current| match current {
            Phase::New | Phase::Installed | Phase::Waiting | Phase::Redundant => Ok(()),
            other => Err(Error::InvalidPhase(format!("cannot install while {}", other.as_str()))),
        })?;

        match self.install_manifest().await {
            Ok(report) => {
                tracing::info!(partition = %report.partition, assets = report.cached.len(), "install complete");
                self.transition(if self.skip_waiting { Phase::Installed } else { Phase::Waiting });
                Ok(report)
            }
            Err(e) => {
                tracing::error!(error = %e, "install failed");
                self.transition(Phase::Redundant);
                Err(e)
            }
        }
    }

    async fn install_manifest(&self) -> Result<InstallReport, Error> {
        let partition = self.names().static_name().to_string();
        let mut entries = Vec::with_capacity(self.manifest.len());
        let mut cached = Vec::with_capacity(self.manifest.len());

        for target in &self.manifest {
            let request = ResourceRequest::resolve(&self.origin, "GET", target, Destination::Empty)?;
            let response = self
                .network
                .fetch(&request)
                .await
                .map_err(|e| Error::InstallFailed(format!("{}: {e}", request.url)))?;
            if !response.is_success() {
                return Err(Error::InstallFailed(format!("{}: status {}", request.url, response.status)));
            }
            tracing::debug!(url = %request.url, bytes = response.body.len(), "fetched manifest asset");
            cached.push(request.url.to_string());
            entries.push((request.key(), response));
        }

        self.store.put_all(&partition, entries).await?;
        Ok(InstallReport { partition, cached })
    }

    /// Delete obsolete partitions and take control of every open client.
    pub async fn on_activate(&self) -> Result<ActivationReport, Error> {
        let prev = self.enter(Phase::Activating, |current| {
            if !matches!(current, Phase::Installed | Phase::Waiting | Phase::Active) {
                return Err(Error::InvalidPhase(format!("cannot activate while {}", current.as_str())));
            }
            if !self.skip_waiting {
                let held = self.clients.held_by_others(&self.version);
                if held > 0 {
                    return Err(Error::InvalidPhase(format!("{held} clients still controlled by an older version")));
                }
            }
            Ok(())
        })?;

        let deleted = match self.partitions.purge_obsolete().await {
            Ok(deleted) => deleted,
            Err(e) => {
                tracing::error!(error = %e, "activation cleanup failed");
                self.transition(prev);
                return Err(e);
            }
        };
        let claimed = self.clients.claim(&self.version);

        self.transition(Phase::Active);
        tracing::info!(deleted = deleted.len(), claimed, "activated");
        Ok(ActivationReport { deleted, claimed })
    }

    pub fn route(&self, request: &ResourceRequest) -> RouteDecision {
        self.router.route(request)
    }

    pub async fn handle(&self, request: &ResourceRequest, strategy: Strategy) -> Resolved {
        self.engine.handle(request, strategy).await
    }

    /// Route a request and run its strategy. `None` means pass through.
    pub async fn intercept(&self, request: &ResourceRequest) -> Option<Resolved> {
        match self.route(request) {
            RouteDecision::Passthrough => {
                tracing::debug!(url = %request.url, "passthrough");
                None
            }
            RouteDecision::Intercept(strategy) => Some(self.handle(request, strategy).await),
        }
    }

    /// Fetch a request the router declined, bypassing every partition.
    pub async fn passthrough(&self, request: &ResourceRequest) -> Result<StoredResponse, Error> {
        self.network.fetch(request).await
    }

    pub async fn partitions(&self) -> Result<Vec<PartitionInfo>, Error> {
        self.partitions.partitions().await
    }

    /// Periodic sweep over the same store, ready to `spawn`.
    pub fn cleanup_task(&self) -> CleanupTask {
        CleanupTask::new(Arc::clone(&self.partitions), self.cleanup_interval)
    }

    /// Background sync event. Returns whether the tag was handled.
    pub async fn background_sync(&self, tag: &str) -> bool {
        if tag != SYNC_TAG {
            tracing::debug!(tag, "ignoring sync event");
            return false;
        }
        tracing::info!(tag, "background sync triggered");
        true
    }
}
