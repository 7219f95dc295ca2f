//! Request routing policy.
//!
//! Rules are evaluated in order and the first match wins:
//!
//! 1. Non-network schemes are not intercepted.
//! 2. Always-fresh path prefixes go to the network first.
//! 3. Static assets (by destination or extension) come from cache first.
//! 4. Everything else is served stale while revalidating.

use serde::{Deserialize, Serialize};

use crate::request::ResourceRequest;

/// Extensions treated as static assets regardless of destination.
pub const STATIC_EXTENSIONS: &[&str] = &[".css", ".js", ".json"];

/// The three fetch/cache algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    NetworkFirst,
    CacheFirst,
    StaleWhileRevalidate,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::NetworkFirst => "network_first",
            Strategy::CacheFirst => "cache_first",
            Strategy::StaleWhileRevalidate => "stale_while_revalidate",
        }
    }
}

/// Outcome of routing a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Leave the request alone; the store is not consulted.
    Passthrough,
    Intercept(Strategy),
}

impl RouteDecision {
    pub fn strategy(&self) -> Option<Strategy> {
        match self {
            RouteDecision::Passthrough => None,
            RouteDecision::Intercept(s) => Some(*s),
        }
    }
}

/// Classifies requests into strategies.
#[derive(Debug, Clone)]
pub struct Router {
    always_fresh: Vec<String>,
}

impl Router {
    pub fn new(always_fresh: Vec<String>) -> Self {
        Self { always_fresh }
    }

    /// Pure routing decision for one request.
    pub fn route(&self, request: &ResourceRequest) -> RouteDecision {
        if !request.is_network_transportable() {
            return RouteDecision::Passthrough;
        }

        let path = request.path();

        if self.always_fresh.iter().any(|prefix| path.starts_with(prefix.as_str())) {
            return RouteDecision::Intercept(Strategy::NetworkFirst);
        }

        if request.destination.is_static_asset() || STATIC_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            return RouteDecision::Intercept(Strategy::CacheFirst);
        }

        RouteDecision::Intercept(Strategy::StaleWhileRevalidate)
    }
}
