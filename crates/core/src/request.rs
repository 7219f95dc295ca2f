//! Intercepted resource requests.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;
use crate::cache::hash::RequestKey;

/// What kind of resource the client asked for.
///
/// Mirrors the request destination a browser attaches to each fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Document,
    Style,
    Script,
    Image,
    Font,
    Manifest,
    #[default]
    #[serde(other)]
    Empty,
}

impl Destination {
    /// Static sub-resources that are safe to serve from cache first.
    pub fn is_static_asset(&self) -> bool {
        matches!(self, Destination::Style | Destination::Script | Destination::Image)
    }
}

/// An outbound request seen by the cache layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub method: String,
    pub url: Url,
    pub destination: Destination,
}

impl ResourceRequest {
    pub fn new(method: impl Into<String>, url: Url, destination: Destination) -> Self {
        Self { method: method.into().to_ascii_uppercase(), url, destination }
    }

    /// A GET for an absolute URL.
    pub fn get(url: &str) -> Result<Self, Error> {
        let url = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
        Ok(Self::new("GET", url, Destination::Empty))
    }

    /// Resolve `target` against `origin`; absolute URLs pass through unchanged.
    pub fn resolve(origin: &Url, method: &str, target: &str, destination: Destination) -> Result<Self, Error> {
        let target = target.trim();
        if target.is_empty() {
            return Err(Error::InvalidUrl("empty URL".into()));
        }
        let url = origin
            .join(target)
            .map_err(|e| Error::InvalidUrl(format!("{target}: {e}")))?;
        Ok(Self::new(method, url, destination))
    }

    /// Whether the scheme can travel over the network at all.
    pub fn is_network_transportable(&self) -> bool {
        matches!(self.url.scheme(), "http" | "https")
    }

    /// Only idempotent reads are written back to a partition.
    pub fn is_cacheable_method(&self) -> bool {
        self.method == "GET"
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn key(&self) -> RequestKey {
        RequestKey::new(&self.method, &self.url)
    }
}
