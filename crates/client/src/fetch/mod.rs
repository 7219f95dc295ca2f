//! Network side of the cache layer.
//!
//! ### Transport
//! - `http`/`https` go through a shared reqwest client
//! - `data:` URLs are decoded locally
//! - Any other scheme is refused
//!
//! ### Semantics
//! - Every HTTP status resolves successfully; only transport failures are errors
//! - Max redirects: 5
//! - Max body bytes: 5MB (configurable)

pub mod data;

use async_trait::async_trait;
use reqwest::{Client, Method, header};
use std::time::{Duration, Instant};

use offcache_core::{AppConfig, Error, ResourceRequest, StoredResponse};

/// Anything that can resolve a request over the network.
///
/// A returned `Err` always means the network could not answer; a 404 or 500
/// is still `Ok`.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &ResourceRequest) -> Result<StoredResponse, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "offcache/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "offcache/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// HTTP fetch client.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    async fn fetch_http(&self, request: &ResourceRequest) -> Result<StoredResponse, Error> {
        let start = Instant::now();
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid method {}: {}", request.method, e)))?;

        let response = self
            .http
            .request(method, request.url.clone())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter(|(name, _)| *name != header::SET_COOKIE)
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();

        let bytes = response.bytes().await.map_err(classify)?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "fetched {} {} -> {} in {}ms ({} bytes)",
            request.method,
            request.url,
            status.as_u16(),
            fetch_ms,
            bytes.len()
        );

        Ok(StoredResponse::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            headers,
            bytes.to_vec(),
        ))
    }
}

fn classify(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(err.to_string())
    } else {
        Error::Network(format!("network error: {}", err))
    }
}

#[async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &ResourceRequest) -> Result<StoredResponse, Error> {
        match request.url.scheme() {
            "http" | "https" => self.fetch_http(request).await,
            "data" => data::decode(&request.url),
            scheme => Err(Error::InvalidUrl(format!("unsupported scheme: {scheme}"))),
        }
    }
}
