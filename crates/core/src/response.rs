//! Response snapshots and synthesized fallbacks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body served when a cache-first or stale-while-revalidate resource is
/// neither cached nor reachable.
pub const OFFLINE_BODY: &str = "Content not available offline";

/// Body served when a network-first resource is neither reachable nor cached.
pub const UNAVAILABLE_BODY: &str = "Content not available";

pub const UNAVAILABLE_STATUS: u16 = 503;
pub const UNAVAILABLE_STATUS_TEXT: &str = "Service Unavailable";

/// An immutable snapshot of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Set once the response has been written to a partition.
    pub stored_at: Option<DateTime<Utc>>,
}

impl StoredResponse {
    pub fn new(status: u16, status_text: impl Into<String>, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self { status, status_text: status_text.into(), headers, body, stored_at: None }
    }

    /// 200 response with a content type, mostly for inline assets and tests.
    pub fn ok(content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, "OK", vec![("content-type".into(), content_type.into())], body.into())
    }

    /// Synthesized 503 for resources that cannot be served offline.
    pub fn offline() -> Self {
        Self::unavailable_with(OFFLINE_BODY)
    }

    /// Synthesized 503 for network-first resources.
    pub fn unavailable() -> Self {
        Self::unavailable_with(UNAVAILABLE_BODY)
    }

    fn unavailable_with(body: &str) -> Self {
        Self::new(
            UNAVAILABLE_STATUS,
            UNAVAILABLE_STATUS_TEXT,
            vec![("content-type".into(), "text/plain; charset=utf-8".into())],
            body.as_bytes().to_vec(),
        )
    }

    /// 2xx, the same rule a browser applies for `Response.ok`.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with the given name, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

/// Where a resolved response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Network,
    Cache,
    Fallback,
}
