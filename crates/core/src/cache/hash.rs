//! Request identity used as the store lookup key.

use sha2::{Digest, Sha256};
use url::Url;

/// Compute the lookup hash for a request.
///
/// The fragment never reaches a server, so it does not take part in the key.
pub fn compute_request_key(method: &str, url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);

    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

/// Identity of a cached resource: method plus URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub hash: String,
    pub method: String,
    pub url: String,
}

impl RequestKey {
    pub fn new(method: &str, url: &Url) -> Self {
        let mut display = url.clone();
        display.set_fragment(None);
        Self { hash: compute_request_key(method, url), method: method.to_ascii_uppercase(), url: display.into() }
    }
}
