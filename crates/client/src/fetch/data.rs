//! Inline `data:` URLs.
//!
//! `data:[<mediatype>][;base64],<payload>` decodes locally, never touching
//! the network. Used for inline assets in the install manifest.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use offcache_core::{Error, StoredResponse};
use percent_encoding::percent_decode_str;
use url::Url;

const DEFAULT_MEDIA_TYPE: &str = "text/plain;charset=US-ASCII";

/// Decode a `data:` URL into a 200 response.
pub fn decode(url: &Url) -> Result<StoredResponse, Error> {
    if url.scheme() != "data" {
        return Err(Error::InvalidDataUrl(format!("not a data URL: {}", url.scheme())));
    }

    let raw = &url.as_str()["data:".len()..];
    let raw = raw.split_once('#').map_or(raw, |(before, _)| before);
    let (meta, payload) = raw
        .split_once(',')
        .ok_or_else(|| Error::InvalidDataUrl("missing ',' separator".into()))?;

    let (media_type, is_base64) = split_base64(meta);
    let media_type = percent_decode_str(media_type.trim()).decode_utf8_lossy();
    let media_type = if media_type.is_empty() {
        DEFAULT_MEDIA_TYPE.to_string()
    } else {
        media_type.into_owned()
    };

    // Invalid escapes stay as literal text.
    let bytes: Vec<u8> = percent_decode_str(payload).collect();
    let body = if is_base64 {
        let compact: Vec<u8> = bytes.into_iter().filter(|b| !b.is_ascii_whitespace()).collect();
        STANDARD
            .decode(compact)
            .map_err(|e| Error::InvalidDataUrl(format!("base64: {e}")))?
    } else {
        bytes
    };

    Ok(StoredResponse::ok(&media_type, body))
}

/// Strip a trailing `;base64` marker, case-insensitive and space-tolerant.
fn split_base64(meta: &str) -> (&str, bool) {
    let trimmed = meta.trim_end();
    if let Some((media, marker)) = trimmed.rsplit_once(';')
        && marker.trim().eq_ignore_ascii_case("base64")
    {
        return (media, true);
    }
    (meta, false)
}
