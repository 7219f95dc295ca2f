//! Host-level errors for the offcache server.
//!
//! Cache and network failures arrive as `offcache_core::Error`; these cover
//! what the tool layer itself can get wrong.

use rmcp::model::{ErrorCode, ErrorData as McpError};

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Invalid tool arguments (e.g., empty URL, malformed method).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Tool output could not be encoded.
    #[error("SERIALIZE_FAILED: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<HostError> for McpError {
    fn from(err: HostError) -> Self {
        let (code, message) = match &err {
            HostError::InvalidInput(msg) => (-32602, msg.clone()),
            HostError::Serialize(e) => (-32603, e.to_string()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_code() {
        let err: McpError = HostError::InvalidInput("url cannot be empty".into()).into();
        assert_eq!(err.code, ErrorCode(-32602));
        assert_eq!(err.message, "url cannot be empty");
    }
}
