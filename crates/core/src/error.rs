//! Unified error types for purgekit.
//!
//! Every variant carries a code prefix so audit lines and MCP error payloads
//! stay greppable.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the invalidation engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Store unreachable, refused, or the connect timed out.
    #[error("CONNECTION_ERROR: {0}")]
    Connection(String),

    /// A delete or script call failed after a successful connect.
    #[error("STORE_ERROR: {0}")]
    Store(String),

    /// URL has no scheme or host, so no key can be derived from it.
    #[error("MALFORMED_URL: {0}")]
    MalformedUrl(String),

    /// Wildcard derivation was asked for a tail without `*`.
    #[error("INVALID_PATTERN: {0}")]
    InvalidPattern(String),

    /// Invalid input parameters.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::Store(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::MalformedUrl(msg) => (-32003, msg.clone()),
            Error::InvalidPattern(msg) => (-32004, msg.clone()),
            Error::Connection(msg) => (-32020, msg.clone()),
            Error::Store(msg) => (-32021, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
