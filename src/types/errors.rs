//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// JSON-RPC 2.0 error codes used on the upstream session.
pub mod rpc_code {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}

/// Main error enum for the bridge.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed setting (fatal, before any connection attempt).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Upstream session could not be established or was lost (fatal).
    #[error("connection error: {0}")]
    Connection(String),

    /// Invocation named a tool the catalog does not define (map to INVALID_PARAMS).
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Invocation arguments failed validation (map to INVALID_PARAMS).
    #[error("validation error: {0}")]
    Validation(String),

    /// Automation backend timeout, network failure or unreadable reply.
    #[error("backend error: {0}")]
    Backend(String),

    /// Session method this bridge does not serve (map to METHOD_NOT_FOUND).
    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// Malformed JSON-RPC frame (map to INVALID_REQUEST).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Convert to a JSON-RPC error code.
    pub fn to_rpc_code(&self) -> i64 {
        match self {
            Error::UnknownTool(_) | Error::Validation(_) => rpc_code::INVALID_PARAMS,
            Error::MethodNotFound(_) => rpc_code::METHOD_NOT_FOUND,
            Error::Protocol(_) => rpc_code::INVALID_REQUEST,
            Error::Serialization(_) => rpc_code::PARSE_ERROR,
            Error::Configuration(_)
            | Error::Connection(_)
            | Error::Backend(_)
            | Error::Io(_) => rpc_code::INTERNAL_ERROR,
        }
    }
}

// Convenience constructors
impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::MethodNotFound(method.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Backend(format!("request timed out: {err}"))
        } else {
            Error::Backend(err.to_string())
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::Connection(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_level_errors_map_to_invalid_params() {
        assert_eq!(
            Error::unknown_tool("nope").to_rpc_code(),
            rpc_code::INVALID_PARAMS
        );
        assert_eq!(
            Error::validation("missing action").to_rpc_code(),
            rpc_code::INVALID_PARAMS
        );
        assert_eq!(Error::backend("timeout").to_rpc_code(), rpc_code::INTERNAL_ERROR);
    }

    #[test]
    fn test_display_includes_context() {
        let err = Error::unknown_tool("turn_on_tv");
        assert_eq!(err.to_string(), "unknown tool: turn_on_tv");
    }
}
