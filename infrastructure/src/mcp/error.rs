//! Error types for the MCP client

use thiserror::Error;

/// Result type alias for MCP client operations
pub type Result<T> = std::result::Result<T, McpClientError>;

/// Errors that can occur when talking to an MCP server over stdio
#[derive(Error, Debug)]
pub enum McpClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("JSON-RPC error (code {code}): {message}")]
    RpcError { code: i64, message: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Transport closed")]
    TransportClosed,
}

impl McpClientError {
    /// The connection can no longer be used after this error.
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, McpClientError::Io(_) | McpClientError::TransportClosed)
    }
}
