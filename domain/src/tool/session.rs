//! Tool session abstraction
//!
//! A [`ToolSession`] is one live connection to a tool-provider process. It
//! owns the provider's tool catalog, fetched once at connect time, and
//! routes invocations to the provider one at a time.
//!
//! ```text
//!   SessionConnector::connect(ServerConfig)
//!          │
//!          ▼
//!   Connecting ──handshake + listing ok──▶ Ready ──close()──▶ Closed
//!          │                                 │
//!          └──any failure: ConnectError      └──transport lost──▶ Failed
//! ```
//!
//! A session that fails to connect is never handed out; the connector
//! releases the child process before returning the error.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use super::entities::{ToolCall, ToolDescriptor};
use super::value_objects::{InvokeError, ToolResult};
use crate::workflow::ServerConfig;

/// Lifecycle state of a [`ToolSession`].
///
/// `Connecting` only exists inside a connector while the handshake and
/// listing run; a session handed out by [`SessionConnector::connect`] starts
/// out `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Connecting,
    Ready,
    Closed,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Connecting => "connecting",
            SessionStatus::Ready => "ready",
            SessionStatus::Closed => "closed",
            SessionStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Failure to bring a session to [`SessionStatus::Ready`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectError {
    #[error("server '{server}': failed to spawn: {message}")]
    Spawn { server: String, message: String },

    #[error("server '{server}': handshake failed: {message}")]
    Handshake { server: String, message: String },

    #[error("server '{server}': tool listing failed: {message}")]
    Listing { server: String, message: String },

    #[error("server '{server}': unsupported transport '{transport}'")]
    UnsupportedTransport { server: String, transport: String },
}

impl ConnectError {
    pub fn server(&self) -> &str {
        match self {
            ConnectError::Spawn { server, .. }
            | ConnectError::Handshake { server, .. }
            | ConnectError::Listing { server, .. }
            | ConnectError::UnsupportedTransport { server, .. } => server,
        }
    }
}

/// Failure while tearing a session down. The session is still considered
/// closed afterwards.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("closing session '{session}': {message}")]
pub struct CloseError {
    pub session: String,
    pub message: String,
}

impl CloseError {
    pub fn new(session: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            message: message.into(),
        }
    }
}

/// A live connection to one tool provider.
#[async_trait]
pub trait ToolSession: Send + Sync {
    /// Identifier, normally the server name from configuration.
    fn id(&self) -> &str;

    fn status(&self) -> SessionStatus;

    /// Tools advertised at connect time. Never refetched.
    fn tools(&self) -> &[ToolDescriptor];

    fn has_tool(&self, name: &str) -> bool {
        self.tools().iter().any(|t| t.name == name)
    }

    /// Perform exactly one call against the provider. Unknown names fail
    /// with [`InvokeError::UnknownTool`] without reaching the provider.
    async fn invoke(&self, call: &ToolCall) -> Result<ToolResult, InvokeError>;

    /// Release the provider. Calling this more than once is a no-op.
    async fn close(&self) -> Result<(), CloseError>;
}

/// Creates sessions from server configurations.
#[async_trait]
pub trait SessionConnector: Send + Sync {
    async fn connect(&self, config: &ServerConfig) -> Result<Arc<dyn ToolSession>, ConnectError>;
}
