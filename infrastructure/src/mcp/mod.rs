//! MCP client over stdio.
//!
//! - [`protocol`]: JSON-RPC envelopes and the MCP request/result types
//! - [`channel`]: newline-delimited JSON-RPC over any async byte stream
//! - [`session`]: one connected server as a [`ToolSession`](mcpflow_domain::ToolSession)
//! - [`connector`]: spawns servers from [`ServerConfig`](mcpflow_domain::ServerConfig)

pub mod channel;
pub mod connector;
pub mod error;
pub mod protocol;
pub mod session;

pub use connector::StdioSessionConnector;
pub use error::McpClientError;
pub use session::McpToolSession;
