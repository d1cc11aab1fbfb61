//! Infrastructure layer for mcpflow
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the MCP stdio client, the session pool, the Gemini
//! gateway, configuration loading, and transcript logging.

pub mod config;
pub mod gemini;
pub mod logging;
pub mod mcp;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigLoadError, ConfigLoader, ConfigSources, ConfigValidationError, FileConfig,
    ResolvedWorkflow,
};
pub use gemini::{GeminiConfig, GeminiGateway};
pub use logging::JsonlConversationLogger;
pub use mcp::{McpClientError, McpToolSession, StdioSessionConnector};
pub use tools::{FunctionDeclarationConverter, SessionPool};
