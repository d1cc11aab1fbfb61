//! Domain layer for mcpflow
//!
//! This crate contains the core entities and value objects of the tool-calling
//! loop. It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Tools
//!
//! Tool providers (MCP servers) advertise tools with JSON Schema parameters.
//! [`bridge_tool`] narrows those schemas into typed [`ToolDescriptor`]s that
//! the model's function-calling API accepts, reporting every lossy step as a
//! [`SchemaDiagnostic`].
//!
//! ## Conversations
//!
//! A run keeps an append-only [`ConversationState`] of user, model and
//! tool-result [`Turn`]s, bounded by the workflow's turn budget.
//!
//! ## Workflows
//!
//! A [`WorkflowConfig`] ties a model to an ordered list of
//! [`ServerConfig`]s and a prompt template.

pub mod conversation;
pub mod tool;
pub mod workflow;

// Re-export commonly used types
pub use conversation::{
    Candidate, ConversationState, ModelResponse, Part, Role, Termination, Turn,
};
pub use tool::{
    BridgedTool, CloseError, ConnectError, InvokeError, ParamType, ParameterSchema,
    PropertySchema, SchemaDiagnostic, SessionConnector, SessionStatus, ToolCall, ToolDescriptor,
    ToolResult, ToolSession, bridge_tool,
};
pub use workflow::{
    ConfigIssue, ConfigIssueCode, DuplicateTool, PoolStartReport, ServerConfig, ServerOutcome,
    Severity, StartupError, StartupPolicy, TransportKind, WorkflowConfig,
};
