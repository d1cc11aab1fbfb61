//! Tool domain module
//!
//! Tools are advertised by independent provider processes (MCP servers) and
//! called by the model through function calling. This module holds the
//! provider-agnostic pieces:
//!
//! ```text
//! provider JSON Schema ──bridge_tool()──▶ ToolDescriptor ──▶ function declaration
//!                                               │
//!        ToolCall ──▶ ToolSession::invoke() ──▶ ToolResult | InvokeError
//! ```
//!
//! # Key Types
//!
//! - [`ToolDescriptor`] - name, description and typed [`ParameterSchema`]
//! - [`ToolCall`] - a call requested by the model
//! - [`ToolResult`] / [`InvokeError`] - outcome of one invocation
//! - [`ToolSession`] - one live provider connection and its catalog
//! - [`SessionConnector`] - creates sessions from [`crate::workflow::ServerConfig`]
//!
//! Encoding descriptors into the model's wire format lives behind the
//! application layer's `ToolSchemaPort`; this module never does I/O.

pub mod entities;
pub mod schema;
pub mod session;
pub mod value_objects;

pub use entities::{ParamType, ParameterSchema, PropertySchema, ToolCall, ToolDescriptor};
pub use schema::{BridgedTool, SchemaDiagnostic, bridge_tool};
pub use session::{CloseError, ConnectError, SessionConnector, SessionStatus, ToolSession};
pub use value_objects::{InvokeError, ToolResult};
