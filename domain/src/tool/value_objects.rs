//! Tool domain value objects: invocation results and errors.
//!
//! A tool invocation ends in either a [`ToolResult`] or an [`InvokeError`].
//! Both are turned into a function-response payload for the model, so a
//! failing tool never ends a conversation by itself.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;

/// Successful output of a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_name: String,
    /// Function-response payload; always a JSON object.
    pub response: Value,
}

impl ToolResult {
    /// Shape raw tool output into a function response.
    ///
    /// A JSON object is passed through unchanged; anything else is wrapped
    /// as `{"output": value}`.
    pub fn from_output(tool_name: impl Into<String>, output: Value) -> Self {
        let response = match output {
            Value::Object(_) => output,
            other => json!({ "output": other }),
        };
        Self {
            tool_name: tool_name.into(),
            response,
        }
    }
}

/// Why a single tool invocation failed.
///
/// All variants are soft: the orchestrator records them as a tool-result
/// turn and lets the model react.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvokeError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("tool call timed out after {0:?}")]
    Timeout(Duration),

    #[error("tool reported an error: {0}")]
    RemoteTool(String),
}

impl InvokeError {
    pub fn kind(&self) -> &'static str {
        match self {
            InvokeError::UnknownTool(_) => "unknown_tool",
            InvokeError::Transport(_) => "transport_error",
            InvokeError::Timeout(_) => "timeout",
            InvokeError::RemoteTool(_) => "remote_tool_error",
        }
    }

    /// Function-response payload describing this failure to the model.
    pub fn to_response(&self, tool_name: &str) -> Value {
        json!({
            "error": format!("Error executing tool '{}': {}", tool_name, self),
            "kind": self.kind(),
        })
    }
}
