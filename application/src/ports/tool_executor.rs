//! Tool Executor port
//!
//! Defines the interface to the set of live tool sessions of a workflow:
//! the merged catalog, name resolution and teardown.

use async_trait::async_trait;
use mcpflow_domain::tool::{CloseError, ToolDescriptor, ToolSession};
use std::sync::Arc;
use thiserror::Error;

/// One or more sessions failed to close cleanly. Every session was still
/// asked to close.
#[derive(Error, Debug, Clone, PartialEq)]
pub struct PoolCloseError {
    pub errors: Vec<CloseError>,
}

impl std::fmt::Display for PoolCloseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} session(s) failed to close", self.errors.len())?;
        for err in &self.errors {
            write!(f, "; {}", err)?;
        }
        Ok(())
    }
}

/// Port for tool execution
///
/// The catalog is fixed once the sessions have started.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Every callable tool, one entry per name, in registration order.
    fn catalog(&self) -> Vec<&ToolDescriptor>;

    /// The session that owns `tool_name`.
    fn resolve(&self, tool_name: &str) -> Option<Arc<dyn ToolSession>>;

    fn has_tool(&self, tool_name: &str) -> bool {
        self.resolve(tool_name).is_some()
    }

    /// Close every session. Safe to call more than once.
    async fn close_all(&self) -> Result<(), PoolCloseError>;
}
