//! [`SessionConnector`] that launches MCP servers as child processes.

use super::session::McpToolSession;
use async_trait::async_trait;
use mcpflow_domain::tool::{ConnectError, SessionConnector, ToolSession};
use mcpflow_domain::workflow::{ServerConfig, TransportKind};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default)]
pub struct StdioSessionConnector;

impl StdioSessionConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionConnector for StdioSessionConnector {
    async fn connect(&self, config: &ServerConfig) -> Result<Arc<dyn ToolSession>, ConnectError> {
        match config.transport {
            TransportKind::Stdio => {
                let session = McpToolSession::connect(config).await?;
                Ok(Arc::new(session))
            }
        }
    }
}
