//! MCP tool session over stdio.
//!
//! [`McpToolSession::connect`] spawns the server, performs the
//! `initialize` handshake, and fetches the tool catalog (following
//! `nextCursor` pages) exactly once. Only a fully connected session is
//! returned; on any failure the child process is killed first.
//!
//! # Child Process Cleanup
//!
//! - `kill_on_drop(true)`: the child dies with the session
//! - Linux `PR_SET_PDEATHSIG`: the child dies with us even on SIGKILL
//! - [`close`](ToolSession::close) first closes stdin and waits briefly for
//!   a clean exit, then kills

use super::channel::JsonRpcChannel;
use super::error::McpClientError;
use super::protocol::{
    CallToolParams, Implementation, InitializeParams, InitializeResult, ListToolsParams,
    ListToolsResult,
};
use async_trait::async_trait;
use mcpflow_domain::tool::{
    CloseError, ConnectError, InvokeError, SchemaDiagnostic, SessionStatus, ToolCall,
    ToolDescriptor, ToolResult, ToolSession, bridge_tool,
};
use mcpflow_domain::workflow::ServerConfig;
use std::collections::HashSet;
use std::process::Stdio;
use std::sync::RwLock;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Upper bound on `tools/list` pages, against servers that never stop paging.
const MAX_LIST_PAGES: usize = 100;

/// How long a server gets to exit after stdin is closed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

struct Connection {
    channel: JsonRpcChannel<BoxedReader, BoxedWriter>,
    child: Option<Child>,
}

impl Connection {
    /// Close stdin, give the child a moment to exit, then kill it.
    async fn shutdown(mut self, session: &str) -> Result<(), CloseError> {
        if let Err(e) = self.channel.shutdown().await {
            debug!("Session '{}': closing stdin: {}", session, e);
        }
        drop(self.channel);

        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        match tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await {
            Ok(Ok(status)) => {
                debug!("Session '{}': server exited with {}", session, status);
                Ok(())
            }
            Ok(Err(e)) => Err(CloseError::new(session, format!("waiting for server: {}", e))),
            Err(_) => {
                debug!(
                    "Session '{}': server still running after {:?}, killing",
                    session, SHUTDOWN_GRACE
                );
                child
                    .kill()
                    .await
                    .map_err(|e| CloseError::new(session, format!("killing server: {}", e)))
            }
        }
    }
}

/// A connected MCP server.
pub struct McpToolSession {
    id: String,
    server_info: Option<Implementation>,
    tools: Vec<ToolDescriptor>,
    connection: Mutex<Option<Connection>>,
    status: RwLock<SessionStatus>,
}

impl McpToolSession {
    /// Spawn the server described by `config` and bring it to
    /// [`SessionStatus::Ready`].
    pub async fn connect(config: &ServerConfig) -> Result<Self, ConnectError> {
        let spawn_error = |message: String| ConnectError::Spawn {
            server: config.name.clone(),
            message,
        };

        debug!(
            "Spawning MCP server '{}': {} {}",
            config.name,
            config.command,
            config.args.join(" ")
        );

        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args)
            .envs(&config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        // Linux: SIGTERM the server if we die without running Drop
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| spawn_error(format!("{}: {}", config.command, e)))?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill().await;
            return Err(spawn_error("failed to capture stdio pipes".to_string()));
        };

        let connection = Connection {
            channel: JsonRpcChannel::new(Box::new(stdout), Box::new(stdin)),
            child: Some(child),
        };
        Self::establish(config.name.clone(), connection).await
    }

    /// Connect over already-open streams (in-process servers, tests).
    pub async fn connect_streams<R, W>(
        id: impl Into<String>,
        reader: R,
        writer: W,
    ) -> Result<Self, ConnectError>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let connection = Connection {
            channel: JsonRpcChannel::new(Box::new(reader), Box::new(writer)),
            child: None,
        };
        Self::establish(id.into(), connection).await
    }

    async fn establish(id: String, mut connection: Connection) -> Result<Self, ConnectError> {
        let outcome = match Self::handshake(&id, &mut connection.channel).await {
            Ok(server_info) => Self::list_tools(&id, &mut connection.channel)
                .await
                .map(|tools| (server_info, tools)),
            Err(e) => Err(e),
        };

        match outcome {
            Ok((server_info, tools)) => {
                info!(
                    "Connected to MCP server '{}' ({} tools)",
                    id,
                    tools.len()
                );
                Ok(Self {
                    id,
                    server_info,
                    tools,
                    connection: Mutex::new(Some(connection)),
                    status: RwLock::new(SessionStatus::Ready),
                })
            }
            Err(e) => {
                warn!("{}", e);
                if let Err(close_err) = connection.shutdown(&id).await {
                    warn!("{}", close_err);
                }
                Err(e)
            }
        }
    }

    async fn handshake(
        id: &str,
        channel: &mut JsonRpcChannel<BoxedReader, BoxedWriter>,
    ) -> Result<Option<Implementation>, ConnectError> {
        let handshake_error = |e: McpClientError| ConnectError::Handshake {
            server: id.to_string(),
            message: e.to_string(),
        };

        let params = serde_json::to_value(InitializeParams::default())
            .map_err(|e| handshake_error(e.into()))?;
        let result = channel
            .request("initialize", Some(params))
            .await
            .map_err(handshake_error)?;
        let result: InitializeResult =
            serde_json::from_value(result).map_err(|e| handshake_error(e.into()))?;

        debug!(
            "MCP server '{}' speaks protocol {} ({:?})",
            id, result.protocol_version, result.server_info
        );

        channel
            .notify("notifications/initialized", None)
            .await
            .map_err(handshake_error)?;

        Ok(result.server_info)
    }

    async fn list_tools(
        id: &str,
        channel: &mut JsonRpcChannel<BoxedReader, BoxedWriter>,
    ) -> Result<Vec<ToolDescriptor>, ConnectError> {
        let listing_error = |message: String| ConnectError::Listing {
            server: id.to_string(),
            message,
        };

        let mut tools: Vec<ToolDescriptor> = Vec::new();
        let mut names = HashSet::new();
        let mut cursor: Option<String> = None;

        for page in 1..=MAX_LIST_PAGES {
            let params = serde_json::to_value(ListToolsParams {
                cursor: cursor.take(),
            })
            .map_err(|e| listing_error(e.to_string()))?;
            let result = channel
                .request("tools/list", Some(params))
                .await
                .map_err(|e| listing_error(e.to_string()))?;
            let result: ListToolsResult =
                serde_json::from_value(result).map_err(|e| listing_error(e.to_string()))?;

            for tool in result.tools {
                let bridged = match bridge_tool(
                    &tool.name,
                    tool.description.as_deref(),
                    tool.input_schema.as_ref(),
                ) {
                    Ok(bridged) => bridged,
                    Err(diagnostic) => {
                        warn!("MCP server '{}': {}", id, diagnostic);
                        continue;
                    }
                };
                log_diagnostics(id, &bridged.diagnostics);

                if !names.insert(bridged.descriptor.name.clone()) {
                    warn!(
                        "MCP server '{}' lists tool '{}' twice; keeping the first",
                        id, bridged.descriptor.name
                    );
                    continue;
                }
                tools.push(bridged.descriptor);
            }

            match result.next_cursor.filter(|c| !c.is_empty()) {
                Some(next) => {
                    debug!("MCP server '{}': fetching tools page {}", id, page + 1);
                    cursor = Some(next);
                }
                None => return Ok(tools),
            }
        }

        warn!(
            "MCP server '{}' still paging after {} tools/list pages; using what was listed",
            id, MAX_LIST_PAGES
        );
        Ok(tools)
    }

    pub fn server_info(&self) -> Option<&Implementation> {
        self.server_info.as_ref()
    }

    fn set_status(&self, status: SessionStatus) {
        let mut current = self.status.write().unwrap_or_else(|e| e.into_inner());
        *current = status;
    }
}

fn log_diagnostics(server: &str, diagnostics: &[SchemaDiagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic {
            SchemaDiagnostic::PlaceholderDescription { .. } => {
                debug!("MCP server '{}': {}", server, diagnostic)
            }
            _ => warn!("MCP server '{}': {}", server, diagnostic),
        }
    }
}

#[async_trait]
impl ToolSession for McpToolSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> SessionStatus {
        *self.status.read().unwrap_or_else(|e| e.into_inner())
    }

    fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    async fn invoke(&self, call: &ToolCall) -> Result<ToolResult, InvokeError> {
        if !self.has_tool(&call.name) {
            return Err(InvokeError::UnknownTool(call.name.clone()));
        }

        let mut guard = self.connection.lock().await;
        let Some(connection) = guard.as_mut() else {
            return Err(InvokeError::Transport(format!(
                "session '{}' is closed",
                self.id
            )));
        };
        if self.status() == SessionStatus::Failed {
            return Err(InvokeError::Transport(format!(
                "session '{}' lost its connection",
                self.id
            )));
        }

        let params = serde_json::to_value(CallToolParams {
            name: call.name.clone(),
            arguments: call.args.clone(),
        })
        .map_err(|e| InvokeError::Transport(e.to_string()))?;

        match connection.channel.request("tools/call", Some(params)).await {
            Ok(result) => {
                let result: super::protocol::CallToolResult = serde_json::from_value(result)
                    .map_err(|e| {
                        InvokeError::Transport(format!("malformed tools/call result: {}", e))
                    })?;
                if result.is_error {
                    Err(InvokeError::RemoteTool(result.text()))
                } else {
                    Ok(ToolResult::from_output(&call.name, result.into_output()))
                }
            }
            Err(McpClientError::RpcError { code, message }) => Err(InvokeError::RemoteTool(
                format!("{} (code {})", message, code),
            )),
            Err(e) => {
                if e.is_transport_failure() {
                    warn!("Session '{}' failed: {}", self.id, e);
                    self.set_status(SessionStatus::Failed);
                }
                Err(InvokeError::Transport(e.to_string()))
            }
        }
    }

    async fn close(&self) -> Result<(), CloseError> {
        let connection = self.connection.lock().await.take();
        let Some(connection) = connection else {
            return Ok(());
        };
        debug!("Closing MCP session '{}'", self.id);
        self.set_status(SessionStatus::Closed);
        connection.shutdown(&self.id).await
    }
}
