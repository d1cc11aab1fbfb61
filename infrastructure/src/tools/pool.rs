//! Session Pool
//!
//! The [`SessionPool`] owns every live [`ToolSession`] of a workflow and
//! implements [`ToolExecutorPort`]: one merged tool namespace, O(1) name
//! resolution, and ordered teardown.
//!
//! # Usage
//!
//! ```ignore
//! use mcpflow_infrastructure::{SessionPool, StdioSessionConnector};
//!
//! let (pool, report) = SessionPool::start_all(&servers, &StdioSessionConnector::new()).await;
//! report.check(workflow.startup_policy)?;
//!
//! let session = pool.resolve("add_numbers").expect("registered");
//! let result = session.invoke(&ToolCall::new("add_numbers")).await;
//!
//! pool.close_all().await?;
//! ```
//!
//! # Registration Order
//!
//! Servers are connected one after another in configuration order. When two
//! servers advertise the same tool name, the server started first keeps it;
//! the later registration is dropped and recorded in the
//! [`PoolStartReport`].
//!
//! # Teardown
//!
//! `close_all()` closes sessions in reverse start order, keeps going past
//! failures, and reports all of them at the end. Only the first call does
//! any work.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use mcpflow_application::ports::tool_executor::{PoolCloseError, ToolExecutorPort};
use mcpflow_domain::tool::{SessionConnector, ToolDescriptor, ToolSession};
use mcpflow_domain::workflow::{DuplicateTool, PoolStartReport, ServerConfig, ServerOutcome};

/// Position of a registered tool: (session index, index in its catalog).
type ToolSlot = (usize, usize);

/// Live tool sessions of one workflow.
pub struct SessionPool {
    /// Sessions in start order
    sessions: Vec<Arc<dyn ToolSession>>,
    /// Tool name -> owning slot
    routes: HashMap<String, ToolSlot>,
    /// Registered tools in registration order
    registered: Vec<ToolSlot>,
    closed: AtomicBool,
}

impl SessionPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self {
            sessions: Vec::new(),
            routes: HashMap::new(),
            registered: Vec::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Connect every server in order and merge their catalogs.
    ///
    /// Never fails as a whole: each server's outcome is in the report and
    /// the caller decides, via its startup policy, whether the run may go on.
    pub async fn start_all(
        servers: &[ServerConfig],
        connector: &dyn SessionConnector,
    ) -> (Self, PoolStartReport) {
        let mut pool = Self::new();
        let mut report = PoolStartReport::default();

        for server in servers {
            match connector.connect(server).await {
                Ok(session) => {
                    let tool_count = session.tools().len();
                    report.duplicates.extend(pool.add_session(session));
                    report.outcomes.push(ServerOutcome::Ready {
                        server: server.name.clone(),
                        tool_count,
                    });
                }
                Err(error) => {
                    tracing::warn!(server = %server.name, error = %error, "Failed to start tool server");
                    report.outcomes.push(ServerOutcome::Failed { error });
                }
            }
        }

        tracing::debug!(
            sessions = pool.sessions.len(),
            tools = pool.registered.len(),
            "Session pool started"
        );
        (pool, report)
    }

    /// Register a connected session after those already in the pool.
    ///
    /// Returns the tool names that were already taken.
    pub fn add_session(&mut self, session: Arc<dyn ToolSession>) -> Vec<DuplicateTool> {
        let session_index = self.sessions.len();
        let mut duplicates = Vec::new();

        for (tool_index, tool) in session.tools().iter().enumerate() {
            if let Some(&(owner, _)) = self.routes.get(&tool.name) {
                tracing::trace!(
                    tool = %tool.name,
                    session = session.id(),
                    "Tool already registered by an earlier session"
                );
                duplicates.push(DuplicateTool {
                    tool: tool.name.clone(),
                    kept_by: self.sessions[owner].id().to_string(),
                    dropped_from: session.id().to_string(),
                });
                continue;
            }
            tracing::debug!(tool = %tool.name, session = session.id(), "Registered tool");
            let slot = (session_index, tool_index);
            self.routes.insert(tool.name.clone(), slot);
            self.registered.push(slot);
        }

        self.sessions.push(session);
        duplicates
    }

    /// Session IDs in start order
    pub fn session_ids(&self) -> Vec<&str> {
        self.sessions.iter().map(|s| s.id()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionPool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutorPort for SessionPool {
    fn catalog(&self) -> Vec<&ToolDescriptor> {
        self.registered
            .iter()
            .map(|&(session, tool)| &self.sessions[session].tools()[tool])
            .collect()
    }

    fn resolve(&self, tool_name: &str) -> Option<Arc<dyn ToolSession>> {
        self.routes
            .get(tool_name)
            .map(|&(session, _)| self.sessions[session].clone())
    }

    async fn close_all(&self) -> Result<(), PoolCloseError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let mut errors = Vec::new();
        for session in self.sessions.iter().rev() {
            match session.close().await {
                Ok(()) => tracing::debug!(session = session.id(), "Closed tool session"),
                Err(e) => {
                    tracing::warn!(session = session.id(), error = %e, "Failed to close tool session");
                    errors.push(e);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(PoolCloseError { errors })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpflow_domain::tool::{
        CloseError, ConnectError, InvokeError, SessionStatus, ToolCall, ToolResult,
    };
    use mcpflow_domain::workflow::StartupPolicy;
    use serde_json::json;
    use std::sync::Mutex;

    struct MockSession {
        id: String,
        tools: Vec<ToolDescriptor>,
        fail_close: bool,
        close_log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ToolSession for MockSession {
        fn id(&self) -> &str {
            &self.id
        }

        fn status(&self) -> SessionStatus {
            SessionStatus::Ready
        }

        fn tools(&self) -> &[ToolDescriptor] {
            &self.tools
        }

        async fn invoke(&self, call: &ToolCall) -> Result<ToolResult, InvokeError> {
            Ok(ToolResult::from_output(&call.name, json!(self.id)))
        }

        async fn close(&self) -> Result<(), CloseError> {
            self.close_log.lock().unwrap().push(self.id.clone());
            if self.fail_close {
                Err(CloseError::new(&self.id, "still running"))
            } else {
                Ok(())
            }
        }
    }

    /// Connects servers by name: the command lists the tools, `fail` refuses
    /// to start, `stuck` fails to close.
    #[derive(Default)]
    struct MockConnector {
        close_log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl SessionConnector for MockConnector {
        async fn connect(
            &self,
            config: &ServerConfig,
        ) -> Result<Arc<dyn ToolSession>, ConnectError> {
            if config.command == "fail" {
                return Err(ConnectError::Spawn {
                    server: config.name.clone(),
                    message: "No such file or directory".into(),
                });
            }
            Ok(Arc::new(MockSession {
                id: config.name.clone(),
                tools: config
                    .args
                    .iter()
                    .map(|name| ToolDescriptor::new(name, format!("{} from {}", name, config.name)))
                    .collect(),
                fail_close: config.command == "stuck",
                close_log: self.close_log.clone(),
            }))
        }
    }

    fn server(name: &str, command: &str, tools: &[&str]) -> ServerConfig {
        ServerConfig::new(name, command).with_args(tools.iter().copied())
    }

    #[tokio::test]
    async fn test_first_registration_wins() {
        let connector = MockConnector::default();
        let servers = vec![
            server("math", "ok", &["add", "subtract"]),
            server("calc", "ok", &["add", "multiply"]),
        ];

        let (pool, report) = SessionPool::start_all(&servers, &connector).await;

        let names: Vec<&str> = pool.catalog().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["add", "subtract", "multiply"]);
        assert_eq!(pool.resolve("add").unwrap().id(), "math");
        assert_eq!(pool.resolve("multiply").unwrap().id(), "calc");
        assert_eq!(pool.catalog()[0].description, "add from math");
        assert_eq!(
            report.duplicates,
            vec![DuplicateTool {
                tool: "add".into(),
                kept_by: "math".into(),
                dropped_from: "calc".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_resolve_unknown_tool() {
        let connector = MockConnector::default();
        let (pool, _) = SessionPool::start_all(&[server("math", "ok", &["add"])], &connector).await;

        assert!(pool.resolve("divide").is_none());
        assert!(!pool.has_tool("divide"));
        assert!(pool.has_tool("add"));
    }

    #[tokio::test]
    async fn test_start_continues_past_failures() {
        let connector = MockConnector::default();
        let servers = vec![
            server("broken", "fail", &["add"]),
            server("math", "ok", &["add"]),
        ];

        let (pool, report) = SessionPool::start_all(&servers, &connector).await;

        assert_eq!(pool.session_ids(), vec!["math"]);
        assert_eq!(report.ready_count(), 1);
        assert_eq!(report.outcomes[0].server(), "broken");
        assert!(!report.outcomes[0].is_ready());
        assert!(report.check(StartupPolicy::Abort).is_err());
        assert!(report.check(StartupPolicy::Degrade).is_ok());
        assert_eq!(pool.resolve("add").unwrap().id(), "math");
    }

    #[tokio::test]
    async fn test_all_failed_is_fatal_under_degrade() {
        let connector = MockConnector::default();
        let servers = vec![server("a", "fail", &[]), server("b", "fail", &[])];

        let (pool, report) = SessionPool::start_all(&servers, &connector).await;

        assert!(pool.is_empty());
        let err = report.check(StartupPolicy::Degrade).unwrap_err();
        assert_eq!(err.failures.len(), 2);
    }

    #[tokio::test]
    async fn test_close_all_reverse_order() {
        let connector = MockConnector::default();
        let servers = vec![
            server("first", "ok", &["a"]),
            server("second", "ok", &["b"]),
            server("third", "ok", &["c"]),
        ];
        let (pool, _) = SessionPool::start_all(&servers, &connector).await;

        pool.close_all().await.unwrap();

        assert_eq!(
            *connector.close_log.lock().unwrap(),
            vec!["third", "second", "first"]
        );
    }

    #[tokio::test]
    async fn test_close_all_continues_and_aggregates() {
        let connector = MockConnector::default();
        let servers = vec![
            server("first", "stuck", &["a"]),
            server("second", "ok", &["b"]),
            server("third", "stuck", &["c"]),
        ];
        let (pool, _) = SessionPool::start_all(&servers, &connector).await;

        let err = pool.close_all().await.unwrap_err();

        let failed: Vec<&str> = err.errors.iter().map(|e| e.session.as_str()).collect();
        assert_eq!(failed, vec!["third", "first"]);
        assert_eq!(connector.close_log.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_close_all_is_idempotent() {
        let connector = MockConnector::default();
        let (pool, _) =
            SessionPool::start_all(&[server("math", "stuck", &["add"])], &connector).await;

        assert!(pool.close_all().await.is_err());
        pool.close_all().await.unwrap();
        pool.close_all().await.unwrap();
        assert_eq!(connector.close_log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_pool() {
        let (pool, report) = SessionPool::start_all(&[], &MockConnector::default()).await;

        assert!(pool.catalog().is_empty());
        assert!(report.check(StartupPolicy::Abort).is_ok());
        pool.close_all().await.unwrap();
    }
}
