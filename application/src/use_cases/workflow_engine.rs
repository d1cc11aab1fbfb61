//! Workflow engine: one workflow, one set of live tool sessions, many queries.
//!
//! The engine owns the tool executor for its whole lifetime. Each
//! [`run_query`](WorkflowEngine::run_query) gets a fresh conversation; the
//! sessions are shared across queries and closed once, by
//! [`close`](WorkflowEngine::close) or by a cancelled query.

use crate::ports::run_progress::RunProgressNotifier;
use crate::ports::tool_executor::{PoolCloseError, ToolExecutorPort};
use crate::use_cases::run_query::{RunError, RunQueryInput, RunQueryOutput, RunQueryUseCase};
use mcpflow_domain::{PoolStartReport, ToolDescriptor, WorkflowConfig};
use std::sync::Arc;
use tracing::{info, warn};

pub struct WorkflowEngine {
    workflow: WorkflowConfig,
    run_query: RunQueryUseCase,
}

impl WorkflowEngine {
    pub fn new(workflow: WorkflowConfig, run_query: RunQueryUseCase) -> Self {
        Self {
            workflow,
            run_query,
        }
    }

    pub fn workflow(&self) -> &WorkflowConfig {
        &self.workflow
    }

    fn tools(&self) -> &Arc<dyn ToolExecutorPort> {
        self.run_query.tool_executor()
    }

    /// Tools the model will be offered, in registration order.
    pub fn catalog(&self) -> Vec<&ToolDescriptor> {
        self.tools().catalog()
    }

    /// Apply the workflow's startup policy to a pool start.
    ///
    /// On rejection the sessions that did start are closed before the error
    /// is returned.
    pub async fn accept_startup(&self, report: &PoolStartReport) -> Result<(), RunError> {
        for duplicate in &report.duplicates {
            warn!("{}", duplicate);
        }
        if let Err(e) = report.check(self.workflow.startup_policy) {
            warn!("Workflow '{}' cannot start: {}", self.workflow.name, e);
            if let Err(close_err) = self.close().await {
                warn!("Cleanup after failed startup: {}", close_err);
            }
            return Err(RunError::Setup(e));
        }
        for failure in report.failures() {
            warn!("Continuing without server: {}", failure);
        }
        info!(
            "Workflow '{}' ready: {}/{} server(s), {} tool(s)",
            self.workflow.name,
            report.ready_count(),
            report.outcomes.len(),
            self.catalog().len()
        );
        Ok(())
    }

    /// Run one query. A cancelled query tears the sessions down.
    pub async fn run_query(
        &self,
        query: &str,
        progress: &dyn RunProgressNotifier,
    ) -> Result<RunQueryOutput, RunError> {
        let input = RunQueryInput::new(self.workflow.clone(), query);
        let result = self.run_query.execute(input, progress).await;
        if matches!(result, Err(RunError::Cancelled)) {
            info!("Query cancelled; closing tool sessions");
            if let Err(e) = self.close().await {
                warn!("{}", e);
            }
        }
        result
    }

    /// Close every tool session, most recently started first. Idempotent.
    pub async fn close(&self) -> Result<(), PoolCloseError> {
        self.tools().close_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::model_gateway::{GatewayError, ModelGateway, ModelRequest};
    use crate::ports::run_progress::NoRunProgress;
    use crate::ports::tool_schema::ToolSchemaPort;
    use async_trait::async_trait;
    use mcpflow_domain::{
        ConnectError, ModelResponse, Part, ServerOutcome, StartupPolicy, ToolSession,
    };
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_util::sync::CancellationToken;

    struct EchoGateway;

    #[async_trait]
    impl ModelGateway for EchoGateway {
        fn provider(&self) -> &str {
            "echo"
        }

        async fn generate(&self, request: ModelRequest<'_>) -> Result<ModelResponse, GatewayError> {
            let prompt = request.conversation.turns()[0].parts[0]
                .as_text()
                .unwrap_or_default()
                .to_string();
            Ok(ModelResponse::from_parts(vec![Part::text(prompt)]))
        }
    }

    struct SlowGateway;

    #[async_trait]
    impl ModelGateway for SlowGateway {
        fn provider(&self) -> &str {
            "slow"
        }

        async fn generate(&self, _request: ModelRequest<'_>) -> Result<ModelResponse, GatewayError> {
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
            Ok(ModelResponse::default())
        }
    }

    #[derive(Default)]
    struct CountingPool {
        closes: AtomicUsize,
    }

    #[async_trait]
    impl ToolExecutorPort for CountingPool {
        fn catalog(&self) -> Vec<&ToolDescriptor> {
            Vec::new()
        }

        fn resolve(&self, _tool_name: &str) -> Option<Arc<dyn ToolSession>> {
            None
        }

        async fn close_all(&self) -> Result<(), PoolCloseError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct NameOnlySchema;

    impl ToolSchemaPort for NameOnlySchema {
        fn to_function_declaration(&self, tool: &ToolDescriptor) -> Value {
            json!({ "name": tool.name })
        }
    }

    fn engine(
        gateway: Arc<dyn ModelGateway>,
        pool: Arc<CountingPool>,
        policy: StartupPolicy,
    ) -> WorkflowEngine {
        let workflow = WorkflowConfig::new("echo", "gemini-2.0-flash")
            .with_servers(["a", "b"])
            .with_template("Q: {query}")
            .with_startup_policy(policy);
        let run_query = RunQueryUseCase::new(gateway, pool, Arc::new(NameOnlySchema));
        WorkflowEngine::new(workflow, run_query)
    }

    fn first_server_failed() -> PoolStartReport {
        PoolStartReport {
            outcomes: vec![
                ServerOutcome::Failed {
                    error: ConnectError::Spawn {
                        server: "a".into(),
                        message: "not found".into(),
                    },
                },
                ServerOutcome::Ready {
                    server: "b".into(),
                    tool_count: 2,
                },
            ],
            duplicates: vec![],
        }
    }

    #[tokio::test]
    async fn test_abort_policy_rejects_and_closes() {
        let pool = Arc::new(CountingPool::default());
        let engine = engine(Arc::new(EchoGateway), pool.clone(), StartupPolicy::Abort);

        let err = engine.accept_startup(&first_server_failed()).await.unwrap_err();

        assert!(matches!(err, RunError::Setup(_)));
        assert_eq!(pool.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_degrade_policy_continues() {
        let pool = Arc::new(CountingPool::default());
        let engine = engine(Arc::new(EchoGateway), pool.clone(), StartupPolicy::Degrade);

        engine.accept_startup(&first_server_failed()).await.unwrap();
        let output = engine.run_query("hello", &NoRunProgress).await.unwrap();

        assert_eq!(output.answer, "Q: hello");
        assert_eq!(pool.closes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_queries_reuse_sessions() {
        let pool = Arc::new(CountingPool::default());
        let engine = engine(Arc::new(EchoGateway), pool.clone(), StartupPolicy::Abort);

        let first = engine.run_query("one", &NoRunProgress).await.unwrap();
        let second = engine.run_query("two", &NoRunProgress).await.unwrap();

        assert_eq!(first.answer, "Q: one");
        assert_eq!(second.answer, "Q: two");
        assert_eq!(second.conversation.len(), 2);
        engine.close().await.unwrap();
        assert_eq!(pool.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_query_closes_pool() {
        let pool = Arc::new(CountingPool::default());
        let token = CancellationToken::new();
        let workflow = WorkflowConfig::new("slow", "gemini-2.0-flash");
        let run_query =
            RunQueryUseCase::new(Arc::new(SlowGateway), pool.clone(), Arc::new(NameOnlySchema))
                .with_cancellation(token.clone());
        let engine = WorkflowEngine::new(workflow, run_query);

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            token.cancel();
        });
        let err = engine.run_query("wait", &NoRunProgress).await.unwrap_err();
        canceller.await.unwrap();

        assert!(matches!(err, RunError::Cancelled));
        assert_eq!(pool.closes.load(Ordering::SeqCst), 1);
    }
}
