//! Run Query use case.
//!
//! Drives one bounded conversation between the model and the workflow's
//! tools:
//!
//! ```text
//! ┌──────────────┐  text only   ┌──────┐
//! │AwaitingModel │─────────────▶│ Done │
//! └──────┬───────┘              └──────┘
//!        │ function call            ▲
//!        ▼                          │ turn budget spent / soft failure
//! ┌──────────────┐                  │
//! │ExecutingTool │──────────────────┘
//! └──────┬───────┘
//!        └── ToolResult turn ──▶ AwaitingModel
//! ```
//!
//! Only the first function call of a model turn is executed; any further
//! calls are dropped from the recorded turn. Tool failures are shown to the
//! model as error results and never end the run. Model failures end the run
//! softly (with a note in the answer) unless they are fatal, see
//! [`GatewayError::is_fatal`].

use crate::config::ExecutionParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::model_gateway::{GatewayError, ModelGateway, ModelRequest};
use crate::ports::run_progress::RunProgressNotifier;
use crate::ports::tool_executor::ToolExecutorPort;
use crate::ports::tool_schema::ToolSchemaPort;
use crate::use_cases::shared::{cancellable, check_cancelled, preview};
use mcpflow_domain::conversation::outcome::{
    MAX_TURNS_MARKER, MAX_TURNS_NO_TEXT_MARKER, NO_CANDIDATES_NOTE, NO_FURTHER_ACTIONS_NOTE,
};
use mcpflow_domain::{
    ConversationState, InvokeError, ModelResponse, Part, StartupError, Termination, ToolCall,
    ToolResult, Turn, WorkflowConfig,
};
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Hard failures of a run. Soft failures end in a [`RunQueryOutput`].
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Setup failed: {0}")]
    Setup(#[from] StartupError),

    #[error("Model requested tool '{0}', which no session provides")]
    UnknownTool(String),

    #[error("Model call failed: {0}")]
    Model(GatewayError),

    #[error("Cancelled")]
    Cancelled,
}

/// Input for the [`RunQueryUseCase`].
#[derive(Debug, Clone)]
pub struct RunQueryInput {
    pub workflow: WorkflowConfig,
    pub query: String,
}

impl RunQueryInput {
    pub fn new(workflow: WorkflowConfig, query: impl Into<String>) -> Self {
        Self {
            workflow,
            query: query.into(),
        }
    }
}

/// Result of a run that did not fail hard.
#[derive(Debug, Clone)]
pub struct RunQueryOutput {
    /// All model text of the run, concatenated and trimmed, plus any
    /// termination note.
    pub answer: String,
    pub conversation: ConversationState,
    pub model_calls: usize,
    pub termination: Termination,
}

/// What the loop does after handling one model response.
enum Step {
    Continue,
    Finish(Termination),
}

/// Use case for running one query through a workflow.
pub struct RunQueryUseCase {
    gateway: Arc<dyn ModelGateway>,
    tool_executor: Arc<dyn ToolExecutorPort>,
    tool_schema: Arc<dyn ToolSchemaPort>,
    execution: ExecutionParams,
    conversation_logger: Arc<dyn ConversationLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl Clone for RunQueryUseCase {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            tool_executor: self.tool_executor.clone(),
            tool_schema: self.tool_schema.clone(),
            execution: self.execution.clone(),
            conversation_logger: self.conversation_logger.clone(),
            cancellation_token: self.cancellation_token.clone(),
        }
    }
}

impl RunQueryUseCase {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        tool_executor: Arc<dyn ToolExecutorPort>,
        tool_schema: Arc<dyn ToolSchemaPort>,
    ) -> Self {
        Self {
            gateway,
            tool_executor,
            tool_schema,
            execution: ExecutionParams::default(),
            conversation_logger: Arc::new(NoConversationLogger),
            cancellation_token: None,
        }
    }

    pub fn with_execution_params(mut self, execution: ExecutionParams) -> Self {
        self.execution = execution;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn tool_executor(&self) -> &Arc<dyn ToolExecutorPort> {
        &self.tool_executor
    }

    /// Run the conversation loop until the model answers, the turn budget is
    /// spent, or a failure ends it.
    pub async fn execute(
        &self,
        input: RunQueryInput,
        progress: &dyn RunProgressNotifier,
    ) -> Result<RunQueryOutput, RunError> {
        let workflow = &input.workflow;
        info!(
            "Running query through workflow '{}': {}",
            workflow.name,
            preview(&input.query, 100)
        );

        let declarations = self
            .tool_schema
            .function_declarations(&self.tool_executor.catalog());
        debug!(
            "Workflow '{}': model {}, {} tool declarations, max {} turns",
            workflow.name,
            workflow.model_name,
            declarations.len(),
            workflow.max_turns
        );

        let prompt = workflow.render_prompt(&input.query);
        let mut conversation = ConversationState::new();
        conversation.push(Turn::user(prompt.clone()));
        self.conversation_logger.log(ConversationEvent::new(
            "user_prompt",
            json!({
                "workflow": workflow.name,
                "model": workflow.model_name,
                "prompt": prompt,
            }),
        ));

        let mut answer = String::new();
        let mut model_calls = 0;

        let termination = loop {
            if model_calls >= workflow.max_turns {
                warn!(
                    "Workflow '{}' reached max turns ({})",
                    workflow.name, workflow.max_turns
                );
                let marker = if answer.trim().is_empty() {
                    MAX_TURNS_NO_TEXT_MARKER
                } else {
                    MAX_TURNS_MARKER
                };
                append_note(&mut answer, marker);
                break Termination::MaxTurnsReached;
            }

            check_cancelled(&self.cancellation_token)?;
            model_calls += 1;
            progress.on_model_call(model_calls, workflow.max_turns);

            let response = match self.call_model(workflow, &conversation, &declarations).await? {
                Ok(response) => response,
                Err(soft) => {
                    warn!("Model unavailable, ending run: {}", soft);
                    append_note(&mut answer, &format!("[AI model unavailable: {}]", soft));
                    break Termination::ModelUnavailable {
                        reason: soft.to_string(),
                    };
                }
            };

            match self
                .handle_response(response, &mut conversation, &mut answer, progress)
                .await?
            {
                Step::Continue => {}
                Step::Finish(termination) => break termination,
            }
        };

        let answer = answer.trim().to_string();
        info!(
            "Run finished ({}) after {} model call(s): {}",
            termination,
            model_calls,
            preview(&answer, 100)
        );
        self.conversation_logger.log(ConversationEvent::new(
            "run_complete",
            json!({
                "termination": termination.as_str(),
                "model_calls": model_calls,
                "turns": conversation.len(),
                "answer": answer,
            }),
        ));
        progress.on_run_complete(&termination, model_calls);

        Ok(RunQueryOutput {
            answer,
            conversation,
            model_calls,
            termination,
        })
    }

    /// One model call under timeout and cancellation.
    ///
    /// The outer `Result` carries hard failures; the inner one soft ones.
    async fn call_model(
        &self,
        workflow: &WorkflowConfig,
        conversation: &ConversationState,
        declarations: &[Value],
    ) -> Result<Result<ModelResponse, GatewayError>, RunError> {
        let request = ModelRequest {
            model: &workflow.model_name,
            conversation,
            function_declarations: declarations,
        };
        let call = tokio::time::timeout(self.execution.model_timeout, self.gateway.generate(request));

        match cancellable(&self.cancellation_token, call).await? {
            Err(_) => Ok(Err(GatewayError::Timeout)),
            Ok(Err(e)) if e.is_fatal() => Err(RunError::Model(e)),
            Ok(result) => Ok(result),
        }
    }

    async fn handle_response(
        &self,
        response: ModelResponse,
        conversation: &mut ConversationState,
        answer: &mut String,
        progress: &dyn RunProgressNotifier,
    ) -> Result<Step, RunError> {
        let Some(candidate) = response.candidates.into_iter().next() else {
            warn!("Model returned no candidates");
            append_note(answer, NO_CANDIDATES_NOTE);
            return Ok(Step::Finish(Termination::ModelUnavailable {
                reason: "no response candidates".to_string(),
            }));
        };

        let mut recorded = Vec::with_capacity(candidate.parts.len());
        let mut turn_text = String::new();
        let mut call: Option<ToolCall> = None;
        let mut discarded = Vec::new();

        for part in candidate.parts {
            match part {
                Part::Text { ref text } => {
                    turn_text.push_str(text);
                    recorded.push(part);
                }
                Part::FunctionCall { call: ref requested } => {
                    if call.is_none() {
                        call = Some(requested.clone());
                        recorded.push(part);
                    } else {
                        discarded.push(requested.name.clone());
                    }
                }
                Part::FunctionResponse { ref name, .. } => {
                    debug!("Ignoring function response part for '{}' in model turn", name);
                }
            }
        }

        if !discarded.is_empty() {
            warn!(
                "Model requested {} extra function call(s) in one turn; only the first is executed, dropped: {}",
                discarded.len(),
                discarded.join(", ")
            );
        }

        self.conversation_logger.log(ConversationEvent::new(
            "model_response",
            json!({
                "text": turn_text,
                "function_call": call,
                "discarded_calls": discarded,
            }),
        ));

        if !recorded.is_empty() {
            conversation.push(Turn::model(recorded));
        }
        if !turn_text.is_empty() {
            progress.on_model_text(&turn_text);
            answer.push_str(&turn_text);
        }

        match call {
            Some(call) => {
                let response = self.execute_tool(&call, progress).await?;
                conversation.push(Turn::tool_result(call.name.clone(), response));
                Ok(Step::Continue)
            }
            None if !turn_text.is_empty() => Ok(Step::Finish(Termination::Answered)),
            None => {
                append_note(answer, NO_FURTHER_ACTIONS_NOTE);
                Ok(Step::Finish(Termination::NoFurtherActions))
            }
        }
    }

    /// Resolve and invoke one tool. Invocation failures become an error
    /// payload; only a resolve miss is a hard failure.
    async fn execute_tool(
        &self,
        call: &ToolCall,
        progress: &dyn RunProgressNotifier,
    ) -> Result<Value, RunError> {
        progress.on_tool_call(call);
        self.conversation_logger.log(ConversationEvent::new(
            "tool_call",
            json!({ "tool": call.name, "args": call.args }),
        ));

        let Some(session) = self.tool_executor.resolve(&call.name) else {
            warn!("Model requested unknown tool '{}'", call.name);
            return Err(RunError::UnknownTool(call.name.clone()));
        };

        let args = Value::Object(call.args.clone());
        debug!(
            "Invoking '{}' on session '{}' with args {}",
            call.name,
            session.id(),
            args
        );

        let timeout = self.execution.tool_timeout;
        let invocation = tokio::time::timeout(timeout, session.invoke(call));
        let outcome: Result<ToolResult, InvokeError> =
            match cancellable(&self.cancellation_token, invocation).await? {
                Ok(result) => result,
                Err(_) => Err(InvokeError::Timeout(timeout)),
            };

        progress.on_tool_result(&call.name, outcome.as_ref());

        let response = match outcome {
            Ok(result) => {
                debug!(
                    "Tool '{}' returned {}",
                    call.name,
                    preview(&result.response.to_string(), 200)
                );
                result.response
            }
            Err(e) => {
                warn!("Tool '{}' failed: {}", call.name, e);
                e.to_response(&call.name)
            }
        };

        self.conversation_logger.log(ConversationEvent::new(
            "tool_result",
            json!({ "tool": call.name, "response": response }),
        ));

        Ok(response)
    }
}

/// Append a termination note on its own line.
fn append_note(answer: &mut String, note: &str) {
    if !answer.trim().is_empty() {
        answer.push('\n');
    }
    answer.push_str(note);
}
