//! Progress notification port for conversation runs.
//!
//! Implementations live in the presentation layer (console spinner, plain
//! text). Every callback has a no-op default so notifiers only implement
//! what they display.

use mcpflow_domain::{InvokeError, Termination, ToolCall, ToolResult};

/// Callback for progress updates during a run.
pub trait RunProgressNotifier: Send + Sync {
    /// A model call is about to be made. `turn` starts at 1.
    fn on_model_call(&self, _turn: usize, _max_turns: usize) {}

    /// The model produced text in this turn.
    fn on_model_text(&self, _text: &str) {}

    /// The model asked for a tool.
    fn on_tool_call(&self, _call: &ToolCall) {}

    /// A tool invocation finished.
    fn on_tool_result(&self, _tool_name: &str, _outcome: Result<&ToolResult, &InvokeError>) {}

    /// The run ended without a hard failure.
    fn on_run_complete(&self, _termination: &Termination, _model_calls: usize) {}
}

/// No-op progress notifier.
pub struct NoRunProgress;

impl RunProgressNotifier for NoRunProgress {}
