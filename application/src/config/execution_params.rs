//! Execution parameters - run loop control.
//!
//! [`ExecutionParams`] groups the static parameters that bound the two
//! suspension points of [`RunQueryUseCase`](crate::use_cases::run_query::RunQueryUseCase):
//! the model call and the tool invocation. The turn budget itself belongs to
//! the workflow.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Execution loop control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Upper bound on one model call. Expiry is a soft failure.
    pub model_timeout: Duration,
    /// Upper bound on one tool invocation. Expiry becomes an error result
    /// the model can see.
    pub tool_timeout: Duration,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            model_timeout: Duration::from_secs(120),
            tool_timeout: Duration::from_secs(60),
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }
}
