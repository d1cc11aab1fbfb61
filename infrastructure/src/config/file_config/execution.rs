//! Execution and model API settings (`[execution]`, `[gemini]`)

use mcpflow_application::config::ExecutionParams;
use mcpflow_domain::workflow::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw execution configuration
///
/// ```toml
/// [execution]
/// model_timeout_secs = 120
/// tool_timeout_secs = 60
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutionConfig {
    pub model_timeout_secs: u64,
    pub tool_timeout_secs: u64,
}

impl Default for FileExecutionConfig {
    fn default() -> Self {
        Self {
            model_timeout_secs: 120,
            tool_timeout_secs: 60,
        }
    }
}

impl FileExecutionConfig {
    pub fn to_execution_params(&self) -> (ExecutionParams, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let mut params = ExecutionParams::default();

        for (field, secs) in [
            ("model_timeout_secs", self.model_timeout_secs),
            ("tool_timeout_secs", self.tool_timeout_secs),
        ] {
            if secs == 0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ZeroTimeout,
                    format!("execution.{}: timeout cannot be 0", field),
                ));
            }
        }

        if self.model_timeout_secs > 0 {
            params = params.with_model_timeout(Duration::from_secs(self.model_timeout_secs));
        }
        if self.tool_timeout_secs > 0 {
            params = params.with_tool_timeout(Duration::from_secs(self.tool_timeout_secs));
        }
        (params, issues)
    }
}

/// Raw Gemini configuration. The API key is never read from files; it comes
/// from `GOOGLE_API_KEY` or `GEMINI_API_KEY`.
///
/// ```toml
/// [gemini]
/// api_base = "https://generativelanguage.googleapis.com/v1beta/models"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGeminiConfig {
    pub api_base: Option<String>,
}
