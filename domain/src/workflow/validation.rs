//! Validation of server and workflow definitions.
//!
//! Checks never stop at the first problem; callers collect every
//! [`ConfigIssue`] and decide what to do with the [`Severity`].
//!
//! ```
//! use mcpflow_domain::workflow::{ServerConfig, WorkflowConfig};
//! use mcpflow_domain::workflow::validation::{validate_workflow, ConfigIssueCode};
//!
//! let servers = vec![ServerConfig::new("math", "python")];
//! let wf = WorkflowConfig::new("calc", "gemini-2.0-flash")
//!     .with_servers(["math", "weather"])
//!     .with_template("no placeholder");
//! let codes: Vec<_> = validate_workflow(&wf, &servers).into_iter().map(|i| i.code).collect();
//! assert!(codes.contains(&ConfigIssueCode::MissingQueryPlaceholder));
//! assert!(codes.contains(&ConfigIssueCode::UnknownServer));
//! ```

use super::config::{ServerConfig, WorkflowConfig};
use std::collections::HashSet;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The configuration cannot be used.
    Error,
    /// Usable, but probably not what was intended.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    EmptyCommand,
    UnsupportedTransport,
    EmptyModel,
    MissingQueryPlaceholder,
    ZeroMaxTurns,
    UnknownServer,
    DuplicateServer,
    NoServers,
    UnknownWorkflow,
    InvalidStartupPolicy,
    ZeroTimeout,
}

/// A detected problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}

pub fn validate_server(server: &ServerConfig) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();
    if server.command.trim().is_empty() {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::EmptyCommand,
            format!("server '{}' has no command", server.name),
        ));
    }
    issues
}

/// Validate a workflow against the set of defined servers.
pub fn validate_workflow(workflow: &WorkflowConfig, servers: &[ServerConfig]) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();
    let name = &workflow.name;

    if workflow.model_name.trim().is_empty() {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::EmptyModel,
            format!("workflow '{}' has no model", name),
        ));
    }

    if !workflow
        .initial_prompt_template
        .contains(WorkflowConfig::QUERY_PLACEHOLDER)
    {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::MissingQueryPlaceholder,
            format!(
                "workflow '{}': prompt template must contain {}",
                name,
                WorkflowConfig::QUERY_PLACEHOLDER
            ),
        ));
    }

    if workflow.max_turns == 0 {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::ZeroMaxTurns,
            format!("workflow '{}': max_turns must be at least 1", name),
        ));
    }

    if workflow.server_names.is_empty() {
        issues.push(ConfigIssue::warning(
            ConfigIssueCode::NoServers,
            format!("workflow '{}' uses no tool servers", name),
        ));
    }

    let mut seen = HashSet::new();
    for server in &workflow.server_names {
        if !seen.insert(server.as_str()) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::DuplicateServer,
                format!("workflow '{}' lists server '{}' more than once", name, server),
            ));
        } else if !servers.iter().any(|s| &s.name == server) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::UnknownServer,
                format!("workflow '{}' references undefined server '{}'", name, server),
            ));
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn servers() -> Vec<ServerConfig> {
        vec![ServerConfig::new("math", "python")]
    }

    #[test]
    fn test_valid_workflow_has_no_issues() {
        let wf = WorkflowConfig::new("calc", "gemini-2.0-flash")
            .with_servers(["math"])
            .with_template("Use tools: {query}");
        assert!(validate_workflow(&wf, &servers()).is_empty());
    }

    #[test]
    fn test_all_problems_are_collected() {
        let wf = WorkflowConfig::new("calc", " ")
            .with_servers(["ghost"])
            .with_template("nothing")
            .with_max_turns(0);
        let codes: Vec<_> = validate_workflow(&wf, &servers())
            .into_iter()
            .map(|i| i.code)
            .collect();
        assert_eq!(
            codes,
            vec![
                ConfigIssueCode::EmptyModel,
                ConfigIssueCode::MissingQueryPlaceholder,
                ConfigIssueCode::ZeroMaxTurns,
                ConfigIssueCode::UnknownServer,
            ]
        );
    }

    #[test]
    fn test_no_servers_is_only_a_warning() {
        let wf = WorkflowConfig::new("chat", "gemini-2.0-flash");
        let issues = validate_workflow(&wf, &servers());
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
    }

    #[test]
    fn test_duplicate_server_reference_warns() {
        let wf = WorkflowConfig::new("calc", "gemini-2.0-flash").with_servers(["math", "math"]);
        let issues = validate_workflow(&wf, &servers());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::DuplicateServer);
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_empty_command_is_error() {
        let issues = validate_server(&ServerConfig::new("math", ""));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
        assert_eq!(issues[0].to_string(), "error: server 'math' has no command");
    }
}
