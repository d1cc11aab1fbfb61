//! Raw configuration data types
//!
//! These structs mirror the merged TOML/JSON structure exactly. They are
//! deserialized directly and converted into domain types on demand, with
//! every problem reported as a [`ConfigIssue`].

mod execution;
mod servers;
mod workflows;

pub use execution::{FileExecutionConfig, FileGeminiConfig};
pub use servers::FileServerConfig;
pub use workflows::FileWorkflowConfig;

use mcpflow_application::config::ExecutionParams;
use mcpflow_domain::workflow::validation::{validate_server, validate_workflow};
use mcpflow_domain::workflow::{ConfigIssue, ConfigIssueCode, ServerConfig, WorkflowConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// The configuration cannot be used. Lists every error found.
#[derive(Debug, Error)]
#[error("invalid configuration: {}", summarize(.issues))]
pub struct ConfigValidationError {
    pub issues: Vec<ConfigIssue>,
}

fn summarize(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Complete file configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Tool servers by name
    pub servers: BTreeMap<String, FileServerConfig>,
    /// Workflows by name
    pub workflows: BTreeMap<String, FileWorkflowConfig>,
    /// Timeouts
    pub execution: FileExecutionConfig,
    /// Model API settings
    pub gemini: FileGeminiConfig,
}

/// A workflow with everything needed to run it.
#[derive(Debug, Clone)]
pub struct ResolvedWorkflow {
    pub workflow: WorkflowConfig,
    /// The workflow's servers, in start order.
    pub servers: Vec<ServerConfig>,
    pub execution: ExecutionParams,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks every server (command, transport), every workflow (model,
    /// template, turn budget, startup policy, server references) and the
    /// execution timeouts.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let (servers, server_issues) = self.server_configs();
        issues.extend(server_issues);
        for server in &servers {
            issues.extend(validate_server(server));
        }

        for name in self.workflows.keys() {
            if let Some((workflow, parse_issues)) = self.workflow_config(name) {
                issues.extend(parse_issues);
                issues.extend(validate_workflow(&workflow, &self.defined_servers()));
            }
        }

        issues.extend(self.execution.to_execution_params().1);
        issues
    }

    /// [`validate`](Self::validate), failing on any error. Warnings are
    /// returned for the caller to log.
    pub fn check(&self) -> Result<Vec<ConfigIssue>, ConfigValidationError> {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            self.validate().into_iter().partition(ConfigIssue::is_error);
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(ConfigValidationError { issues: errors })
        }
    }

    /// Workflow names with their descriptions, sorted by name.
    pub fn workflow_summaries(&self) -> Vec<(&str, Option<&str>)> {
        self.workflows
            .iter()
            .map(|(name, wf)| (name.as_str(), wf.description.as_deref()))
            .collect()
    }

    /// Look up a workflow and the servers it uses.
    pub fn resolve_workflow(&self, name: &str) -> Result<ResolvedWorkflow, ConfigValidationError> {
        let Some((workflow, mut issues)) = self.workflow_config(name) else {
            let available: Vec<&str> = self.workflows.keys().map(String::as_str).collect();
            return Err(ConfigValidationError {
                issues: vec![ConfigIssue::error(
                    ConfigIssueCode::UnknownWorkflow,
                    format!(
                        "workflow '{}' is not defined (available: {})",
                        name,
                        if available.is_empty() {
                            "none".to_string()
                        } else {
                            available.join(", ")
                        }
                    ),
                )],
            });
        };

        let defined = self.defined_servers();
        issues.extend(validate_workflow(&workflow, &defined));
        let (execution, execution_issues) = self.execution.to_execution_params();
        issues.extend(execution_issues);

        let mut servers: Vec<ServerConfig> = Vec::new();
        for server_name in &workflow.server_names {
            if servers.iter().any(|s| &s.name == server_name) {
                continue;
            }
            if let Some(server) = defined.iter().find(|s| &s.name == server_name) {
                issues.extend(validate_server(server));
                servers.push(server.clone());
            }
        }

        issues.retain(ConfigIssue::is_error);
        if !issues.is_empty() {
            return Err(ConfigValidationError { issues });
        }
        Ok(ResolvedWorkflow {
            workflow,
            servers,
            execution,
        })
    }

    fn workflow_config(&self, name: &str) -> Option<(WorkflowConfig, Vec<ConfigIssue>)> {
        self.workflows
            .get(name)
            .map(|raw| raw.to_workflow_config(name))
    }

    fn server_configs(&self) -> (Vec<ServerConfig>, Vec<ConfigIssue>) {
        let mut configs = Vec::new();
        let mut issues = Vec::new();
        for (name, raw) in &self.servers {
            let (config, server_issues) = raw.to_server_config(name);
            configs.extend(config);
            issues.extend(server_issues);
        }
        (configs, issues)
    }

    /// Servers that can be started. A server with an unsupported transport
    /// still counts as defined for reference checks; its own error is
    /// reported separately.
    fn defined_servers(&self) -> Vec<ServerConfig> {
        self.servers
            .iter()
            .map(|(name, raw)| {
                raw.to_server_config(name)
                    .0
                    .unwrap_or_else(|| ServerConfig::new(name, raw.command.clone()))
            })
            .collect()
    }
}
