//! Workflow definitions (`[workflows.<name>]` tables)

use mcpflow_domain::workflow::{ConfigIssue, ConfigIssueCode, StartupPolicy, WorkflowConfig};
use serde::{Deserialize, Serialize};

/// Raw workflow definition
///
/// # Example
///
/// ```toml
/// [workflows.calculator]
/// description = "Arithmetic with the math server"
/// model = "gemini-2.0-flash"
/// servers = ["math"]
/// prompt_template = "Use the tools to answer: {query}"
/// max_turns = 5
/// startup_policy = "abort"     # "abort" or "degrade"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWorkflowConfig {
    pub description: Option<String>,
    pub model: String,
    pub servers: Vec<String>,
    pub prompt_template: String,
    pub max_turns: usize,
    pub startup_policy: String,
}

impl Default for FileWorkflowConfig {
    fn default() -> Self {
        Self {
            description: None,
            model: String::new(),
            servers: Vec::new(),
            prompt_template: WorkflowConfig::QUERY_PLACEHOLDER.to_string(),
            max_turns: WorkflowConfig::DEFAULT_MAX_TURNS,
            startup_policy: StartupPolicy::default().as_str().to_string(),
        }
    }
}

impl FileWorkflowConfig {
    /// Parse startup_policy string, falling back to `abort` with an error
    /// issue.
    pub fn parse_startup_policy(&self, name: &str) -> (StartupPolicy, Vec<ConfigIssue>) {
        match self.startup_policy.parse::<StartupPolicy>() {
            Ok(policy) => (policy, vec![]),
            Err(_) => {
                let issue = ConfigIssue::error(
                    ConfigIssueCode::InvalidStartupPolicy,
                    format!(
                        "workflows.{}.startup_policy: unknown value '{}' (expected 'abort' or 'degrade')",
                        name, self.startup_policy
                    ),
                );
                (StartupPolicy::default(), vec![issue])
            }
        }
    }

    pub fn to_workflow_config(&self, name: &str) -> (WorkflowConfig, Vec<ConfigIssue>) {
        let (policy, issues) = self.parse_startup_policy(name);
        let mut workflow = WorkflowConfig::new(name, self.model.clone())
            .with_servers(self.servers.iter().cloned())
            .with_template(self.prompt_template.clone())
            .with_max_turns(self.max_turns)
            .with_startup_policy(policy);
        workflow.description = self.description.clone();
        (workflow, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let raw: FileWorkflowConfig = toml::from_str(r#"model = "gemini-2.0-flash""#).unwrap();
        let (workflow, issues) = raw.to_workflow_config("plain");

        assert!(issues.is_empty());
        assert_eq!(workflow.name, "plain");
        assert_eq!(workflow.initial_prompt_template, "{query}");
        assert_eq!(workflow.max_turns, 5);
        assert_eq!(workflow.startup_policy, StartupPolicy::Abort);
    }

    #[test]
    fn test_degrade_policy() {
        let raw = FileWorkflowConfig {
            model: "gemini-2.0-flash".into(),
            startup_policy: "Degrade".into(),
            ..Default::default()
        };
        assert_eq!(raw.parse_startup_policy("x").0, StartupPolicy::Degrade);
    }

    #[test]
    fn test_invalid_policy_is_reported() {
        let raw = FileWorkflowConfig {
            startup_policy: "retry".into(),
            ..Default::default()
        };
        let (policy, issues) = raw.parse_startup_policy("calc");
        assert_eq!(policy, StartupPolicy::Abort);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::InvalidStartupPolicy);
    }
}
