//! Server and workflow definitions.
//!
//! These are plain values. Loading and validating them from files is the
//! infrastructure layer's job; everything downstream receives them already
//! validated and by value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// How a tool provider is reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Stdio,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Stdio => "stdio",
        }
    }
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stdio" => Ok(TransportKind::Stdio),
            other => Err(format!("unsupported transport '{}'", other)),
        }
    }
}

/// How to launch one tool-provider process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Extra environment variables, added to the inherited environment.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub transport: TransportKind,
}

impl ServerConfig {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            transport: TransportKind::Stdio,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// What to do when some servers fail to start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupPolicy {
    /// Any server failure aborts the run.
    #[default]
    Abort,
    /// Continue with the servers that started; fail only if none did.
    Degrade,
}

impl StartupPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            StartupPolicy::Abort => "abort",
            StartupPolicy::Degrade => "degrade",
        }
    }
}

impl FromStr for StartupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(StartupPolicy::Abort),
            "degrade" => Ok(StartupPolicy::Degrade),
            other => Err(format!(
                "unknown startup policy '{}' (expected abort or degrade)",
                other
            )),
        }
    }
}

impl std::fmt::Display for StartupPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named recipe: which model, which servers, how to phrase the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub model_name: String,
    /// Servers to start, in start order.
    #[serde(default)]
    pub server_names: Vec<String>,
    /// Must contain the `{query}` placeholder.
    pub initial_prompt_template: String,
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
    #[serde(default)]
    pub startup_policy: StartupPolicy,
}

fn default_max_turns() -> usize {
    WorkflowConfig::DEFAULT_MAX_TURNS
}

impl WorkflowConfig {
    pub const DEFAULT_MAX_TURNS: usize = 5;
    pub const QUERY_PLACEHOLDER: &'static str = "{query}";

    pub fn new(name: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            model_name: model_name.into(),
            server_names: Vec::new(),
            initial_prompt_template: Self::QUERY_PLACEHOLDER.to_string(),
            max_turns: Self::DEFAULT_MAX_TURNS,
            startup_policy: StartupPolicy::default(),
        }
    }

    pub fn with_servers<I, S>(mut self, servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.server_names = servers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.initial_prompt_template = template.into();
        self
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_startup_policy(mut self, policy: StartupPolicy) -> Self {
        self.startup_policy = policy;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Substitute every `{query}` in the template with the user's query.
    ///
    /// ```
    /// use mcpflow_domain::workflow::WorkflowConfig;
    ///
    /// let wf = WorkflowConfig::new("math", "gemini-2.0-flash")
    ///     .with_template("Answer using tools: {query}");
    /// assert_eq!(wf.render_prompt("2 + 3"), "Answer using tools: 2 + 3");
    /// ```
    pub fn render_prompt(&self, query: &str) -> String {
        self.initial_prompt_template
            .replace(Self::QUERY_PLACEHOLDER, query)
    }
}
