//! JSON server and workflow files in the `mcpServers` / `workflows` layout.
//!
//! ```json
//! { "mcpServers": { "math": { "command": "python", "args": ["math.py"] } } }
//! ```
//!
//! ```json
//! {
//!   "workflows": {
//!     "calculator": {
//!       "llm_model": "gemini-2.0-flash",
//!       "mcp_servers_used": ["math"],
//!       "initial_prompt_template": "Use the tools: {query}",
//!       "max_conversation_turns": 5,
//!       "description": "Arithmetic"
//!     }
//!   }
//! }
//! ```
//!
//! Both are converted into the same raw types as the TOML sections.

use super::file_config::{FileServerConfig, FileWorkflowConfig};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LegacyConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct McpServersFile {
    #[serde(rename = "mcpServers")]
    mcp_servers: BTreeMap<String, LegacyServer>,
}

#[derive(Deserialize)]
struct LegacyServer {
    command: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: BTreeMap<String, String>,
    #[serde(rename = "transportType", default = "default_transport")]
    transport_type: String,
}

fn default_transport() -> String {
    "stdio".to_string()
}

#[derive(Deserialize)]
struct WorkflowsFile {
    workflows: BTreeMap<String, LegacyWorkflow>,
}

#[derive(Deserialize)]
struct LegacyWorkflow {
    llm_model: String,
    mcp_servers_used: Vec<String>,
    initial_prompt_template: String,
    max_conversation_turns: usize,
    #[serde(default)]
    description: Option<String>,
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, LegacyConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| LegacyConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LegacyConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load servers from a file with a top-level `mcpServers` object.
pub fn load_mcp_servers(path: &Path) -> Result<BTreeMap<String, FileServerConfig>, LegacyConfigError> {
    let file: McpServersFile = read_json(path)?;
    Ok(file
        .mcp_servers
        .into_iter()
        .map(|(name, server)| {
            let config = FileServerConfig {
                command: server.command,
                args: server.args,
                env: server.env,
                transport: server.transport_type,
            };
            (name, config)
        })
        .collect())
}

/// Load workflows from a file with a top-level `workflows` object.
pub fn load_workflows(path: &Path) -> Result<BTreeMap<String, FileWorkflowConfig>, LegacyConfigError> {
    let file: WorkflowsFile = read_json(path)?;
    Ok(file
        .workflows
        .into_iter()
        .map(|(name, wf)| {
            let config = FileWorkflowConfig {
                description: wf.description,
                model: wf.llm_model,
                servers: wf.mcp_servers_used,
                prompt_template: wf.initial_prompt_template,
                max_turns: wf.max_conversation_turns,
                ..Default::default()
            };
            (name, config)
        })
        .collect())
}
