//! Tool server definitions (`[servers.<name>]` tables)

use mcpflow_domain::workflow::{ConfigIssue, ConfigIssueCode, ServerConfig, TransportKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw server definition
///
/// # Example
///
/// ```toml
/// [servers.math]
/// command = "python"
/// args = ["-m", "math_server"]
/// env = { PYTHONUNBUFFERED = "1" }
/// transport = "stdio"          # only "stdio" is supported
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub transport: String,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            command: String::new(),
            args: Vec::new(),
            env: BTreeMap::new(),
            transport: TransportKind::Stdio.as_str().to_string(),
        }
    }
}

impl FileServerConfig {
    /// Convert into a domain [`ServerConfig`].
    ///
    /// Returns `None` together with an error issue when the transport is
    /// not supported.
    pub fn to_server_config(&self, name: &str) -> (Option<ServerConfig>, Vec<ConfigIssue>) {
        match self.transport.parse::<TransportKind>() {
            Ok(transport) => {
                let mut config = ServerConfig::new(name, self.command.clone())
                    .with_args(self.args.iter().cloned());
                config.env = self.env.clone();
                config.transport = transport;
                (Some(config), vec![])
            }
            Err(_) => {
                let issue = ConfigIssue::error(
                    ConfigIssueCode::UnsupportedTransport,
                    format!(
                        "servers.{}.transport: unsupported value '{}' (only 'stdio' is supported)",
                        name, self.transport
                    ),
                );
                (None, vec![issue])
            }
        }
    }
}
