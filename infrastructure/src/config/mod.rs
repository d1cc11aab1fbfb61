//! Configuration loading for mcpflow
//!
//! This module handles file I/O and merging of configuration from multiple
//! sources. The priority order (highest to lowest):
//!
//! 1. `MCPFLOW_*` environment variables
//! 2. `--mcp-config` / `--workflows-config` JSON files
//! 3. `--config <path>` specified file
//! 4. Project root: `./mcpflow.toml`
//! 5. Global: `$XDG_CONFIG_HOME/mcpflow/config.toml`
//! 6. Default values

mod file_config;
mod legacy;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileExecutionConfig, FileGeminiConfig, FileServerConfig,
    FileWorkflowConfig, ResolvedWorkflow,
};
pub use legacy::LegacyConfigError;
pub use loader::{ConfigLoadError, ConfigLoader, ConfigSources};
