//! Configuration loader with multi-source merging

use super::file_config::FileConfig;
use super::legacy::{LegacyConfigError, load_mcp_servers, load_workflows};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use serde_json::json;
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "mcpflow";
const PROJECT_FILE: &str = "mcpflow.toml";
const ENV_PREFIX: &str = "MCPFLOW_";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error(transparent)]
    Figment(#[from] Box<figment::Error>),

    #[error(transparent)]
    Legacy(#[from] LegacyConfigError),
}

/// Files named on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// `--config`: TOML, or JSON when the extension is `.json`
    pub config: Option<PathBuf>,
    /// `--mcp-config`: JSON with a top-level `mcpServers` object
    pub mcp_config: Option<PathBuf>,
    /// `--workflows-config`: JSON with a top-level `workflows` object
    pub workflows_config: Option<PathBuf>,
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `MCPFLOW_*`, nested with `__`
    ///    (e.g. `MCPFLOW_EXECUTION__TOOL_TIMEOUT_SECS=30`)
    /// 2. `--mcp-config` / `--workflows-config` JSON files
    /// 3. `--config <path>`
    /// 4. Project root: `./mcpflow.toml`
    /// 5. Global: `$XDG_CONFIG_HOME/mcpflow/config.toml`
    /// 6. Default values
    pub fn load(sources: &ConfigSources) -> Result<FileConfig, ConfigLoadError> {
        let mut layers = Vec::new();
        if let Some(global) = Self::global_config_path().filter(|p| p.exists()) {
            layers.push(global);
        }
        if let Some(project) = Self::project_config_path() {
            layers.push(project);
        }
        Self::load_layers(&layers, sources)
    }

    /// Merge `layers` (lowest priority first) with the command-line sources
    /// and the environment.
    pub fn load_layers(
        layers: &[PathBuf],
        sources: &ConfigSources,
    ) -> Result<FileConfig, ConfigLoadError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        for path in layers {
            figment = Self::merge_file(figment, path);
        }

        if let Some(path) = &sources.config {
            if !path.exists() {
                return Err(ConfigLoadError::NotFound(path.clone()));
            }
            figment = Self::merge_file(figment, path);
        }

        if let Some(path) = &sources.mcp_config {
            let servers = load_mcp_servers(path)?;
            figment = figment.merge(Serialized::defaults(json!({ "servers": servers })));
        }
        if let Some(path) = &sources.workflows_config {
            let workflows = load_workflows(path)?;
            figment = figment.merge(Serialized::defaults(json!({ "workflows": workflows })));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract().map_err(|e| ConfigLoadError::Figment(Box::new(e)))
    }

    fn merge_file(figment: Figment, path: &Path) -> Figment {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            figment.merge(Json::file(path))
        } else {
            figment.merge(Toml::file(path))
        }
    }

    /// Get the global config file path
    ///
    /// Returns `$XDG_CONFIG_HOME/mcpflow/config.toml` (platform equivalent
    /// elsewhere)
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        let path = PathBuf::from(PROJECT_FILE);
        path.exists().then_some(path)
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(sources: &ConfigSources) {
        println!("Configuration sources (in priority order):");
        println!("  [ENV  ] Environment: {}*", ENV_PREFIX);

        for (label, path) in [
            ("Workflows", &sources.workflows_config),
            ("Servers", &sources.mcp_config),
            ("Explicit", &sources.config),
        ] {
            if let Some(path) = path {
                let mark = if path.exists() { "FOUND" } else { "MISSING" };
                println!("  [{:<5}] {}: {}", mark, label, path.display());
            }
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./{}", PROJECT_FILE);
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}
