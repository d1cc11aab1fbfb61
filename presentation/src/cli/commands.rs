//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Console verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No log output on the console
    Quiet,
    /// Progress of the conversation only; warnings and errors from logs
    User,
    /// Operational info
    Normal,
    /// Debug output
    Verbose,
}

impl LogLevel {
    /// `tracing` filter directive for the console.
    pub fn directive(&self) -> &'static str {
        match self {
            LogLevel::Quiet => "off",
            LogLevel::User => "warn",
            LogLevel::Normal => "info",
            LogLevel::Verbose => "debug",
        }
    }
}

/// How the final answer is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The answer text
    Text,
    /// Answer, termination and transcript as JSON
    Json,
}

/// CLI arguments for mcpflow
#[derive(Parser, Debug)]
#[command(name = "mcpflow")]
#[command(author, version, about = "Run Gemini conversations that call tools on MCP servers")]
#[command(long_about = r#"
mcpflow runs a workflow: a Gemini model, a set of MCP tool servers started as
child processes, and a prompt template. The model may call the servers' tools
for a bounded number of turns before answering.

Configuration is merged from (highest priority first):
1. MCPFLOW_* environment variables (nested keys separated by __)
2. --mcp-config / --workflows-config JSON files
3. --config <path>            Explicit config file (TOML, or JSON by extension)
4. ./mcpflow.toml             Project-level config
5. ~/.config/mcpflow/config.toml   Global config

The Gemini API key is read from GOOGLE_API_KEY or GEMINI_API_KEY.

Example:
  mcpflow --list-workflows
  mcpflow calculator --query "What is 2 + 3?"
  mcpflow calculator            # interactive chat
"#)]
pub struct Cli {
    /// Name of the workflow to run
    pub workflow_name: Option<String>,

    /// A single query to process (non-interactive mode)
    #[arg(long, value_name = "TEXT")]
    pub query: Option<String>,

    /// List available workflows and exit
    #[arg(short = 'l', long)]
    pub list_workflows: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// JSON file with a top-level "mcpServers" object
    #[arg(long, value_name = "PATH")]
    pub mcp_config: Option<PathBuf>,

    /// JSON file with a top-level "workflows" object
    #[arg(long, value_name = "PATH")]
    pub workflows_config: Option<PathBuf>,

    /// Console log verbosity (overrides -v)
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Verbosity level (-v = normal, -vv = verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable the debug log file
    #[arg(long)]
    pub no_log_file: bool,

    /// Append a JSONL transcript of every conversation to this file
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format for answers
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

impl Cli {
    /// Effective console verbosity: `--log-level` wins, then `-v` counts.
    pub fn console_log_level(&self) -> LogLevel {
        if let Some(level) = self.log_level {
            return level;
        }
        match self.verbose {
            0 => LogLevel::User,
            1 => LogLevel::Normal,
            _ => LogLevel::Verbose,
        }
    }
}
