//! Workflow domain module
//!
//! A [`WorkflowConfig`] names a model, the tool servers to start (each a
//! [`ServerConfig`]), a prompt template and a turn budget. Starting the
//! servers yields a [`PoolStartReport`], which the workflow's
//! [`StartupPolicy`] accepts or rejects.

pub mod config;
pub mod startup;
pub mod validation;

pub use config::{ServerConfig, StartupPolicy, TransportKind, WorkflowConfig};
pub use startup::{DuplicateTool, PoolStartReport, ServerOutcome, StartupError};
pub use validation::{ConfigIssue, ConfigIssueCode, Severity};
