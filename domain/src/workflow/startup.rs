//! Outcome of starting a workflow's tool servers.

use super::config::StartupPolicy;
use crate::tool::session::ConnectError;
use thiserror::Error;

/// Per-server result of a pool start.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerOutcome {
    Ready { server: String, tool_count: usize },
    Failed { error: ConnectError },
}

impl ServerOutcome {
    pub fn server(&self) -> &str {
        match self {
            ServerOutcome::Ready { server, .. } => server,
            ServerOutcome::Failed { error } => error.server(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ServerOutcome::Ready { .. })
    }
}

/// A tool name advertised by more than one server. The earlier server keeps
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateTool {
    pub tool: String,
    pub kept_by: String,
    pub dropped_from: String,
}

impl std::fmt::Display for DuplicateTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tool '{}' from '{}' ignored; already provided by '{}'",
            self.tool, self.dropped_from, self.kept_by
        )
    }
}

/// Everything that happened while starting a pool, in start order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolStartReport {
    pub outcomes: Vec<ServerOutcome>,
    pub duplicates: Vec<DuplicateTool>,
}

impl PoolStartReport {
    pub fn ready_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ready()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ConnectError> {
        self.outcomes.iter().filter_map(|o| match o {
            ServerOutcome::Failed { error } => Some(error),
            ServerOutcome::Ready { .. } => None,
        })
    }

    /// Decide whether the run may proceed under `policy`.
    ///
    /// An empty report (no servers configured) always passes.
    pub fn check(&self, policy: StartupPolicy) -> Result<(), StartupError> {
        let failures: Vec<ConnectError> = self.failures().cloned().collect();
        if failures.is_empty() {
            return Ok(());
        }
        let fatal = match policy {
            StartupPolicy::Abort => true,
            StartupPolicy::Degrade => self.ready_count() == 0,
        };
        if fatal {
            Err(StartupError {
                policy,
                attempted: self.outcomes.len(),
                failures,
            })
        } else {
            Ok(())
        }
    }
}

/// The pool did not start well enough for the configured policy.
#[derive(Error, Debug, Clone, PartialEq)]
pub struct StartupError {
    pub policy: StartupPolicy,
    pub attempted: usize,
    pub failures: Vec<ConnectError>,
}

impl std::fmt::Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reasons = self
            .failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(
            f,
            "{} of {} server(s) failed to start (policy: {}): {}",
            self.failures.len(),
            self.attempted,
            self.policy,
            reasons
        )
    }
}
