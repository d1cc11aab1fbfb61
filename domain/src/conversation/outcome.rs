//! How a conversation run ended.

use serde::{Deserialize, Serialize};

/// Marker appended when the turn budget runs out after some text was produced.
pub const MAX_TURNS_MARKER: &str = "[Max interaction turns reached.]";
/// Marker appended when the turn budget runs out with no text at all.
pub const MAX_TURNS_NO_TEXT_MARKER: &str =
    "[Max interaction turns reached. No final text generated.]";
/// Note appended when the model returned no candidates.
pub const NO_CANDIDATES_NOTE: &str = "[AI model returned no response candidates.]";
/// Note appended when the model returned neither text nor a function call.
pub const NO_FURTHER_ACTIONS_NOTE: &str = "[AI model provided no further text or actions.]";

/// Reason a run stopped. Hard failures are errors, not terminations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    /// The model answered with text and no function call.
    Answered,
    /// The turn budget was exhausted.
    MaxTurnsReached,
    /// The model call failed softly (timeout, empty response, transient error).
    ModelUnavailable { reason: String },
    /// The model returned a candidate with nothing actionable in it.
    NoFurtherActions,
}

impl Termination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::Answered => "answered",
            Termination::MaxTurnsReached => "max_turns_reached",
            Termination::ModelUnavailable { .. } => "model_unavailable",
            Termination::NoFurtherActions => "no_further_actions",
        }
    }

    /// `true` only for a normal, model-driven finish.
    pub fn is_normal(&self) -> bool {
        matches!(self, Termination::Answered)
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::ModelUnavailable { reason } => {
                write!(f, "{} ({})", self.as_str(), reason)
            }
            _ => write!(f, "{}", self.as_str()),
        }
    }
}
