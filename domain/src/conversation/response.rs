//! Model responses, already decoded from the provider's wire format.

use super::entities::Part;
use crate::tool::entities::ToolCall;
use serde::{Deserialize, Serialize};

/// One candidate completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl Candidate {
    pub fn new(parts: Vec<Part>) -> Self {
        Self {
            parts,
            finish_reason: None,
        }
    }

    /// Concatenation of all text parts, in order.
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::as_text).collect()
    }

    pub fn function_calls(&self) -> impl Iterator<Item = &ToolCall> {
        self.parts.iter().filter_map(Part::as_function_call)
    }
}

/// Response to one model call.
///
/// ```
/// use mcpflow_domain::conversation::{Candidate, ModelResponse, Part};
///
/// let response = ModelResponse::from_parts(vec![Part::text("The answer is 5.")]);
/// assert_eq!(response.first_candidate().map(|c| c.text()), Some("The answer is 5.".into()));
/// assert!(ModelResponse::default().first_candidate().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub candidates: Vec<Candidate>,
    /// Model version reported by the API, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl ModelResponse {
    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self {
            candidates: vec![Candidate::new(parts)],
            model_version: None,
        }
    }

    /// Only the first candidate is ever acted upon.
    pub fn first_candidate(&self) -> Option<&Candidate> {
        self.candidates.first()
    }
}
