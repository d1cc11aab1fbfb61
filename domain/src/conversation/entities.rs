//! Conversation turns and the append-only conversation state.

use crate::tool::entities::ToolCall;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Model,
    ToolResult,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
            Role::ToolResult => "tool_result",
        }
    }
}

/// One piece of turn content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    Text { text: String },
    FunctionCall { call: ToolCall },
    FunctionResponse { name: String, response: Value },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn as_function_call(&self) -> Option<&ToolCall> {
        match self {
            Part::FunctionCall { call } => Some(call),
            _ => None,
        }
    }
}

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::text(text)],
        }
    }

    pub fn model(parts: Vec<Part>) -> Self {
        Self {
            role: Role::Model,
            parts,
        }
    }

    pub fn tool_result(name: impl Into<String>, response: Value) -> Self {
        Self {
            role: Role::ToolResult,
            parts: vec![Part::FunctionResponse {
                name: name.into(),
                response,
            }],
        }
    }
}

/// Ordered, append-only history of one run.
///
/// ```
/// use mcpflow_domain::conversation::{ConversationState, Role, Turn};
///
/// let mut state = ConversationState::new();
/// state.push(Turn::user("What is 2 + 3?"));
/// assert_eq!(state.len(), 1);
/// assert_eq!(state.turns()[0].role, Role::User);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    turns: Vec<Turn>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of turns with the given role.
    pub fn count_role(&self, role: Role) -> usize {
        self.turns.iter().filter(|t| t.role == role).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_turn_constructors() {
        let turn = Turn::tool_result("addNumbers", json!({"sum": 5}));
        assert_eq!(turn.role, Role::ToolResult);
        assert!(matches!(
            &turn.parts[0],
            Part::FunctionResponse { name, .. } if name == "addNumbers"
        ));

        let turn = Turn::model(vec![Part::text("hi")]);
        assert_eq!(turn.parts[0].as_text(), Some("hi"));
    }

    #[test]
    fn test_state_preserves_order() {
        let mut state = ConversationState::new();
        state.push(Turn::user("q"));
        state.push(Turn::model(vec![Part::FunctionCall {
            call: ToolCall::new("addNumbers"),
        }]));
        state.push(Turn::tool_result("addNumbers", json!({"sum": 5})));

        let roles: Vec<Role> = state.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Model, Role::ToolResult]);
        assert_eq!(state.count_role(Role::Model), 1);
        assert_eq!(state.last().map(|t| t.role), Some(Role::ToolResult));
    }

    #[test]
    fn test_part_serializes_tagged() {
        let part = Part::text("hello");
        assert_eq!(
            serde_json::to_value(&part).unwrap(),
            json!({"type": "text", "text": "hello"})
        );
    }
}
