//! Request building and response parsing for `generateContent`.
//!
//! Turns map onto `contents` entries:
//!
//! | Turn role    | Gemini role | Parts                          |
//! |--------------|-------------|--------------------------------|
//! | `User`       | `user`      | `text`                         |
//! | `Model`      | `model`     | `text`, `functionCall`         |
//! | `ToolResult` | `user`      | `functionResponse`             |

use mcpflow_application::ports::model_gateway::{GatewayError, ModelRequest};
use mcpflow_domain::conversation::{Candidate, ModelResponse, Part, Role, Turn};
use mcpflow_domain::tool::ToolCall;
use serde_json::{Map, Value, json};
use tracing::debug;

fn encode_part(part: &Part) -> Value {
    match part {
        Part::Text { text } => json!({ "text": text }),
        Part::FunctionCall { call } => json!({
            "functionCall": { "name": call.name, "args": call.args }
        }),
        Part::FunctionResponse { name, response } => json!({
            "functionResponse": { "name": name, "response": response }
        }),
    }
}

fn encode_turn(turn: &Turn) -> Value {
    let role = match turn.role {
        Role::User | Role::ToolResult => "user",
        Role::Model => "model",
    };
    let parts: Vec<Value> = turn.parts.iter().map(encode_part).collect();
    json!({ "role": role, "parts": parts })
}

/// Build the JSON request body.
pub fn build_request_body(request: &ModelRequest<'_>) -> Value {
    let contents: Vec<Value> = request.conversation.turns().iter().map(encode_turn).collect();
    let mut body = json!({ "contents": contents });

    if !request.function_declarations.is_empty() {
        body["tools"] = json!([{
            "functionDeclarations": request.function_declarations
        }]);
    }

    body
}

fn decode_part(part: &Value) -> Option<Part> {
    if let Some(text) = part.get("text").and_then(Value::as_str) {
        return Some(Part::text(text));
    }
    if let Some(fc) = part.get("functionCall") {
        let name = fc.get("name").and_then(Value::as_str).unwrap_or_default();
        let args = match fc.get("args") {
            Some(Value::Object(args)) => args.clone(),
            _ => Map::new(),
        };
        return Some(Part::FunctionCall {
            call: ToolCall::new(name).with_args(args),
        });
    }
    debug!("Ignoring unsupported response part: {}", part);
    None
}

fn decode_candidate(candidate: &Value) -> Candidate {
    let parts = candidate
        .pointer("/content/parts")
        .and_then(Value::as_array)
        .map(|parts| parts.iter().filter_map(decode_part).collect())
        .unwrap_or_default();
    Candidate {
        parts,
        finish_reason: candidate
            .get("finishReason")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

/// Parse a `generateContent` response.
///
/// A response without `candidates` (e.g. a blocked prompt) parses to an
/// empty candidate list; only a body that is not a JSON object is
/// malformed.
pub fn parse_response(json: &Value) -> Result<ModelResponse, GatewayError> {
    if !json.is_object() {
        return Err(GatewayError::MalformedResponse(format!(
            "expected a JSON object, got: {}",
            json
        )));
    }

    if let Some(feedback) = json.get("promptFeedback") {
        debug!("Gemini prompt feedback: {}", feedback);
    }

    let candidates = json
        .get("candidates")
        .and_then(Value::as_array)
        .map(|candidates| candidates.iter().map(decode_candidate).collect())
        .unwrap_or_default();

    Ok(ModelResponse {
        candidates,
        model_version: json
            .get("modelVersion")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// Map a non-success HTTP status onto a gateway error.
pub fn status_error(status: u16, body: &str) -> GatewayError {
    let message = error_message(body);
    match status {
        429 => GatewayError::RateLimited(message),
        401 | 403 => GatewayError::Authentication(message),
        400 => GatewayError::InvalidRequest(message),
        _ => GatewayError::Api { status, message },
    }
}

/// `error.message` from a Google API error body, else the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
