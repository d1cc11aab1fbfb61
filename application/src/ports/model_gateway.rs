//! Model Gateway port
//!
//! Defines the interface for calling a function-calling language model.

use async_trait::async_trait;
use mcpflow_domain::{ConversationState, ModelResponse};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during model gateway operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Timeout")]
    Timeout,
}

impl GatewayError {
    /// Errors retrying cannot fix. These abort a run; everything else is a
    /// soft failure that ends the run with a note.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GatewayError::Authentication(_) | GatewayError::InvalidRequest(_)
        )
    }
}

/// One model call: the whole conversation so far plus the tools the model
/// may call.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    pub model: &'a str,
    pub conversation: &'a ConversationState,
    /// Function declarations in the model API's wire format.
    pub function_declarations: &'a [Value],
}

/// Gateway for model communication
///
/// Implementations (adapters) live in the infrastructure layer and own the
/// wire encoding of turns and declarations.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Provider name for logs (e.g. "gemini").
    fn provider(&self) -> &str;

    async fn generate(&self, request: ModelRequest<'_>) -> Result<ModelResponse, GatewayError>;
}
