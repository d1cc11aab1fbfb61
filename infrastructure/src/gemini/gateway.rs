//! Gemini Model Gateway implementation

use super::config::GeminiConfig;
use super::wire::{build_request_body, parse_response, status_error};
use async_trait::async_trait;
use mcpflow_application::ports::model_gateway::{GatewayError, ModelGateway, ModelRequest};
use mcpflow_domain::ModelResponse;
use tracing::debug;

/// Model gateway for the Gemini `generateContent` API.
pub struct GeminiGateway {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiGateway {
    pub fn new(config: GeminiConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

fn transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::ConnectionError(e.to_string())
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    fn provider(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: ModelRequest<'_>) -> Result<ModelResponse, GatewayError> {
        let body = build_request_body(&request);
        let url = self.config.endpoint(request.model);

        debug!(
            model = %request.model,
            turns = request.conversation.len(),
            tools = request.function_declarations.len(),
            "Gemini API request"
        );

        let response = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &text));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        parse_response(&json)
    }
}
