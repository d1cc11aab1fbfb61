//! Gemini adapter
//!
//! Implements [`ModelGateway`](mcpflow_application::ModelGateway) for the
//! Gemini `generateContent` API.

pub mod config;
pub mod gateway;
pub mod wire;

pub use config::GeminiConfig;
pub use gateway::GeminiGateway;
