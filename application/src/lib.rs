//! Application layer for mcpflow
//!
//! This crate contains the conversation loop, its port definitions and
//! execution parameters. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    model_gateway::{GatewayError, ModelGateway, ModelRequest},
    run_progress::{NoRunProgress, RunProgressNotifier},
    tool_executor::{PoolCloseError, ToolExecutorPort},
    tool_schema::ToolSchemaPort,
};
pub use use_cases::run_query::{RunError, RunQueryInput, RunQueryOutput, RunQueryUseCase};
pub use use_cases::workflow_engine::WorkflowEngine;
