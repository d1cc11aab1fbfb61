//! Port definitions (interfaces to the outside world)
//!
//! Adapters for these traits live in the infrastructure and presentation
//! layers.

pub mod conversation_logger;
pub mod model_gateway;
pub mod run_progress;
pub mod tool_executor;
pub mod tool_schema;
