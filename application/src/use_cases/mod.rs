//! Use cases (application services)

pub mod run_query;
pub(crate) mod shared;
pub mod workflow_engine;

pub use shared::preview;
