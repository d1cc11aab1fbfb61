//! Application-level configuration.
//!
//! - [`ExecutionParams`] - timeouts applied around the run loop's suspension points

pub mod execution_params;

pub use execution_params::ExecutionParams;
