//! Progress indicators for conversation runs

pub mod reporter;
