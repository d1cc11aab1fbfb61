//! Interactive chat module
//!
//! Provides a line-editor based chat loop over a running workflow.

mod repl;

pub use repl::{ChatCommand, ChatRepl};
