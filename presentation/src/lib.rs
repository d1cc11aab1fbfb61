//! Presentation layer for mcpflow
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters, and the interactive chat loop.

pub mod chat;
pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{ChatCommand, ChatRepl};
pub use cli::commands::{Cli, LogLevel, OutputFormat};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress, console_progress};
