//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::ConsoleFormatter;
use crate::OutputFormat;
use crate::progress::reporter::console_progress;
use colored::Colorize;
use mcpflow_application::{RunError, WorkflowEngine};
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::path::PathBuf;
use tracing::{debug, warn};

const HISTORY_CAPACITY: usize = 1000;

/// One line of user input, interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand<'a> {
    Empty,
    Quit,
    Help,
    Tools,
    Query(&'a str),
    Unknown(&'a str),
}

impl<'a> ChatCommand<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line {
            "" => ChatCommand::Empty,
            "quit" | "exit" | "/quit" | "/exit" | "/q" => ChatCommand::Quit,
            "/help" | "/h" | "/?" => ChatCommand::Help,
            "/tools" => ChatCommand::Tools,
            cmd if cmd.starts_with('/') => ChatCommand::Unknown(cmd),
            query => ChatCommand::Query(query),
        }
    }
}

/// Interactive chat REPL over a running workflow
pub struct ChatRepl<'a> {
    engine: &'a WorkflowEngine,
    show_progress: bool,
    verbose: bool,
    output: OutputFormat,
}

impl<'a> ChatRepl<'a> {
    pub fn new(engine: &'a WorkflowEngine) -> Self {
        Self {
            engine,
            show_progress: true,
            verbose: false,
            output: OutputFormat::Text,
        }
    }

    /// Set whether to show progress
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }

    fn history_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("mcpflow").join("history.txt"))
    }

    fn editor() -> Reedline {
        let editor = Reedline::create();
        let Some(path) = Self::history_path() else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(HISTORY_CAPACITY, path) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                warn!("Chat history unavailable: {}", e);
                editor
            }
        }
    }

    /// Run the interactive REPL until the user quits or a query is cancelled
    pub async fn run(&self) -> std::io::Result<()> {
        let mut editor = Self::editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(self.engine.workflow().name.clone()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            let signal = tokio::task::block_in_place(|| editor.read_line(&prompt))?;
            match signal {
                Signal::Success(line) => match ChatCommand::parse(&line) {
                    ChatCommand::Empty => continue,
                    ChatCommand::Quit => {
                        println!("Bye!");
                        break;
                    }
                    ChatCommand::Help => Self::print_help(),
                    ChatCommand::Tools => {
                        print!("{}", ConsoleFormatter::format_tools(&self.engine.catalog()));
                    }
                    ChatCommand::Unknown(cmd) => {
                        println!("Unknown command: {}", cmd);
                        println!("Type /help for available commands");
                    }
                    ChatCommand::Query(query) => {
                        if !self.process_query(query).await {
                            break;
                        }
                    }
                },
                Signal::CtrlC => {
                    println!("^C");
                    continue;
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
            }
        }

        Ok(())
    }

    fn print_welcome(&self) {
        let workflow = self.engine.workflow();
        println!();
        println!("{} {}", "mcpflow chat:".cyan().bold(), workflow.name.bold());
        println!("{} {}", "Model:".dimmed(), workflow.model_name);
        println!(
            "{} {}",
            "Tools:".dimmed(),
            self.engine
                .catalog()
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!();
        println!("Type your query, or 'quit' to exit. /help lists commands.");
        println!();
    }

    fn print_help() {
        println!();
        println!("Commands:");
        println!("  /help, /h, /?        - Show this help");
        println!("  /tools               - List available tools");
        println!("  quit, exit, /quit    - Exit chat");
        println!();
    }

    /// Returns `false` when the chat must end.
    async fn process_query(&self, query: &str) -> bool {
        println!();
        let progress = console_progress(self.show_progress, self.verbose);
        let result = self.engine.run_query(query, progress.as_ref()).await;

        let keep_going = match result {
            Ok(output) => {
                match self.output {
                    OutputFormat::Text => print!("{}", ConsoleFormatter::format_answer(&output)),
                    OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&output)),
                }
                true
            }
            Err(RunError::Cancelled) => {
                eprintln!("{}", "Cancelled; tool servers were shut down.".yellow());
                false
            }
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                true
            }
        };
        debug!("Query finished; continuing: {}", keep_going);
        println!();
        keep_going
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quit_variants() {
        for input in ["quit", "exit", "/quit", "/exit", "/q", "  quit  "] {
            assert_eq!(ChatCommand::parse(input), ChatCommand::Quit, "{}", input);
        }
    }

    #[test]
    fn test_parse_empty_and_whitespace() {
        assert_eq!(ChatCommand::parse(""), ChatCommand::Empty);
        assert_eq!(ChatCommand::parse(" \t "), ChatCommand::Empty);
    }

    #[test]
    fn test_parse_query_is_trimmed() {
        assert_eq!(
            ChatCommand::parse("  What is 2 + 3? \n"),
            ChatCommand::Query("What is 2 + 3?")
        );
        // only an exact keyword quits
        assert_eq!(
            ChatCommand::parse("quit smoking tips"),
            ChatCommand::Query("quit smoking tips")
        );
    }

    #[test]
    fn test_parse_slash_commands() {
        assert_eq!(ChatCommand::parse("/help"), ChatCommand::Help);
        assert_eq!(ChatCommand::parse("/tools"), ChatCommand::Tools);
        assert_eq!(ChatCommand::parse("/nope"), ChatCommand::Unknown("/nope"));
    }
}
