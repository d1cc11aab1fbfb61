//! Progress reporting for conversation runs

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use mcpflow_application::{NoRunProgress, RunProgressNotifier};
use mcpflow_application::use_cases::preview;
use mcpflow_domain::{InvokeError, Termination, ToolCall, ToolResult};
use serde_json::Value;
use std::io::IsTerminal;
use std::sync::Mutex;
use std::time::Duration;

const ARGS_PREVIEW_CHARS: usize = 60;
const RESULT_PREVIEW_CHARS: usize = 80;

/// Reports progress with a spinner for model calls and one line per tool call
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
    verbose: bool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            verbose: false,
        }
    }

    /// Also print intermediate model text and tool output previews
    pub fn verbose() -> Self {
        Self {
            spinner: Mutex::new(None),
            verbose: true,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    /// Print a line above the spinner, or plainly if none is active.
    fn println(&self, line: String) {
        match self.spinner.lock().ok().and_then(|guard| guard.clone()) {
            Some(pb) => pb.println(line),
            None => eprintln!("{}", line),
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.spinner.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick a notifier for the console: spinner on a terminal, plain lines
/// otherwise, nothing when progress is off.
pub fn console_progress(show: bool, verbose: bool) -> Box<dyn RunProgressNotifier> {
    if !show {
        Box::new(NoRunProgress)
    } else if !std::io::stderr().is_terminal() {
        Box::new(SimpleProgress)
    } else if verbose {
        Box::new(ProgressReporter::verbose())
    } else {
        Box::new(ProgressReporter::new())
    }
}

/// Compact one-line rendering of call arguments.
pub(crate) fn args_preview(call: &ToolCall) -> String {
    preview(&Value::Object(call.args.clone()).to_string(), ARGS_PREVIEW_CHARS)
}

impl RunProgressNotifier for ProgressReporter {
    fn on_model_call(&self, turn: usize, max_turns: usize) {
        let Ok(mut guard) = self.spinner.lock() else {
            return;
        };
        let pb = guard.get_or_insert_with(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });
        pb.set_prefix(format!("Turn {}/{}", turn, max_turns));
        pb.set_message("Waiting for model...");
    }

    fn on_model_text(&self, text: &str) {
        if self.verbose {
            self.println(format!("  {} {}", "│".dimmed(), preview(text.trim(), 120).dimmed()));
        }
    }

    fn on_tool_call(&self, call: &ToolCall) {
        if let Ok(guard) = self.spinner.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_message(format!("Running: {}", call.name));
            }
        }
        self.println(format!(
            "  {} {} {}",
            "🔧".dimmed(),
            call.name.cyan(),
            args_preview(call).dimmed()
        ));
    }

    fn on_tool_result(&self, tool_name: &str, outcome: Result<&ToolResult, &InvokeError>) {
        match outcome {
            Ok(result) => {
                let mut line = format!("  {} {}", "✓".green(), tool_name.green());
                if self.verbose {
                    let output = preview(&result.response.to_string(), RESULT_PREVIEW_CHARS);
                    line.push_str(&format!(" {}", output.dimmed()));
                }
                self.println(line);
            }
            Err(e) => {
                self.println(format!("  {} {} {}", "✗".red(), tool_name.red(), e.to_string().dimmed()));
            }
        }
    }

    fn on_run_complete(&self, termination: &Termination, model_calls: usize) {
        self.clear();
        if !termination.is_normal() {
            eprintln!(
                "{} stopped: {} after {} model call(s)",
                "!".yellow(),
                termination.to_string().yellow(),
                model_calls
            );
        }
    }
}

/// Simple text-based progress (no spinners)
pub struct SimpleProgress;

impl RunProgressNotifier for SimpleProgress {
    fn on_model_call(&self, turn: usize, max_turns: usize) {
        eprintln!("{} Turn {}/{}", "->".cyan(), turn, max_turns);
    }

    fn on_tool_call(&self, call: &ToolCall) {
        eprintln!("  {} {}", call.name, args_preview(call));
    }

    fn on_tool_result(&self, tool_name: &str, outcome: Result<&ToolResult, &InvokeError>) {
        match outcome {
            Ok(_) => eprintln!("  {} {}", "✓".green(), tool_name),
            Err(e) => eprintln!("  {} {} ({})", "✗".red(), tool_name, e),
        }
    }

    fn on_run_complete(&self, termination: &Termination, model_calls: usize) {
        if !termination.is_normal() {
            eprintln!("stopped: {} after {} model call(s)", termination, model_calls);
        }
    }
}
