//! Console output formatter for workflow runs

use colored::Colorize;
use mcpflow_application::RunQueryOutput;
use mcpflow_domain::{ConfigIssue, Severity, ToolDescriptor};
use serde_json::json;

/// Formats workflow listings, tool catalogs and answers for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Workflow names with their descriptions
    pub fn format_workflow_list(workflows: &[(&str, Option<&str>)]) -> String {
        if workflows.is_empty() {
            return format!("{}\n", "No workflows configured.".yellow());
        }
        let mut output = Self::section_header("Available workflows");
        for (name, description) in workflows {
            match description {
                Some(description) => output.push_str(&format!(
                    "  {} {}\n",
                    name.cyan().bold(),
                    format!("- {}", description).dimmed()
                )),
                None => output.push_str(&format!("  {}\n", name.cyan().bold())),
            }
        }
        output
    }

    /// Tools offered to the model, one per line
    pub fn format_tools(tools: &[&ToolDescriptor]) -> String {
        if tools.is_empty() {
            return format!("{}\n", "No tools available.".dimmed());
        }
        let mut output = format!("{} {}\n", "Tools:".cyan().bold(), tools.len());
        for tool in tools {
            let params: Vec<String> = tool
                .parameters
                .properties
                .keys()
                .map(|name| {
                    if tool.parameters.required.contains(name) {
                        name.clone()
                    } else {
                        format!("{}?", name)
                    }
                })
                .collect();
            output.push_str(&format!(
                "  {}({}) {}\n",
                tool.name.green(),
                params.join(", "),
                tool.description.dimmed()
            ));
        }
        output
    }

    /// Final answer of a run
    pub fn format_answer(result: &RunQueryOutput) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", "=== Answer ===".cyan().bold()));
        if result.answer.is_empty() {
            output.push_str(&format!("{}\n", "(no answer)".dimmed()));
        } else {
            output.push_str(&result.answer);
            output.push('\n');
        }
        if !result.termination.is_normal() {
            output.push_str(&format!(
                "\n{} {}\n",
                "Stopped:".yellow().bold(),
                result.termination
            ));
        }
        output
    }

    /// Answer, termination and transcript as JSON
    pub fn format_json(result: &RunQueryOutput) -> String {
        let value = json!({
            "answer": result.answer,
            "termination": result.termination,
            "model_calls": result.model_calls,
            "conversation": result.conversation.turns(),
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Configuration problems, errors first
    pub fn format_issues(issues: &[ConfigIssue]) -> String {
        let mut sorted: Vec<&ConfigIssue> = issues.iter().collect();
        sorted.sort_by_key(|issue| !issue.is_error());
        sorted
            .iter()
            .map(|issue| match issue.severity {
                Severity::Error => format!("  {} {}", "✗".red(), issue.message),
                Severity::Warning => format!("  {} {}", "!".yellow(), issue.message),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn section_header(title: &str) -> String {
        format!("{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpflow_domain::{
        ConfigIssueCode, ConversationState, ParamType, ParameterSchema, PropertySchema,
        Termination, Turn,
    };

    fn plain() {
        colored::control::set_override(false);
    }

    fn output(answer: &str, termination: Termination) -> RunQueryOutput {
        let mut conversation = ConversationState::new();
        conversation.push(Turn::user("What is 2 + 3?"));
        RunQueryOutput {
            answer: answer.to_string(),
            conversation,
            model_calls: 1,
            termination,
        }
    }

    #[test]
    fn test_workflow_list() {
        plain();
        let text = ConsoleFormatter::format_workflow_list(&[
            ("calculator", Some("Adds numbers")),
            ("weather", None),
        ]);
        assert!(text.contains("calculator - Adds numbers"));
        assert!(text.lines().any(|line| line == "  weather"));
    }

    #[test]
    fn test_empty_workflow_list() {
        plain();
        assert_eq!(
            ConsoleFormatter::format_workflow_list(&[]),
            "No workflows configured.\n"
        );
    }

    #[test]
    fn test_tools_mark_optional_parameters() {
        plain();
        let tool = ToolDescriptor::new("forecast", "Weather forecast").with_parameters(
            ParameterSchema::new()
                .with_property("city", PropertySchema::new(ParamType::String))
                .with_property("days", PropertySchema::new(ParamType::Integer))
                .with_required("city"),
        );
        let text = ConsoleFormatter::format_tools(&[&tool]);
        assert!(text.contains("forecast(city, days?) Weather forecast"));
    }

    #[test]
    fn test_answer_shows_abnormal_termination() {
        plain();
        let text = ConsoleFormatter::format_answer(&output("5", Termination::MaxTurnsReached));
        assert!(text.contains("5\n"));
        assert!(text.contains("Stopped: max_turns_reached"));

        let text = ConsoleFormatter::format_answer(&output("5", Termination::Answered));
        assert!(!text.contains("Stopped"));
    }

    #[test]
    fn test_json_output() {
        let json = ConsoleFormatter::format_json(&output("5", Termination::Answered));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["answer"], "5");
        assert_eq!(value["termination"]["kind"], "answered");
        assert_eq!(value["model_calls"], 1);
        assert_eq!(value["conversation"][0]["role"], "user");
    }

    #[test]
    fn test_issues_list_errors_first() {
        plain();
        let issues = vec![
            ConfigIssue::warning(ConfigIssueCode::NoServers, "no servers"),
            ConfigIssue::error(ConfigIssueCode::EmptyModel, "no model"),
        ];
        let text = ConsoleFormatter::format_issues(&issues);
        assert_eq!(text, "  ✗ no model\n  ! no servers");
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "  "), "  a\n  b");
    }
}
