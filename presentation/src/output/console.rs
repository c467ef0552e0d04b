//! Console output formatter for run results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use sage_domain::{AggregatedResponse, Attempt, SubTaskOutcome, SubTaskStatus};
use serde_json::json;

/// Formats run results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Enable or disable ANSI colors for everything formatted afterwards
    pub fn set_color(enabled: bool) {
        colored::control::set_override(enabled);
    }

    /// Format the complete result
    pub fn format(result: &AggregatedResponse) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Sage Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n\n",
            "Request:".cyan().bold(),
            result.request
        ));

        output.push_str(&Self::section_header("Sub-tasks"));
        for outcome in &result.per_sub_task {
            output.push_str(&Self::outcome_block(outcome));
        }

        output.push_str(&Self::section_header("Final Answer"));
        output.push_str(&format!("\n{}\n", result.final_text));

        let summary = &result.summary;
        output.push_str(&format!(
            "\n{} {}/{} accepted, {} attempts, {:.1}s\n",
            "Summary:".cyan().bold(),
            summary.num_accepted,
            summary.num_sub_tasks,
            summary.total_attempts,
            summary.total_elapsed_ms as f64 / 1000.0
        ));

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(result: &AggregatedResponse) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the final answer only
    pub fn format_final_only(result: &AggregatedResponse) -> String {
        format!("{}\n", result.final_text)
    }

    /// Format the outcomes gathered before a run was interrupted
    pub fn format_partial(outcomes: &[SubTaskOutcome]) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{}\n",
            "=== Run cancelled: partial results ===".yellow().bold()
        ));
        if outcomes.is_empty() {
            output.push_str(&format!("{}\n", "No sub-task had started.".dimmed()));
        }
        for outcome in outcomes {
            output.push_str(&Self::outcome_block(outcome));
        }
        output
    }

    /// Format interrupted outcomes as JSON
    pub fn format_partial_json(outcomes: &[SubTaskOutcome]) -> String {
        let value = json!({ "cancelled": true, "per_sub_task": outcomes });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    fn outcome_block(outcome: &SubTaskOutcome) -> String {
        let spec = outcome.spec();
        let title = format!(
            "── Sub-task {} [{}] {} ──",
            spec.id,
            spec.task_type,
            outcome.status()
        );
        let title = match outcome.status() {
            SubTaskStatus::Accepted => title.green().bold(),
            SubTaskStatus::Exhausted => title.yellow().bold(),
            _ => title.dimmed(),
        };

        let mut block = format!("\n{}\n{} {}\n", title, "Prompt:".bold(), spec.prompt_text);

        for attempt in outcome.attempts() {
            block.push_str(&format!("  {}\n", Self::attempt_line(attempt)));
        }

        if let Some(reason) = outcome.failure_reason() {
            block.push_str(&format!("  {} {}\n", "!".red(), reason));
        }

        match outcome.effective_output() {
            Some(text) => block.push_str(&format!("\n{}\n", Self::indent(text, "  "))),
            None => block.push_str(&format!("\n  {}\n", "[no output]".dimmed())),
        }
        block
    }

    fn attempt_line(attempt: &Attempt) -> String {
        let assignment = attempt.assignment();
        let head = format!("#{} {}", assignment.attempt_index + 1, assignment.model_name);
        match &attempt.evaluation {
            Some(eval) => {
                let mark = if eval.verdict.is_pass() {
                    "v".green()
                } else {
                    "x".red()
                };
                format!(
                    "{} {} {} {:.2} ({})",
                    mark, head, eval.verdict, eval.confidence, eval.method
                )
            }
            None => format!(
                "{} {} {}",
                "x".red(),
                head,
                attempt
                    .execution
                    .error_detail
                    .as_deref()
                    .unwrap_or("call failed")
                    .red()
            ),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, result: &AggregatedResponse) -> String {
        Self::format(result)
    }

    fn format_json(&self, result: &AggregatedResponse) -> String {
        Self::format_json(result)
    }

    fn format_final_only(&self, result: &AggregatedResponse) -> String {
        Self::format_final_only(result)
    }

    fn format_partial(&self, outcomes: &[SubTaskOutcome]) -> String {
        Self::format_partial(outcomes)
    }
}
