//! Output formatter trait

use sage_domain::{AggregatedResponse, SubTaskOutcome};

/// Trait for formatting run results
pub trait OutputFormatter {
    /// Format the complete result with every sub-task
    fn format(&self, result: &AggregatedResponse) -> String;

    /// Format as JSON
    fn format_json(&self, result: &AggregatedResponse) -> String;

    /// Format the final answer only (concise output)
    fn format_final_only(&self, result: &AggregatedResponse) -> String;

    /// Format the outcomes of an interrupted run
    fn format_partial(&self, outcomes: &[SubTaskOutcome]) -> String;
}
