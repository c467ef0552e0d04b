//! Orchestration value objects - immutable results of one run.
//!
//! - [`RunSummary`] - counts and timing across all sub-tasks
//! - [`AggregatedResponse`] - final text plus every sub-task's outcome

use crate::core::request::Request;
use crate::subtask::{SubTaskOutcome, SubTaskStatus};
use serde::{Deserialize, Serialize};

/// Counts and timing for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub num_sub_tasks: usize,
    pub num_accepted: usize,
    pub num_exhausted: usize,
    pub total_attempts: usize,
    /// Accepted sub-tasks over all sub-tasks; `0.0` when there are none
    pub success_rate: f64,
    /// Wall-clock time of the whole run
    pub total_elapsed_ms: u64,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[SubTaskOutcome], total_elapsed_ms: u64) -> Self {
        let num_sub_tasks = outcomes.len();
        let num_accepted = outcomes
            .iter()
            .filter(|o| o.status() == SubTaskStatus::Accepted)
            .count();
        let num_exhausted = outcomes
            .iter()
            .filter(|o| o.status() == SubTaskStatus::Exhausted)
            .count();
        let total_attempts = outcomes.iter().map(|o| o.attempts().len()).sum();
        let success_rate = if num_sub_tasks == 0 {
            0.0
        } else {
            num_accepted as f64 / num_sub_tasks as f64
        };

        Self {
            num_sub_tasks,
            num_accepted,
            num_exhausted,
            total_attempts,
            success_rate,
            total_elapsed_ms,
        }
    }
}

/// Final result of processing one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedResponse {
    pub request: Request,
    pub final_text: String,
    /// In decomposition order
    pub per_sub_task: Vec<SubTaskOutcome>,
    pub summary: RunSummary,
}

impl AggregatedResponse {
    pub fn new(
        request: Request,
        final_text: impl Into<String>,
        per_sub_task: Vec<SubTaskOutcome>,
        total_elapsed_ms: u64,
    ) -> Self {
        let summary = RunSummary::from_outcomes(&per_sub_task, total_elapsed_ms);
        Self {
            request,
            final_text: final_text.into(),
            per_sub_task,
            summary,
        }
    }

    pub fn all_accepted(&self) -> bool {
        self.per_sub_task.iter().all(SubTaskOutcome::is_accepted)
    }
}
