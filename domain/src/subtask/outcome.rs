//! Sub-task execution records and lifecycle.
//!
//! [`SubTaskOutcome`] is the accumulator the sub-task runner owns while it
//! drives one sub-task:
//!
//! ```text
//! PENDING ──start──▶ IN_PROGRESS ──accept──▶ ACCEPTED
//!                       │   ▲
//!                       │   └─ record_attempt (one per attempt)
//!                       └──────exhaust────▶ EXHAUSTED
//! ```
//!
//! ACCEPTED and EXHAUSTED are terminal; any further mutation is an
//! [`OutcomeError`]. A sub-task whose dependencies cannot be resolved is
//! created directly in EXHAUSTED with no attempts.

use super::spec::{SubTaskId, SubTaskSpec};
use crate::assignment::ModelAssignment;
use crate::evaluation::EvaluationResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw result of one backend call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub sub_task_id: SubTaskId,
    pub assignment: ModelAssignment,
    /// Empty when the call failed
    pub output_text: String,
    /// The provider call completed without transport or runtime failure
    pub succeeded_call: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    pub elapsed_ms: u64,
}

impl ExecutionResult {
    pub fn success(
        sub_task_id: SubTaskId,
        assignment: ModelAssignment,
        output_text: impl Into<String>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            sub_task_id,
            assignment,
            output_text: output_text.into(),
            succeeded_call: true,
            error_detail: None,
            elapsed_ms,
        }
    }

    pub fn failure(
        sub_task_id: SubTaskId,
        assignment: ModelAssignment,
        error: impl Into<String>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            sub_task_id,
            assignment,
            output_text: String::new(),
            succeeded_call: false,
            error_detail: Some(error.into()),
            elapsed_ms,
        }
    }
}

/// One assignment → invoke → judge cycle.
///
/// `evaluation` is `None` exactly when the call failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub execution: ExecutionResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationResult>,
}

impl Attempt {
    pub fn failed(execution: ExecutionResult) -> Self {
        Self {
            execution,
            evaluation: None,
        }
    }

    pub fn judged(execution: ExecutionResult, evaluation: EvaluationResult) -> Self {
        Self {
            execution,
            evaluation: Some(evaluation),
        }
    }

    pub fn assignment(&self) -> &ModelAssignment {
        &self.execution.assignment
    }

    pub fn index(&self) -> usize {
        self.execution.assignment.attempt_index
    }

    /// Judge confidence, if the attempt was judged
    pub fn confidence(&self) -> Option<f64> {
        self.evaluation.as_ref().map(|e| e.confidence)
    }
}

/// Lifecycle state of a sub-task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubTaskStatus {
    #[default]
    Pending,
    InProgress,
    Accepted,
    Exhausted,
}

impl SubTaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubTaskStatus::Pending => "pending",
            SubTaskStatus::InProgress => "in_progress",
            SubTaskStatus::Accepted => "accepted",
            SubTaskStatus::Exhausted => "exhausted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SubTaskStatus::Accepted | SubTaskStatus::Exhausted)
    }
}

impl std::fmt::Display for SubTaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rejected lifecycle mutation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OutcomeError {
    #[error("cannot {action} sub-task in state {from}")]
    InvalidTransition {
        from: SubTaskStatus,
        action: &'static str,
    },

    #[error("attempt {got} recorded out of order (expected {expected})")]
    AttemptOutOfOrder { expected: usize, got: usize },

    #[error("attempt {0} does not exist")]
    UnknownAttempt(usize),

    #[error("attempt {0} did not pass with sufficient confidence")]
    NotAcceptable(usize),
}

/// Accumulated state of one sub-task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubTaskOutcome {
    spec: SubTaskSpec,
    attempts: Vec<Attempt>,
    status: SubTaskStatus,
    best_attempt_index: Option<usize>,
    accepted_attempt_index: Option<usize>,
    failure_reason: Option<String>,
}

impl SubTaskOutcome {
    pub fn new(spec: SubTaskSpec) -> Self {
        Self {
            spec,
            attempts: Vec::new(),
            status: SubTaskStatus::Pending,
            best_attempt_index: None,
            accepted_attempt_index: None,
            failure_reason: None,
        }
    }

    /// A sub-task closed as EXHAUSTED without any attempt.
    pub fn not_run(spec: SubTaskSpec, reason: impl Into<String>) -> Self {
        Self {
            status: SubTaskStatus::Exhausted,
            failure_reason: Some(reason.into()),
            ..Self::new(spec)
        }
    }

    /// A sub-task that never ran because its inputs could not be resolved.
    pub fn dependency_failed(spec: SubTaskSpec, reason: impl Into<String>) -> Self {
        Self::not_run(spec, reason)
    }

    // ==================== Accessors ====================

    pub fn spec(&self) -> &SubTaskSpec {
        &self.spec
    }

    pub fn id(&self) -> &SubTaskId {
        &self.spec.id
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn status(&self) -> SubTaskStatus {
        self.status
    }

    pub fn best_attempt_index(&self) -> Option<usize> {
        self.best_attempt_index
    }

    pub fn accepted_attempt_index(&self) -> Option<usize> {
        self.accepted_attempt_index
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn is_accepted(&self) -> bool {
        self.status == SubTaskStatus::Accepted
    }

    /// The attempt whose output stands for this sub-task: the accepted one,
    /// otherwise the highest-confidence judged one.
    pub fn effective_attempt(&self) -> Option<&Attempt> {
        self.accepted_attempt_index
            .or(self.best_attempt_index)
            .and_then(|i| self.attempts.get(i))
    }

    pub fn effective_output(&self) -> Option<&str> {
        self.effective_attempt()
            .map(|a| a.execution.output_text.as_str())
    }

    pub fn effective_confidence(&self) -> Option<f64> {
        self.effective_attempt().and_then(Attempt::confidence)
    }

    pub fn total_elapsed_ms(&self) -> u64 {
        self.attempts.iter().map(|a| a.execution.elapsed_ms).sum()
    }

    // ==================== Transitions ====================

    pub fn start(&mut self) -> Result<(), OutcomeError> {
        if self.status != SubTaskStatus::Pending {
            return Err(OutcomeError::InvalidTransition {
                from: self.status,
                action: "start",
            });
        }
        self.status = SubTaskStatus::InProgress;
        Ok(())
    }

    /// Append an attempt and return its index.
    ///
    /// The best attempt only moves on a strictly higher confidence, so the
    /// earliest attempt wins ties.
    pub fn record_attempt(&mut self, attempt: Attempt) -> Result<usize, OutcomeError> {
        self.require_in_progress("record an attempt for")?;

        let expected = self.attempts.len();
        if attempt.index() != expected {
            return Err(OutcomeError::AttemptOutOfOrder {
                expected,
                got: attempt.index(),
            });
        }

        if let Some(confidence) = attempt.confidence() {
            let improves = match self.best_attempt_index.and_then(|i| self.attempts[i].confidence()) {
                Some(best) => confidence > best,
                None => true,
            };
            if improves {
                self.best_attempt_index = Some(expected);
            }
        }

        self.attempts.push(attempt);
        Ok(expected)
    }

    /// Accept a recorded attempt that passed with at least `threshold`.
    pub fn accept(&mut self, index: usize, threshold: f64) -> Result<(), OutcomeError> {
        self.require_in_progress("accept")?;
        let attempt = self
            .attempts
            .get(index)
            .ok_or(OutcomeError::UnknownAttempt(index))?;
        let clears = attempt
            .evaluation
            .as_ref()
            .is_some_and(|e| e.clears(threshold));
        if !clears {
            return Err(OutcomeError::NotAcceptable(index));
        }
        self.accepted_attempt_index = Some(index);
        self.status = SubTaskStatus::Accepted;
        Ok(())
    }

    /// Give up; the effective output falls back to the best attempt.
    pub fn exhaust(&mut self) -> Result<(), OutcomeError> {
        self.require_in_progress("exhaust")?;
        if self.best_attempt_index.is_none() {
            self.failure_reason = Some(format!(
                "no attempt produced judged output ({} attempts)",
                self.attempts.len()
            ));
        }
        self.status = SubTaskStatus::Exhausted;
        Ok(())
    }

    fn require_in_progress(&self, action: &'static str) -> Result<(), OutcomeError> {
        if self.status == SubTaskStatus::InProgress {
            Ok(())
        } else {
            Err(OutcomeError::InvalidTransition {
                from: self.status,
                action,
            })
        }
    }
}
