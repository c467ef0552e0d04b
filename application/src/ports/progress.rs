//! Progress notification port
//!
//! Defines the interface for reporting progress while a request is processed.

use sage_domain::{Attempt, SubTaskOutcome, SubTaskSpec};

/// Callback for progress updates during a run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain lines, etc.)
pub trait OrchestrationProgress: Send + Sync {
    /// Called once the request has been decomposed and validated
    fn on_decomposed(&self, specs: &[SubTaskSpec]);

    /// Called when a sub-task starts (`position` is zero-based)
    fn on_subtask_start(&self, spec: &SubTaskSpec, position: usize, total: usize);

    /// Called after every recorded attempt
    fn on_attempt(&self, spec: &SubTaskSpec, attempt: &Attempt);

    /// Called when a sub-task reaches a terminal state
    fn on_subtask_complete(&self, outcome: &SubTaskOutcome);

    /// Called before the final text is assembled
    fn on_aggregating(&self) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl OrchestrationProgress for NoProgress {
    fn on_decomposed(&self, _specs: &[SubTaskSpec]) {}
    fn on_subtask_start(&self, _spec: &SubTaskSpec, _position: usize, _total: usize) {}
    fn on_attempt(&self, _spec: &SubTaskSpec, _attempt: &Attempt) {}
    fn on_subtask_complete(&self, _outcome: &SubTaskOutcome) {}
}
