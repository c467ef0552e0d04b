//! Judgment strategy port

use async_trait::async_trait;
use sage_domain::EvaluationResult;

/// Judges whether an output fulfils a sub-task's goal
///
/// Judging never fails: an implementation that cannot reach its evaluator
/// degrades to a heuristic and reports it through
/// [`EvaluationResult::method`].
#[async_trait]
pub trait JudgmentStrategy: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    async fn judge(&self, goal: &str, output: &str) -> EvaluationResult;
}
