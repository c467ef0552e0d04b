//! Aggregation strategy port

use async_trait::async_trait;
use sage_domain::{Request, SubTaskOutcome};

/// Merges the effective outputs of all sub-tasks into the final text
#[async_trait]
pub trait AggregationStrategy: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// `outcomes` are in decomposition order.
    async fn aggregate(&self, request: &Request, outcomes: &[SubTaskOutcome]) -> String;
}
