//! Decomposition strategy port

use super::backend_provider::ProviderError;
use async_trait::async_trait;
use sage_domain::{PlanError, Request, SubTaskSpec};
use thiserror::Error;

/// Errors a decomposition strategy can report
#[derive(Error, Debug)]
pub enum DecompositionError {
    #[error("Planner call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Planner reply could not be parsed: {0}")]
    Unparseable(String),

    #[error("Invalid decomposition: {0}")]
    Invalid(#[from] PlanError),

    #[error("{0}")]
    Other(String),
}

/// Splits a request into an ordered list of sub-tasks
///
/// The engine calls this exactly once per run and validates the result.
#[async_trait]
pub trait DecompositionStrategy: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    async fn decompose(
        &self,
        request: &Request,
        context: Option<&str>,
    ) -> Result<Vec<SubTaskSpec>, DecompositionError>;
}
