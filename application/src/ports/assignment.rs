//! Assignment strategy port

use super::backend_provider::ProviderError;
use async_trait::async_trait;
use sage_domain::{EligibleModels, ModelName, SubTaskSpec};
use thiserror::Error;

/// Errors an assignment strategy can report
///
/// The sub-task runner recovers from every variant by falling back to the
/// configured default model.
#[derive(Error, Debug)]
pub enum AssignmentError {
    #[error("No candidate models left")]
    NoCandidates,

    #[error("Router call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Router reply named no eligible model: {0}")]
    Unrecognized(String),
}

/// Picks the model for one attempt of a sub-task
#[async_trait]
pub trait AssignmentStrategy: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Choose a model from `eligible`, avoiding `excluded` where possible.
    ///
    /// `excluded` lists the models already tried for this sub-task, most
    /// recent last. It is empty on the first attempt.
    async fn select(
        &self,
        spec: &SubTaskSpec,
        eligible: &EligibleModels,
        excluded: &[ModelName],
    ) -> Result<ModelName, AssignmentError>;
}
