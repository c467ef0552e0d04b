//! Shared handle for strategies backed by a model.

use crate::ports::backend_provider::{ProviderError, ProviderSet};
use sage_domain::{ModelName, ModelParameters, OrchestrationConfig, ProviderKind};
use std::sync::Arc;
use std::time::Duration;

/// A fixed model reached through the run's providers.
///
/// Planner, router, judge and moderator strategies each hold one of these.
#[derive(Debug, Clone)]
pub struct ModelCall {
    providers: Arc<ProviderSet>,
    model: ModelName,
    kind: ProviderKind,
    parameters: ModelParameters,
    timeout: Option<Duration>,
}

impl ModelCall {
    pub fn new(providers: Arc<ProviderSet>, model: ModelName, kind: ProviderKind) -> Self {
        Self {
            providers,
            model,
            kind,
            parameters: ModelParameters::default(),
            timeout: None,
        }
    }

    /// Model call whose provider family and parameters come from `config`.
    pub fn from_config(
        providers: Arc<ProviderSet>,
        config: &OrchestrationConfig,
        model: &ModelName,
    ) -> Self {
        Self::new(providers, model.clone(), config.provider_of(model))
            .with_parameters(config.parameters_for(model))
    }

    pub fn with_parameters(mut self, parameters: ModelParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &ModelName {
        &self.model
    }

    pub async fn send(&self, prompt: &str) -> Result<String, ProviderError> {
        self.providers
            .invoke(self.kind, &self.model, prompt, &self.parameters, self.timeout)
            .await
    }
}
