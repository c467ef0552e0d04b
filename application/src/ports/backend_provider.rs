//! Backend provider port
//!
//! Defines the interface for running a prompt on a named model. One adapter
//! exists per provider family; [`ProviderSet`] routes each call to the
//! adapter for the assignment's [`ProviderKind`].

use async_trait::async_trait;
use sage_domain::{ModelName, ModelParameters, ProviderKind};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during a backend call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("No {0} provider configured")]
    NotConfigured(ProviderKind),

    #[error("Other error: {0}")]
    Other(String),
}

/// A provider family able to run prompts on its models
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait BackendProvider: Send + Sync {
    /// Family this provider serves
    fn kind(&self) -> ProviderKind;

    /// Run `prompt` on `model` and return the generated text
    async fn invoke(
        &self,
        model: &ModelName,
        prompt: &str,
        parameters: &ModelParameters,
    ) -> Result<String, ProviderError>;

    /// Models the provider can currently serve
    async fn available_models(&self) -> Result<Vec<ModelName>, ProviderError>;
}

/// Providers available to a run, keyed by family
#[derive(Clone, Default)]
pub struct ProviderSet {
    providers: BTreeMap<ProviderKind, Arc<dyn BackendProvider>>,
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any previous one of the same family
    pub fn with_provider(mut self, provider: Arc<dyn BackendProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&Arc<dyn BackendProvider>> {
        self.providers.get(&kind)
    }

    pub fn contains(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Registered providers, local first
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn BackendProvider>> {
        self.providers.values()
    }

    /// Run a prompt on the provider for `kind`, bounded by `timeout`.
    pub async fn invoke(
        &self,
        kind: ProviderKind,
        model: &ModelName,
        prompt: &str,
        parameters: &ModelParameters,
        timeout: Option<Duration>,
    ) -> Result<String, ProviderError> {
        let provider = self.get(kind).ok_or(ProviderError::NotConfigured(kind))?;
        let call = provider.invoke(model, prompt, parameters);
        match timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ProviderError::Timeout(limit))?,
            None => call.await,
        }
    }
}

impl std::fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<_> = self.providers.values().map(|p| p.kind()).collect();
        f.debug_struct("ProviderSet").field("kinds", &kinds).finish()
    }
}
