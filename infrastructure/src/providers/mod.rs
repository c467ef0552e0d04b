//! Backend provider adapters
//!
//! One adapter per [`ProviderKind`](sage_domain::ProviderKind), both speaking
//! HTTP through `reqwest`:
//!
//! - [`OllamaProvider`]: local models behind an Ollama daemon
//! - [`OpenAiProvider`]: cloud models behind an OpenAI-compatible API
//!
//! [`build_provider_set`] registers whichever adapters the configuration
//! allows.

mod http;
mod ollama;
mod openai;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use crate::config::FileConfig;
use sage_application::ProviderSet;
use sage_domain::ProviderKind;
use std::sync::Arc;
use tracing::{debug, warn};

/// Register the providers the configuration allows.
///
/// Ollama is always registered. The cloud provider is registered only when an
/// API key resolves; a configured cloud model without a key is warned about.
pub fn build_provider_set(config: &FileConfig) -> ProviderSet {
    let mut providers = ProviderSet::new().with_provider(Arc::new(OllamaProvider::new(
        &config.providers.ollama.base_url,
    )));

    match config.providers.openai.resolve_api_key() {
        Some(key) => {
            providers = providers.with_provider(Arc::new(OpenAiProvider::new(
                &config.providers.openai.base_url,
                key,
            )));
        }
        None => {
            let wants_cloud = config
                .models
                .available
                .iter()
                .any(|m| m.provider_kind() == Ok(ProviderKind::Cloud));
            if wants_cloud {
                warn!(
                    "Cloud models are configured but ${} is not set; cloud provider disabled",
                    config.providers.openai.api_key_env
                );
            } else {
                debug!("No cloud API key; cloud provider not registered");
            }
        }
    }

    providers
}
