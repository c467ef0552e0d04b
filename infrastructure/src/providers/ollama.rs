//! Ollama adapter (local models).

use super::http::{check_status, endpoint, transport_error};
use async_trait::async_trait;
use sage_application::{BackendProvider, ProviderError};
use sage_domain::{ModelName, ModelParameters, ProviderKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "GenerateOptions::is_empty")]
    options: GenerateOptions,
}

#[derive(Debug, Default, PartialEq, Serialize)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

impl GenerateOptions {
    fn from_parameters(parameters: &ModelParameters) -> Self {
        Self {
            temperature: parameters.temperature,
            num_predict: parameters.max_tokens,
            top_p: parameters.top_p,
            seed: parameters.seed,
        }
    }

    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// Local provider speaking the Ollama HTTP API
pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Use a preconfigured client (proxy, TLS or pool settings).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl BackendProvider for OllamaProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Local
    }

    async fn invoke(
        &self,
        model: &ModelName,
        prompt: &str,
        parameters: &ModelParameters,
    ) -> Result<String, ProviderError> {
        let request = GenerateRequest {
            model: model.as_str(),
            prompt,
            stream: false,
            options: GenerateOptions::from_parameters(parameters),
        };
        debug!("POST {}/api/generate model={}", self.base_url, model);

        let response = self
            .client
            .post(endpoint(&self.base_url, "/api/generate"))
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;
        let body: GenerateResponse = response.json().await.map_err(transport_error)?;
        Ok(body.response.trim().to_string())
    }

    /// Installed models; `name:latest` tags are also listed as `name`.
    async fn available_models(&self) -> Result<Vec<ModelName>, ProviderError> {
        let response = self
            .client
            .get(endpoint(&self.base_url, "/api/tags"))
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;
        let tags: TagsResponse = response.json().await.map_err(transport_error)?;

        let mut models = Vec::with_capacity(tags.models.len());
        for entry in tags.models {
            if let Some(bare) = entry.name.strip_suffix(":latest") {
                models.push(ModelName::from(bare));
            }
            models.push(ModelName::from(entry.name));
        }
        Ok(models)
    }
}
