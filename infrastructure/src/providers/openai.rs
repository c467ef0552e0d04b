//! OpenAI-compatible adapter (cloud models).

use super::http::{check_status, endpoint, transport_error};
use async_trait::async_trait;
use sage_application::{BackendProvider, ProviderError};
use sage_domain::{ModelName, ModelParameters, ProviderKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

/// Cloud provider speaking the OpenAI chat completions API
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Use a preconfigured client (proxy, TLS or pool settings).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl BackendProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Cloud
    }

    async fn invoke(
        &self,
        model: &ModelName,
        prompt: &str,
        parameters: &ModelParameters,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: model.as_str(),
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: parameters.temperature,
            max_tokens: parameters.max_tokens,
            top_p: parameters.top_p,
            seed: parameters.seed,
        };
        debug!("POST {}/v1/chat/completions model={}", self.base_url, model);

        let response = self
            .client
            .post(endpoint(&self.base_url, "/v1/chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;
        let body: ChatResponse = response.json().await.map_err(transport_error)?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| ProviderError::InvalidResponse("no message content".to_string()))
    }

    async fn available_models(&self) -> Result<Vec<ModelName>, ProviderError> {
        let response = self
            .client
            .get(endpoint(&self.base_url, "/v1/models"))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;
        let models: ModelsResponse = response.json().await.map_err(transport_error)?;
        Ok(models.data.into_iter().map(|m| ModelName::from(m.id)).collect())
    }
}
