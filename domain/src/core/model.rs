//! Backend model value objects

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// Name of a backend model, as the provider serving it knows it (Value Object)
///
/// Model names are opaque to the engine: `gemma3:4b`, `qwen3:1.7b`,
/// `gpt-4o-mini` are all valid. Comparisons are exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelName(String);

impl ModelName {
    /// Try to create a model name, rejecting blank input
    pub fn try_new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidModel("model name is empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModelName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ModelName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ModelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Provider family serving a model
///
/// Every model is reached through exactly one family. The run-time
/// [`ProviderSelection`](crate::orchestration::config::ProviderSelection)
/// decides which families are eligible for a run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Locally served models (e.g. an Ollama daemon)
    #[default]
    Local,
    /// Cloud-hosted models behind an API key
    Cloud,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Local => "local",
            ProviderKind::Cloud => "cloud",
        }
    }

    /// Guess the provider family from a model name.
    ///
    /// Known hosted families (`gpt-*`, `o1`/`o3`/`o4` reasoning models,
    /// `claude-*`, `gemini-*`) are cloud; everything else is assumed to be
    /// served locally.
    pub fn infer(model: &str) -> Self {
        let lower = model.to_lowercase();
        let hosted_prefix = ["o1", "o3", "o4"]
            .iter()
            .any(|p| lower == *p || lower.starts_with(&format!("{p}-")));
        if hosted_prefix
            || lower.contains("gpt")
            || lower.contains("claude")
            || lower.contains("gemini")
        {
            ProviderKind::Cloud
        } else {
            ProviderKind::Local
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "ollama" => Ok(ProviderKind::Local),
            "cloud" | "openai" => Ok(ProviderKind::Cloud),
            other => Err(DomainError::UnknownProvider(other.to_string())),
        }
    }
}

/// A configured model together with the family that serves it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: ModelName,
    pub provider: ProviderKind,
}

impl ModelSpec {
    pub fn new(name: impl Into<ModelName>, provider: ProviderKind) -> Self {
        Self {
            name: name.into(),
            provider,
        }
    }

    /// Build a spec whose provider is inferred from the name
    pub fn inferred(name: impl Into<ModelName>) -> Self {
        let name = name.into();
        let provider = ProviderKind::infer(name.as_str());
        Self { name, provider }
    }
}
