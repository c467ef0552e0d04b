//! Model configuration from TOML (`[models]` section)

use sage_domain::{ModelParameters, ModelSpec, ProviderKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One configured model
///
/// # Example
///
/// ```toml
/// [[models.available]]
/// name = "gemma3:4b"
/// provider = "local"    # optional, inferred from the name
/// temperature = 0.7
/// max_tokens = 1024
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl FileModelEntry {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Provider family: as configured, else inferred from the name.
    ///
    /// Returns the unparsed string on failure.
    pub fn provider_kind(&self) -> Result<ProviderKind, String> {
        match &self.provider {
            Some(p) => p.parse().map_err(|_| p.clone()),
            None => Ok(ProviderKind::infer(self.name.trim())),
        }
    }

    pub fn spec(&self, provider: ProviderKind) -> ModelSpec {
        ModelSpec::new(self.name.trim(), provider)
    }

    /// Parameter defaults, `None` when nothing is configured
    pub fn parameters(&self) -> Option<ModelParameters> {
        let parameters = ModelParameters {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
            seed: self.seed,
        };
        (parameters != ModelParameters::default()).then_some(parameters)
    }
}

/// Raw model configuration from TOML
///
/// ```toml
/// [models.task_preferences]
/// code = "qwen3:1.7b"
/// summarization = "gemma3:4b"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelsConfig {
    /// Models usable by the engine, in preference order
    pub available: Vec<FileModelEntry>,
    /// Task type → preferred model
    pub task_preferences: BTreeMap<String, String>,
}

impl Default for FileModelsConfig {
    fn default() -> Self {
        Self {
            available: vec![
                FileModelEntry::named("gemma3:4b"),
                FileModelEntry::named("deepseek-r1:1.5b"),
                FileModelEntry::named("qwen3:1.7b"),
            ],
            task_preferences: BTreeMap::new(),
        }
    }
}

impl FileModelsConfig {
    pub fn contains(&self, name: &str) -> bool {
        self.available.iter().any(|m| m.name.trim() == name.trim())
    }

    /// Keep only the named models, in the order given.
    ///
    /// Names not configured yet are added with an inferred provider.
    pub fn restrict_to(&mut self, names: &[String]) {
        let available = std::mem::take(&mut self.available);
        self.available = names
            .iter()
            .map(|name| {
                available
                    .iter()
                    .find(|m| m.name.trim() == name.trim())
                    .cloned()
                    .unwrap_or_else(|| FileModelEntry::named(name.trim()))
            })
            .collect();
    }
}
