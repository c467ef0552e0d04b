//! Frozen orchestration configuration and per-run model eligibility.

use crate::assignment::{ModelParameters, ParameterBounds};
use crate::core::error::DomainError;
use crate::core::model::{ModelName, ModelSpec, ProviderKind};
use crate::subtask::TaskType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which provider families a run may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderSelection {
    Local,
    Cloud,
    #[default]
    All,
}

impl ProviderSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderSelection::Local => "local",
            ProviderSelection::Cloud => "cloud",
            ProviderSelection::All => "all",
        }
    }

    pub fn includes(&self, kind: ProviderKind) -> bool {
        match self {
            ProviderSelection::Local => kind == ProviderKind::Local,
            ProviderSelection::Cloud => kind == ProviderKind::Cloud,
            ProviderSelection::All => true,
        }
    }
}

impl std::fmt::Display for ProviderSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderSelection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(ProviderSelection::Local),
            "cloud" => Ok(ProviderSelection::Cloud),
            "all" | "both" => Ok(ProviderSelection::All),
            other => Err(DomainError::UnknownProvider(other.to_string())),
        }
    }
}

/// Models usable for one run, in configuration order.
///
/// Computed once when a run starts and never re-queried.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibleModels {
    models: Vec<ModelSpec>,
}

impl EligibleModels {
    pub fn new(models: Vec<ModelSpec>) -> Self {
        Self { models }
    }

    pub fn contains(&self, name: &ModelName) -> bool {
        self.models.iter().any(|m| &m.name == name)
    }

    pub fn get(&self, name: &ModelName) -> Option<&ModelSpec> {
        self.models.iter().find(|m| &m.name == name)
    }

    pub fn first(&self) -> Option<&ModelSpec> {
        self.models.first()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.iter()
    }

    pub fn names(&self) -> Vec<ModelName> {
        self.models.iter().map(|m| m.name.clone()).collect()
    }

    /// Drop `kind` models that `reachable` does not list; other kinds are kept.
    pub fn narrowed(&self, kind: ProviderKind, reachable: &[ModelName]) -> Self {
        Self {
            models: self
                .models
                .iter()
                .filter(|m| m.provider != kind || reachable.contains(&m.name))
                .cloned()
                .collect(),
        }
    }
}

/// Immutable snapshot of everything that steers a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationConfig {
    /// Minimum judge confidence (with a pass verdict) to accept an attempt
    pub acceptance_threshold: f64,
    /// Attempts per sub-task, including the first
    pub max_attempts: usize,
    pub default_model: ModelName,
    pub available_models: Vec<ModelSpec>,
    pub task_preferences: HashMap<TaskType, ModelName>,
    pub model_parameters: HashMap<ModelName, ModelParameters>,
    /// Model used by judge-model evaluation; `None` means the default model
    pub evaluator_model: Option<ModelName>,
    pub bounds: ParameterBounds,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 0.9,
            max_attempts: 4,
            default_model: ModelName::from("gemma3:4b"),
            available_models: vec![
                ModelSpec::new("gemma3:4b", ProviderKind::Local),
                ModelSpec::new("deepseek-r1:1.5b", ProviderKind::Local),
                ModelSpec::new("qwen3:1.7b", ProviderKind::Local),
            ],
            task_preferences: HashMap::new(),
            model_parameters: HashMap::new(),
            evaluator_model: Some(ModelName::from("deepseek-r1:1.5b")),
            bounds: ParameterBounds::default(),
        }
    }
}

impl OrchestrationConfig {
    // ==================== Builder Methods ====================

    pub fn with_acceptance_threshold(mut self, threshold: f64) -> Self {
        self.acceptance_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Retries after the first attempt; `max_attempts = retries + 1`.
    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_attempts = retries + 1;
        self
    }

    pub fn with_default_model(mut self, model: impl Into<ModelName>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_available_models(mut self, models: Vec<ModelSpec>) -> Self {
        self.available_models = models;
        self
    }

    pub fn with_task_preference(mut self, task_type: TaskType, model: impl Into<ModelName>) -> Self {
        self.task_preferences.insert(task_type, model.into());
        self
    }

    pub fn with_model_parameters(
        mut self,
        model: impl Into<ModelName>,
        parameters: ModelParameters,
    ) -> Self {
        self.model_parameters.insert(model.into(), parameters);
        self
    }

    pub fn with_evaluator_model(mut self, model: impl Into<ModelName>) -> Self {
        self.evaluator_model = Some(model.into());
        self
    }

    pub fn with_bounds(mut self, bounds: ParameterBounds) -> Self {
        self.bounds = bounds;
        self
    }

    // ==================== Queries ====================

    /// Configured default parameters for `model` (provider defaults if none).
    pub fn parameters_for(&self, model: &ModelName) -> ModelParameters {
        self.model_parameters.get(model).cloned().unwrap_or_default()
    }

    pub fn preferred_model(&self, task_type: TaskType) -> Option<&ModelName> {
        self.task_preferences.get(&task_type)
    }

    pub fn evaluator(&self) -> &ModelName {
        self.evaluator_model.as_ref().unwrap_or(&self.default_model)
    }

    /// Provider family for `model`: as configured, else inferred from the name.
    pub fn provider_of(&self, model: &ModelName) -> ProviderKind {
        self.available_models
            .iter()
            .find(|m| &m.name == model)
            .map(|m| m.provider)
            .unwrap_or_else(|| ProviderKind::infer(model.as_str()))
    }

    /// Models whose provider family `selection` admits.
    pub fn eligible_models(&self, selection: ProviderSelection) -> EligibleModels {
        EligibleModels::new(
            self.available_models
                .iter()
                .filter(|m| selection.includes(m.provider))
                .cloned()
                .collect(),
        )
    }
}
