//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly; [`FileConfig::to_orchestration_config`]
//! turns them into the frozen domain snapshot once validated.

mod escalation;
mod logging;
mod models;
mod orchestration;
mod output;
mod providers;

pub use escalation::FileEscalationConfig;
pub use logging::FileLoggingConfig;
pub use models::{FileModelEntry, FileModelsConfig};
pub use orchestration::{
    AggregationChoice, AssignmentChoice, DecompositionChoice, FileOrchestrationConfig,
};
pub use output::{FileOutputConfig, FileOutputFormat};
pub use providers::{FileOllamaConfig, FileOpenAiConfig, FileProvidersConfig};

use sage_application::ExecutionParams;
use sage_domain::{ModelName, OrchestrationConfig, ProviderSelection, TaskType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error("orchestration.similarity_threshold must be within [0, 1] (got {0})")]
    InvalidThreshold(f64),

    #[error("orchestration.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("models.available cannot be empty")]
    NoModels,

    #[error("{field}: model name cannot be empty")]
    EmptyModelName { field: String },

    #[error("model '{0}' is listed more than once in models.available")]
    DuplicateModel(String),

    #[error("model '{model}': unknown provider '{value}' (expected local or cloud)")]
    UnknownProvider { model: String, value: String },

    #[error("orchestration.provider_selection: unknown value '{0}' (expected local, cloud or all)")]
    UnknownSelection(String),

    #[error("models.task_preferences: unknown task type '{0}'")]
    UnknownTaskType(String),

    #[error("{field}: model '{model}' is not in models.available")]
    UnknownModel { field: String, model: String },

    #[error("escalation: {0}")]
    InvalidEscalation(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Thresholds, budgets and strategy choices
    pub orchestration: FileOrchestrationConfig,
    /// Available models and task-type preferences
    pub models: FileModelsConfig,
    /// Retry escalation bounds
    pub escalation: FileEscalationConfig,
    /// Provider endpoints and credentials
    pub providers: FileProvidersConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Run log settings
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration, stopping at the first problem.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let orchestration = &self.orchestration;

        let threshold = orchestration.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigValidationError::InvalidThreshold(threshold));
        }

        // Timeout of 0 seconds doesn't make sense
        if let Some(0) = orchestration.timeout_seconds {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        self.selection()?;

        if self.models.available.is_empty() {
            return Err(ConfigValidationError::NoModels);
        }

        let mut seen = HashSet::new();
        for entry in &self.models.available {
            let name = entry.name.trim();
            if name.is_empty() {
                return Err(ConfigValidationError::EmptyModelName {
                    field: "models.available".to_string(),
                });
            }
            if !seen.insert(name) {
                return Err(ConfigValidationError::DuplicateModel(name.to_string()));
            }
            if let Err(value) = entry.provider_kind() {
                return Err(ConfigValidationError::UnknownProvider {
                    model: name.to_string(),
                    value,
                });
            }
        }

        let roles = [
            ("orchestration.default_model", Some(&orchestration.default_model)),
            ("orchestration.evaluator_model", orchestration.evaluator_model.as_ref()),
            ("orchestration.planner_model", orchestration.planner_model.as_ref()),
            ("orchestration.router_model", orchestration.router_model.as_ref()),
            ("orchestration.moderator_model", orchestration.moderator_model.as_ref()),
        ];
        for (field, value) in roles {
            if let Some(model) = value
                && model.trim().is_empty()
            {
                return Err(ConfigValidationError::EmptyModelName {
                    field: field.to_string(),
                });
            }
        }

        if !self.models.contains(&orchestration.default_model) {
            return Err(ConfigValidationError::UnknownModel {
                field: "orchestration.default_model".to_string(),
                model: orchestration.default_model.clone(),
            });
        }

        for (task, model) in &self.models.task_preferences {
            if TaskType::parse_strict(task).is_none() {
                return Err(ConfigValidationError::UnknownTaskType(task.clone()));
            }
            let field = format!("models.task_preferences.{task}");
            if model.trim().is_empty() {
                return Err(ConfigValidationError::EmptyModelName { field });
            }
            if !self.models.contains(model) {
                return Err(ConfigValidationError::UnknownModel {
                    field,
                    model: model.clone(),
                });
            }
        }

        if let Some(problem) = self.escalation.problem() {
            return Err(ConfigValidationError::InvalidEscalation(problem));
        }

        Ok(())
    }

    /// Provider families a run may use
    pub fn selection(&self) -> Result<ProviderSelection, ConfigValidationError> {
        self.orchestration
            .provider_selection
            .parse()
            .map_err(|_| {
                ConfigValidationError::UnknownSelection(
                    self.orchestration.provider_selection.clone(),
                )
            })
    }

    /// Validate and freeze into the domain snapshot.
    pub fn to_orchestration_config(&self) -> Result<OrchestrationConfig, ConfigValidationError> {
        self.validate()?;
        let orchestration = &self.orchestration;

        let mut config = OrchestrationConfig::default()
            .with_acceptance_threshold(orchestration.similarity_threshold)
            .with_max_retries(orchestration.max_retries)
            .with_default_model(orchestration.default_model.trim())
            .with_bounds(self.escalation.to_bounds());

        let mut available = Vec::with_capacity(self.models.available.len());
        for entry in &self.models.available {
            let provider = entry.provider_kind().map_err(|value| {
                ConfigValidationError::UnknownProvider {
                    model: entry.name.clone(),
                    value,
                }
            })?;
            available.push(entry.spec(provider));
            if let Some(parameters) = entry.parameters() {
                config = config.with_model_parameters(entry.name.trim(), parameters);
            }
        }
        config = config.with_available_models(available);

        for (task, model) in &self.models.task_preferences {
            if let Some(task_type) = TaskType::parse_strict(task) {
                config = config.with_task_preference(task_type, model.trim());
            }
        }

        if let Some(evaluator) = &orchestration.evaluator_model {
            config = config.with_evaluator_model(evaluator.trim());
        }

        Ok(config)
    }

    /// Call control derived from `[orchestration]`
    pub fn execution_params(&self) -> ExecutionParams {
        ExecutionParams::from_timeout_seconds(self.orchestration.timeout_seconds)
            .with_probe_providers(self.orchestration.probe_providers)
    }

    /// Model names for the planner, router and moderator roles
    pub fn role_model(&self, role: Option<&String>) -> ModelName {
        ModelName::from(self.orchestration.model_for(role).trim())
    }
}
