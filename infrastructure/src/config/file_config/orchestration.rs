//! Orchestration configuration from TOML (`[orchestration]` section)

use serde::{Deserialize, Serialize};

/// Which decomposition strategy to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecompositionChoice {
    /// Planner model proposes the sub-tasks
    #[default]
    Llm,
    /// The whole request as one sub-task
    Single,
    /// Analyse, then respond
    Template,
}

/// Which assignment strategy to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentChoice {
    /// Task-type preference, default model, then eligible order
    #[default]
    Configured,
    /// Router model picks a model per attempt
    Llm,
}

/// Which aggregation strategy to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationChoice {
    /// Ordered sections with sub-task headers
    #[default]
    Sectioned,
    /// Moderator model synthesises one answer
    Moderator,
}

/// Raw orchestration configuration from TOML
///
/// # Example
///
/// ```toml
/// [orchestration]
/// similarity_threshold = 0.9
/// max_retries = 3
/// default_model = "gemma3:4b"
/// evaluator_model = "deepseek-r1:1.5b"
/// provider_selection = "local"
/// decomposition = "template"
/// ```
/// Judge model used when the file names none
pub const DEFAULT_EVALUATOR_MODEL: &str = "deepseek-r1:1.5b";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestrationConfig {
    /// Acceptance threshold in [0, 1]
    pub similarity_threshold: f64,
    /// Retries after the first attempt
    pub max_retries: usize,
    pub default_model: String,
    /// Judge model; a small reasoning model out of the box
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluator_model: Option<String>,
    /// Planner model for `decomposition = "llm"` (default model when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planner_model: Option<String>,
    /// Router model for `assignment = "llm"` (default model when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub router_model: Option<String>,
    /// Moderator model for `aggregation = "moderator"` (default model when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderator_model: Option<String>,
    /// "local", "cloud" or "all"
    pub provider_selection: String,
    pub decomposition: DecompositionChoice,
    pub assignment: AssignmentChoice,
    pub aggregation: AggregationChoice,
    /// Per-call timeout; `None` waits indefinitely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    /// Ask providers for their model lists before each run
    pub probe_providers: bool,
}

impl Default for FileOrchestrationConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.9,
            max_retries: 3,
            default_model: "gemma3:4b".to_string(),
            evaluator_model: Some(DEFAULT_EVALUATOR_MODEL.to_string()),
            planner_model: None,
            router_model: None,
            moderator_model: None,
            provider_selection: "all".to_string(),
            decomposition: DecompositionChoice::default(),
            assignment: AssignmentChoice::default(),
            aggregation: AggregationChoice::default(),
            timeout_seconds: Some(120),
            probe_providers: false,
        }
    }
}

impl FileOrchestrationConfig {
    /// Model for a role, falling back to the default model
    pub fn model_for<'a>(&'a self, role: Option<&'a String>) -> &'a str {
        role.map(String::as_str).unwrap_or(&self.default_model)
    }

    pub fn planner(&self) -> &str {
        self.model_for(self.planner_model.as_ref())
    }

    pub fn router(&self) -> &str {
        self.model_for(self.router_model.as_ref())
    }

    pub fn moderator(&self) -> &str {
        self.model_for(self.moderator_model.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_choices_deserialize() {
        let toml_str = r#"
decomposition = "template"
assignment = "llm"
aggregation = "moderator"
"#;
        let config: FileOrchestrationConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.decomposition, DecompositionChoice::Template);
        assert_eq!(config.assignment, AssignmentChoice::Llm);
        assert_eq!(config.aggregation, AggregationChoice::Moderator);
        // untouched fields keep their defaults
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let result: Result<FileOrchestrationConfig, _> = toml::from_str(r#"decomposition = "magic""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_role_models_fall_back_to_default() {
        let config = FileOrchestrationConfig {
            planner_model: Some("qwen3:1.7b".to_string()),
            ..Default::default()
        };
        assert_eq!(config.planner(), "qwen3:1.7b");
        assert_eq!(config.router(), "gemma3:4b");
        assert_eq!(config.moderator(), "gemma3:4b");
    }

    #[test]
    fn test_evaluator_defaults_to_reasoning_model() {
        let config: FileOrchestrationConfig = toml::from_str(r#"default_model = "qwen3:1.7b""#).unwrap();
        assert_eq!(config.evaluator_model.as_deref(), Some("deepseek-r1:1.5b"));

        let config: FileOrchestrationConfig =
            toml::from_str(r#"evaluator_model = "gemma3:4b""#).unwrap();
        assert_eq!(config.evaluator_model.as_deref(), Some("gemma3:4b"));
    }
}
