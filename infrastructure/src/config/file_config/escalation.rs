//! Retry escalation bounds from TOML (`[escalation]` section)

use sage_domain::ParameterBounds;
use serde::{Deserialize, Serialize};

/// Raw escalation configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEscalationConfig {
    pub temperature_step: f64,
    pub max_temperature: f64,
    /// Starting point when a model has no configured temperature
    pub base_temperature: f64,
    pub max_tokens_factor: f64,
    pub max_tokens_ceiling: u32,
}

impl Default for FileEscalationConfig {
    fn default() -> Self {
        let bounds = ParameterBounds::default();
        Self {
            temperature_step: bounds.temperature_step,
            max_temperature: bounds.max_temperature,
            base_temperature: bounds.base_temperature,
            max_tokens_factor: bounds.max_tokens_factor,
            max_tokens_ceiling: bounds.max_tokens_ceiling,
        }
    }
}

impl FileEscalationConfig {
    /// Description of the first problem found, if any
    pub fn problem(&self) -> Option<String> {
        if self.temperature_step <= 0.0 {
            return Some(format!(
                "temperature_step must be positive (got {})",
                self.temperature_step
            ));
        }
        if self.max_tokens_factor < 1.0 {
            return Some(format!(
                "max_tokens_factor must be at least 1.0 (got {})",
                self.max_tokens_factor
            ));
        }
        if self.max_temperature < self.base_temperature {
            return Some(format!(
                "max_temperature ({}) is below base_temperature ({})",
                self.max_temperature, self.base_temperature
            ));
        }
        None
    }

    pub fn to_bounds(&self) -> ParameterBounds {
        ParameterBounds {
            temperature_step: self.temperature_step,
            max_temperature: self.max_temperature,
            base_temperature: self.base_temperature,
            max_tokens_factor: self.max_tokens_factor,
            max_tokens_ceiling: self.max_tokens_ceiling,
        }
    }
}
