//! Per-attempt assignment value object

use super::parameters::ModelParameters;
use crate::core::model::{ModelName, ProviderKind};
use serde::{Deserialize, Serialize};

/// The backend model and call parameters chosen for one attempt.
///
/// A fresh assignment is built for every attempt; retries never mutate the
/// previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAssignment {
    pub model_name: ModelName,
    pub provider_kind: ProviderKind,
    pub parameters: ModelParameters,
    /// Zero-based attempt this assignment belongs to
    pub attempt_index: usize,
}

impl ModelAssignment {
    pub fn new(
        model_name: ModelName,
        provider_kind: ProviderKind,
        parameters: ModelParameters,
        attempt_index: usize,
    ) -> Self {
        Self {
            model_name,
            provider_kind,
            parameters,
            attempt_index,
        }
    }

    /// Whether `other` would issue the identical call.
    pub fn same_call_as(&self, other: &ModelAssignment) -> bool {
        self.model_name == other.model_name
            && self.provider_kind == other.provider_kind
            && self.parameters == other.parameters
    }
}

impl std::fmt::Display for ModelAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] ({})",
            self.model_name,
            self.provider_kind,
            self.parameters.summary()
        )
    }
}
