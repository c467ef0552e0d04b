//! Assignment strategies.
//!
//! [`ConfiguredAssignment`] is deterministic and never consults a model.
//! [`LlmAssignment`] asks a router model and reports an error when the reply
//! names no usable model; the sub-task runner then falls back to the default.

use super::model_call::ModelCall;
use crate::ports::assignment::{AssignmentError, AssignmentStrategy};
use async_trait::async_trait;
use sage_domain::{
    EligibleModels, ModelName, OrchestrationConfig, PromptTemplate, SubTaskSpec,
    extract_model_name,
};
use std::sync::Arc;
use tracing::debug;

/// Task-type preference, then the default model, then configuration order
///
/// Models in `excluded` are skipped while any other eligible model remains;
/// with a single eligible model the same model is reused.
pub struct ConfiguredAssignment {
    config: Arc<OrchestrationConfig>,
}

impl ConfiguredAssignment {
    pub fn new(config: Arc<OrchestrationConfig>) -> Self {
        Self { config }
    }

    fn ranked<'a>(&'a self, spec: &SubTaskSpec, eligible: &'a EligibleModels) -> Vec<&'a ModelName> {
        let mut ranked: Vec<&ModelName> = Vec::with_capacity(eligible.len() + 2);
        if let Some(preferred) = self.config.preferred_model(spec.task_type) {
            ranked.push(preferred);
        }
        ranked.push(&self.config.default_model);
        ranked.extend(eligible.iter().map(|m| &m.name));

        let mut unique: Vec<&ModelName> = Vec::with_capacity(ranked.len());
        for model in ranked {
            if eligible.contains(model) && !unique.contains(&model) {
                unique.push(model);
            }
        }
        unique
    }
}

#[async_trait]
impl AssignmentStrategy for ConfiguredAssignment {
    fn name(&self) -> &'static str {
        "configured"
    }

    async fn select(
        &self,
        spec: &SubTaskSpec,
        eligible: &EligibleModels,
        excluded: &[ModelName],
    ) -> Result<ModelName, AssignmentError> {
        let ranked = self.ranked(spec, eligible);
        ranked
            .iter()
            .find(|m| !excluded.contains(**m))
            .or_else(|| ranked.first())
            .map(|m| (*m).clone())
            .ok_or(AssignmentError::NoCandidates)
    }
}

/// Ask a router model which eligible model fits the sub-task
pub struct LlmAssignment {
    router: ModelCall,
}

impl LlmAssignment {
    pub fn new(router: ModelCall) -> Self {
        Self { router }
    }
}

#[async_trait]
impl AssignmentStrategy for LlmAssignment {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn select(
        &self,
        spec: &SubTaskSpec,
        eligible: &EligibleModels,
        excluded: &[ModelName],
    ) -> Result<ModelName, AssignmentError> {
        let mut candidates: Vec<ModelName> = eligible
            .iter()
            .map(|m| m.name.clone())
            .filter(|m| !excluded.contains(m))
            .collect();
        if candidates.is_empty() {
            candidates = eligible.names();
        }
        if candidates.is_empty() {
            return Err(AssignmentError::NoCandidates);
        }

        let prompt = PromptTemplate::selection_prompt(spec, &candidates);
        let reply = self.router.send(&prompt).await?;
        debug!(sub_task = %spec.id, "Router replied: {}", reply.trim());

        extract_model_name(&reply, &candidates)
            .cloned()
            .ok_or_else(|| AssignmentError::Unrecognized(reply.chars().take(120).collect()))
    }
}
