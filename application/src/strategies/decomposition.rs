//! Decomposition strategies.
//!
//! | Strategy | Sub-tasks |
//! |----------|-----------|
//! | [`LlmDecomposition`] | Whatever the planner model proposes |
//! | [`TemplateDecomposition`] | Analyse, then respond (two steps) |
//! | [`SingleTaskDecomposition`] | The request itself as one sub-task |

use super::model_call::ModelCall;
use crate::ports::decomposition::{DecompositionError, DecompositionStrategy};
use async_trait::async_trait;
use sage_domain::{PromptTemplate, Request, SubTaskSpec, TaskType, parse_subtasks};
use std::sync::Arc;
use tracing::{debug, warn};

fn with_context(request: &Request, context: Option<&str>) -> String {
    match context {
        Some(ctx) if !ctx.trim().is_empty() => {
            format!("{}\n\nContext:\n{}", request.content(), ctx.trim())
        }
        _ => request.content().to_string(),
    }
}

/// The whole request as a single sub-task
pub struct SingleTaskDecomposition;

#[async_trait]
impl DecompositionStrategy for SingleTaskDecomposition {
    fn name(&self) -> &'static str {
        "single"
    }

    async fn decompose(
        &self,
        request: &Request,
        context: Option<&str>,
    ) -> Result<Vec<SubTaskSpec>, DecompositionError> {
        Ok(vec![SubTaskSpec::new("1", with_context(request, context))
            .with_expected_goal(request.content())])
    }
}

/// Fixed two-step plan: analyse the request, then answer it using the analysis
pub struct TemplateDecomposition;

#[async_trait]
impl DecompositionStrategy for TemplateDecomposition {
    fn name(&self) -> &'static str {
        "template"
    }

    async fn decompose(
        &self,
        request: &Request,
        context: Option<&str>,
    ) -> Result<Vec<SubTaskSpec>, DecompositionError> {
        let body = with_context(request, context);
        Ok(vec![
            SubTaskSpec::new(
                "analysis",
                format!("Analyze the main topic and key points of the following request:\n\n{body}"),
            )
            .with_task_type(TaskType::Analysis)
            .with_expected_goal("Identify the main topic and key points of the request"),
            SubTaskSpec::new(
                "response",
                format!("Using the analysis, write a detailed response to the following request:\n\n{body}"),
            )
            .with_task_type(TaskType::Creative)
            .with_expected_goal(format!("A comprehensive response to: {}", request.content()))
            .with_dependency("analysis"),
        ])
    }
}

/// Ask a planner model for the sub-task list
pub struct LlmDecomposition {
    planner: ModelCall,
    fallback: Option<Arc<dyn DecompositionStrategy>>,
}

impl LlmDecomposition {
    pub fn new(planner: ModelCall) -> Self {
        Self {
            planner,
            fallback: None,
        }
    }

    /// Strategy used when the planner fails or its reply is unusable
    pub fn with_fallback(mut self, fallback: Arc<dyn DecompositionStrategy>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    async fn recover(
        &self,
        error: DecompositionError,
        request: &Request,
        context: Option<&str>,
    ) -> Result<Vec<SubTaskSpec>, DecompositionError> {
        match &self.fallback {
            Some(fallback) => {
                warn!(
                    "Planner decomposition failed ({}), using {} decomposition",
                    error,
                    fallback.name()
                );
                fallback.decompose(request, context).await
            }
            None => Err(error),
        }
    }
}

#[async_trait]
impl DecompositionStrategy for LlmDecomposition {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn decompose(
        &self,
        request: &Request,
        context: Option<&str>,
    ) -> Result<Vec<SubTaskSpec>, DecompositionError> {
        let prompt = PromptTemplate::decomposition_prompt(request.content(), context);
        debug!(model = %self.planner.model(), "Requesting decomposition");

        let reply = match self.planner.send(&prompt).await {
            Ok(reply) => reply,
            Err(e) => return self.recover(e.into(), request, context).await,
        };

        match parse_subtasks(&reply) {
            Some(specs) => {
                debug!("Planner proposed {} sub-tasks", specs.len());
                Ok(specs)
            }
            None => {
                let snippet: String = reply.chars().take(200).collect();
                self.recover(DecompositionError::Unparseable(snippet), request, context)
                    .await
            }
        }
    }
}
