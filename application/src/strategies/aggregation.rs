//! Aggregation strategies.

use super::model_call::ModelCall;
use crate::ports::aggregation::AggregationStrategy;
use async_trait::async_trait;
use sage_domain::{PromptTemplate, Request, SubTaskOutcome};
use tracing::warn;

/// Ordered concatenation of effective outputs
///
/// With headers (the default) every sub-task gets a `## Sub-task <id>`
/// section and sub-tasks without output are marked `[no output]`. Without
/// headers only the available outputs are joined by blank lines.
#[derive(Debug, Clone)]
pub struct SectionedAggregation {
    headers: bool,
}

impl Default for SectionedAggregation {
    fn default() -> Self {
        Self { headers: true }
    }
}

impl SectionedAggregation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_headers() -> Self {
        Self { headers: false }
    }

    pub fn render(&self, outcomes: &[SubTaskOutcome]) -> String {
        if self.headers {
            outcomes
                .iter()
                .map(|o| {
                    let body = o
                        .effective_output()
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .unwrap_or("[no output]");
                    format!("## Sub-task {}\n\n{}", o.id(), body)
                })
                .collect::<Vec<_>>()
                .join("\n\n")
        } else {
            outcomes
                .iter()
                .filter_map(|o| o.effective_output())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n")
        }
    }
}

#[async_trait]
impl AggregationStrategy for SectionedAggregation {
    fn name(&self) -> &'static str {
        "sectioned"
    }

    async fn aggregate(&self, _request: &Request, outcomes: &[SubTaskOutcome]) -> String {
        self.render(outcomes)
    }
}

/// Moderator model synthesising one answer from all sub-task outputs
///
/// Falls back to [`SectionedAggregation`] when there is nothing to
/// synthesise or the moderator call fails.
pub struct ModeratorAggregation {
    moderator: ModelCall,
    fallback: SectionedAggregation,
}

impl ModeratorAggregation {
    pub fn new(moderator: ModelCall) -> Self {
        Self {
            moderator,
            fallback: SectionedAggregation::default(),
        }
    }
}

#[async_trait]
impl AggregationStrategy for ModeratorAggregation {
    fn name(&self) -> &'static str {
        "moderator"
    }

    async fn aggregate(&self, request: &Request, outcomes: &[SubTaskOutcome]) -> String {
        let sections: Vec<(String, String)> = outcomes
            .iter()
            .filter_map(|o| {
                o.effective_output()
                    .map(|out| (o.id().to_string(), out.trim().to_string()))
            })
            .collect();
        if sections.is_empty() {
            return self.fallback.render(outcomes);
        }

        let prompt = PromptTemplate::synthesis_prompt(request.content(), &sections);
        match self.moderator.send(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!("Moderator returned empty synthesis, using sectioned output");
                self.fallback.render(outcomes)
            }
            Err(e) => {
                warn!("Moderator synthesis failed ({}), using sectioned output", e);
                self.fallback.render(outcomes)
            }
        }
    }
}
