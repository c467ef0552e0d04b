//! Scripted test doubles shared by strategy and use case tests.

use crate::ports::backend_provider::{BackendProvider, ProviderError};
use crate::ports::decomposition::{DecompositionError, DecompositionStrategy};
use crate::ports::judgment::JudgmentStrategy;
use async_trait::async_trait;
use sage_domain::{
    EvaluationResult, JudgmentMethod, ModelName, ModelParameters, ProviderKind, Request,
    SubTaskSpec, Verdict,
};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// One recorded backend call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: ModelName,
    pub prompt: String,
    pub parameters: ModelParameters,
}

/// Provider that replays scripted replies in order
pub struct ScriptedProvider {
    kind: ProviderKind,
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    models: Vec<ModelName>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new(kind: ProviderKind, replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            kind,
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
            models: Vec::new(),
            delay: None,
        }
    }

    pub fn local(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self::new(ProviderKind::Local, replies)
    }

    pub fn with_models(mut self, models: &[&str]) -> Self {
        self.models = models.iter().map(|m| ModelName::from(*m)).collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackendProvider for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn invoke(
        &self,
        model: &ModelName,
        prompt: &str,
        parameters: &ModelParameters,
    ) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: model.clone(),
            prompt: prompt.to_string(),
            parameters: parameters.clone(),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Other("script exhausted".to_string())))
    }

    async fn available_models(&self) -> Result<Vec<ModelName>, ProviderError> {
        Ok(self.models.clone())
    }
}

/// Judge that replays scripted (verdict, confidence) pairs
pub struct ScriptedJudgment {
    results: Mutex<VecDeque<EvaluationResult>>,
    seen: Mutex<Vec<(String, String)>>,
}

impl ScriptedJudgment {
    pub fn new(results: Vec<(Verdict, f64)>) -> Self {
        Self {
            results: Mutex::new(
                results
                    .into_iter()
                    .map(|(v, c)| EvaluationResult::new(v, c, JudgmentMethod::JudgeModel))
                    .collect(),
            ),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Confidences only; pass iff `>= 0.9`
    pub fn confidences(values: &[f64]) -> Self {
        Self::new(
            values
                .iter()
                .map(|&c| (if c >= 0.9 { Verdict::Pass } else { Verdict::Fail }, c))
                .collect(),
        )
    }

    /// (goal, output) pairs judged so far
    pub fn seen(&self) -> Vec<(String, String)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl JudgmentStrategy for ScriptedJudgment {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn judge(&self, goal: &str, output: &str) -> EvaluationResult {
        self.seen
            .lock()
            .unwrap()
            .push((goal.to_string(), output.to_string()));
        self.results.lock().unwrap().pop_front().unwrap_or_else(|| {
            EvaluationResult::new(Verdict::Fail, 0.0, JudgmentMethod::JudgeModel)
        })
    }
}

/// Decomposition returning a fixed list
pub struct FixedDecomposition(pub Vec<SubTaskSpec>);

#[async_trait]
impl DecompositionStrategy for FixedDecomposition {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn decompose(
        &self,
        _request: &Request,
        _context: Option<&str>,
    ) -> Result<Vec<SubTaskSpec>, DecompositionError> {
        Ok(self.0.clone())
    }
}
