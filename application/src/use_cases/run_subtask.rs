//! Run SubTask use case
//!
//! Drives one sub-task from PENDING to a terminal state:
//!
//! ```text
//! assign ─▶ invoke ─▶ judge ─┬─ clears threshold ──▶ ACCEPTED
//!   ▲                        └─ otherwise ─┐
//!   └──── budget left (escalate) ◀─────────┴─ budget spent ──▶ EXHAUSTED
//! ```
//!
//! A failed backend call is recorded as an unjudged attempt and consumes
//! budget like any other. Consecutive attempts never repeat the same
//! (model, parameters) pair.

use super::shared::{Cancelled, check_cancelled, run_cancellable};
use crate::config::ExecutionParams;
use crate::ports::assignment::AssignmentStrategy;
use crate::ports::backend_provider::ProviderSet;
use crate::ports::judgment::JudgmentStrategy;
use crate::ports::progress::OrchestrationProgress;
use crate::ports::run_logger::{RunEvent, RunLogger};
use crate::strategies::SimilarityJudgment;
use sage_domain::{
    Attempt, EligibleModels, EvaluationResult, ExecutionResult, ModelAssignment, ModelName,
    ModelParameters, OrchestrationConfig, OutcomeError, PromptTemplate, SubTaskId, SubTaskOutcome,
    SubTaskSpec, escalate,
};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur while running a sub-task
#[derive(Error, Debug)]
pub enum RunSubTaskError {
    /// Nothing to run on; `spec` is handed back untouched.
    #[error("No eligible models for sub-task {}", spec.id)]
    NoEligibleModels { spec: Box<SubTaskSpec> },

    #[error("Sub-task lifecycle violation: {0}")]
    Lifecycle(#[from] OutcomeError),

    /// The run was cancelled; `partial` holds every fully recorded attempt.
    #[error("Operation cancelled")]
    Cancelled { partial: Box<SubTaskOutcome> },
}

/// Input for the RunSubTask use case
#[derive(Debug, Clone)]
pub struct RunSubTaskInput<'a> {
    pub spec: SubTaskSpec,
    /// Outputs of the declared dependencies, already formatted
    pub dependency_context: Option<String>,
    pub eligible: &'a EligibleModels,
    pub max_attempts: usize,
    pub acceptance_threshold: f64,
}

/// Use case for running a single sub-task to a terminal state
#[derive(Clone)]
pub struct RunSubTaskUseCase {
    providers: Arc<ProviderSet>,
    assignment: Arc<dyn AssignmentStrategy>,
    judgment: Arc<dyn JudgmentStrategy>,
    config: Arc<OrchestrationConfig>,
    params: ExecutionParams,
    cancellation_token: Option<CancellationToken>,
}

impl RunSubTaskUseCase {
    pub fn new(
        providers: Arc<ProviderSet>,
        assignment: Arc<dyn AssignmentStrategy>,
        judgment: Arc<dyn JudgmentStrategy>,
        config: Arc<OrchestrationConfig>,
    ) -> Self {
        Self {
            providers,
            assignment,
            judgment,
            config,
            params: ExecutionParams::default(),
            cancellation_token: None,
        }
    }

    pub fn with_execution_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Run the sub-task until an attempt is accepted or the budget is spent.
    pub async fn run(
        &self,
        input: RunSubTaskInput<'_>,
        progress: &dyn OrchestrationProgress,
        logger: &dyn RunLogger,
    ) -> Result<SubTaskOutcome, RunSubTaskError> {
        let RunSubTaskInput {
            spec,
            dependency_context,
            eligible,
            max_attempts,
            acceptance_threshold,
        } = input;

        if eligible.is_empty() {
            return Err(RunSubTaskError::NoEligibleModels {
                spec: Box::new(spec),
            });
        }

        let prompt = PromptTemplate::subtask_prompt(&spec, dependency_context.as_deref());
        let goal = spec.goal().to_string();
        let mut outcome = SubTaskOutcome::new(spec);
        outcome.start()?;

        let mut tried: Vec<ModelName> = Vec::new();
        let mut previous: Option<ModelAssignment> = None;

        for attempt_index in 0..max_attempts.max(1) {
            if check_cancelled(&self.cancellation_token).is_err() {
                return Err(cancelled(outcome));
            }

            let selection = run_cancellable(
                &self.cancellation_token,
                self.choose_model(outcome.spec(), eligible, &tried),
            )
            .await;
            let model = match selection {
                Ok(Some(model)) => model,
                Ok(None) => {
                    return Err(RunSubTaskError::NoEligibleModels {
                        spec: Box::new(outcome.spec().clone()),
                    });
                }
                Err(Cancelled) => return Err(cancelled(outcome)),
            };
            let provider_kind = eligible
                .get(&model)
                .map(|m| m.provider)
                .unwrap_or_else(|| self.config.provider_of(&model));

            let parameters = self.parameters_for(&model, previous.as_ref(), attempt_index);
            let assignment = ModelAssignment::new(model, provider_kind, parameters, attempt_index);
            debug!(
                "Sub-task {} attempt {}: {}",
                outcome.id(),
                attempt_index + 1,
                assignment
            );

            let started = Instant::now();
            let call = self.providers.invoke(
                provider_kind,
                &assignment.model_name,
                &prompt,
                &assignment.parameters,
                self.params.call_timeout,
            );
            let result = match run_cancellable(&self.cancellation_token, call).await {
                Ok(result) => result,
                Err(Cancelled) => return Err(cancelled(outcome)),
            };
            let elapsed_ms = started.elapsed().as_millis() as u64;

            let attempt = match result {
                Ok(output) => {
                    let evaluation = match run_cancellable(
                        &self.cancellation_token,
                        self.judge(&goal, &output, acceptance_threshold),
                    )
                    .await
                    {
                        Ok(evaluation) => evaluation,
                        Err(Cancelled) => return Err(cancelled(outcome)),
                    };
                    Attempt::judged(
                        ExecutionResult::success(
                            outcome.id().clone(),
                            assignment.clone(),
                            output,
                            elapsed_ms,
                        ),
                        evaluation,
                    )
                }
                Err(e) => {
                    warn!(
                        "Sub-task {} attempt {} failed on {}: {}",
                        outcome.id(),
                        attempt_index + 1,
                        assignment.model_name,
                        e
                    );
                    Attempt::failed(ExecutionResult::failure(
                        outcome.id().clone(),
                        assignment.clone(),
                        e.to_string(),
                        elapsed_ms,
                    ))
                }
            };

            let clears = attempt
                .evaluation
                .as_ref()
                .is_some_and(|e| e.clears(acceptance_threshold));
            let index = outcome.record_attempt(attempt)?;
            let recorded = &outcome.attempts()[index];
            progress.on_attempt(outcome.spec(), recorded);
            logger.log(attempt_event(outcome.id(), recorded));

            tried.push(assignment.model_name.clone());
            previous = Some(assignment);

            if clears {
                outcome.accept(index, acceptance_threshold)?;
                info!(
                    "Sub-task {} accepted on attempt {} ({:.2})",
                    outcome.id(),
                    index + 1,
                    outcome.effective_confidence().unwrap_or_default()
                );
                return Ok(outcome);
            }
        }

        outcome.exhaust()?;
        info!(
            "Sub-task {} exhausted after {} attempts",
            outcome.id(),
            outcome.attempts().len()
        );
        Ok(outcome)
    }

    /// Judge within `judge_timeout`; an overrun is scored by similarity.
    async fn judge(&self, goal: &str, output: &str, threshold: f64) -> EvaluationResult {
        let Some(limit) = self.params.judge_timeout else {
            return self.judgment.judge(goal, output).await;
        };
        match tokio::time::timeout(limit, self.judgment.judge(goal, output)).await {
            Ok(evaluation) => evaluation,
            Err(_) => {
                warn!(
                    "Judgment '{}' timed out after {:?}; using similarity",
                    self.judgment.name(),
                    limit
                );
                SimilarityJudgment::new(threshold).evaluate(goal, output)
            }
        }
    }

    /// Ask the assignment strategy for a model, falling back when it fails
    /// or picks outside the eligible set.
    async fn choose_model(
        &self,
        spec: &SubTaskSpec,
        eligible: &EligibleModels,
        tried: &[ModelName],
    ) -> Option<ModelName> {
        match self.assignment.select(spec, eligible, tried).await {
            Ok(model) if eligible.contains(&model) => Some(model),
            Ok(model) => {
                warn!(
                    "Assignment strategy '{}' picked ineligible model {} for sub-task {}",
                    self.assignment.name(),
                    model,
                    spec.id
                );
                self.fallback_model(eligible, tried)
            }
            Err(e) => {
                warn!(
                    "Assignment strategy '{}' failed for sub-task {}: {}",
                    self.assignment.name(),
                    spec.id,
                    e
                );
                self.fallback_model(eligible, tried)
            }
        }
    }

    /// Default model, else the first eligible one, skipping models already
    /// tried. Once every eligible model has been tried the default (or the
    /// first eligible) is reused.
    fn fallback_model(
        &self,
        eligible: &EligibleModels,
        tried: &[ModelName],
    ) -> Option<ModelName> {
        let default = &self.config.default_model;

        if eligible.contains(default) && !tried.contains(default) {
            return Some(default.clone());
        }
        if let Some(model) = eligible
            .iter()
            .map(|m| &m.name)
            .find(|name| !tried.contains(*name))
        {
            return Some(model.clone());
        }
        if eligible.contains(default) {
            return Some(default.clone());
        }
        eligible.first().map(|m| m.name.clone())
    }

    /// Configured defaults on the first attempt; escalated afterwards, from
    /// the previous parameters when the model is reused.
    fn parameters_for(
        &self,
        model: &ModelName,
        previous: Option<&ModelAssignment>,
        attempt_index: usize,
    ) -> ModelParameters {
        match previous {
            None => self.config.parameters_for(model),
            Some(prev) if &prev.model_name == model => {
                escalate(&prev.parameters, attempt_index, &self.config.bounds)
            }
            Some(_) => escalate(
                &self.config.parameters_for(model),
                attempt_index,
                &self.config.bounds,
            ),
        }
    }
}

fn cancelled(outcome: SubTaskOutcome) -> RunSubTaskError {
    RunSubTaskError::Cancelled {
        partial: Box::new(outcome),
    }
}

fn attempt_event(sub_task: &SubTaskId, attempt: &Attempt) -> RunEvent {
    let evaluation = attempt.evaluation.as_ref();
    RunEvent::new(
        "attempt",
        serde_json::json!({
            "sub_task": sub_task.as_str(),
            "attempt": attempt.index(),
            "model": attempt.assignment().model_name.as_str(),
            "provider": attempt.assignment().provider_kind.as_str(),
            "parameters": &attempt.assignment().parameters,
            "succeeded_call": attempt.execution.succeeded_call,
            "error": attempt.execution.error_detail,
            "verdict": evaluation.map(|e| e.verdict),
            "confidence": evaluation.map(|e| e.confidence),
            "method": evaluation.map(|e| e.method),
            "elapsed_ms": attempt.execution.elapsed_ms,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::assignment::AssignmentError;
    use crate::ports::backend_provider::ProviderError;
    use crate::ports::progress::NoProgress;
    use crate::ports::run_logger::NoRunLogger;
    use crate::strategies::{ConfiguredAssignment, LlmJudgment, ModelCall, SimilarityJudgment};
    use crate::testing::{ScriptedJudgment, ScriptedProvider};
    use async_trait::async_trait;
    use sage_domain::{
        JudgmentMethod, ModelSpec, ProviderKind, ProviderSelection, SubTaskStatus, Verdict,
    };
    use std::time::Duration;

    struct FailingAssignment;

    #[async_trait]
    impl AssignmentStrategy for FailingAssignment {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn select(
            &self,
            _spec: &SubTaskSpec,
            _eligible: &EligibleModels,
            _excluded: &[ModelName],
        ) -> Result<ModelName, AssignmentError> {
            Err(AssignmentError::Unrecognized("no idea".to_string()))
        }
    }

    struct SlowJudgment;

    #[async_trait]
    impl JudgmentStrategy for SlowJudgment {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn judge(&self, _goal: &str, _output: &str) -> EvaluationResult {
            tokio::time::sleep(Duration::from_secs(5)).await;
            EvaluationResult::new(Verdict::Pass, 1.0, JudgmentMethod::JudgeModel)
        }
    }

    struct OffListAssignment;

    #[async_trait]
    impl AssignmentStrategy for OffListAssignment {
        fn name(&self) -> &'static str {
            "off-list"
        }

        async fn select(
            &self,
            _spec: &SubTaskSpec,
            _eligible: &EligibleModels,
            _excluded: &[ModelName],
        ) -> Result<ModelName, AssignmentError> {
            Ok(ModelName::from("not-configured"))
        }
    }

    fn single_model_config() -> Arc<OrchestrationConfig> {
        Arc::new(
            OrchestrationConfig::default()
                .with_available_models(vec![ModelSpec::new("gemma3:4b", ProviderKind::Local)]),
        )
    }

    fn use_case(
        provider: Arc<ScriptedProvider>,
        assignment: Arc<dyn AssignmentStrategy>,
        judgment: Arc<dyn JudgmentStrategy>,
        config: Arc<OrchestrationConfig>,
    ) -> RunSubTaskUseCase {
        let providers = Arc::new(ProviderSet::new().with_provider(provider));
        RunSubTaskUseCase::new(providers, assignment, judgment, config)
    }

    fn input<'a>(
        spec: SubTaskSpec,
        eligible: &'a EligibleModels,
        max_attempts: usize,
    ) -> RunSubTaskInput<'a> {
        RunSubTaskInput {
            spec,
            dependency_context: None,
            eligible,
            max_attempts,
            acceptance_threshold: 0.9,
        }
    }

    fn replies(texts: &[&str]) -> Vec<Result<String, ProviderError>> {
        texts.iter().map(|t| Ok(t.to_string())).collect()
    }

    #[tokio::test]
    async fn test_first_attempt_accepted() {
        let config = single_model_config();
        let eligible = config.eligible_models(ProviderSelection::All);
        let provider = Arc::new(ScriptedProvider::local(replies(&["Paris"])));
        let judgment = Arc::new(ScriptedJudgment::confidences(&[0.95]));
        let uc = use_case(
            provider.clone(),
            Arc::new(ConfiguredAssignment::new(config.clone())),
            judgment.clone(),
            config,
        );

        let outcome = uc
            .run(
                input(SubTaskSpec::new("1", "Capital of France?"), &eligible, 3),
                &NoProgress,
                &NoRunLogger,
            )
            .await
            .unwrap();

        assert_eq!(outcome.status(), SubTaskStatus::Accepted);
        assert_eq!(outcome.attempts().len(), 1);
        assert_eq!(outcome.effective_output(), Some("Paris"));
        assert_eq!(provider.calls().len(), 1);
        assert_eq!(
            judgment.seen(),
            vec![("Capital of France?".to_string(), "Paris".to_string())]
        );
    }

    #[tokio::test]
    async fn test_exhausted_keeps_highest_confidence_output() {
        let config = single_model_config();
        let eligible = config.eligible_models(ProviderSelection::All);
        let provider = Arc::new(ScriptedProvider::local(replies(&["a", "b", "c"])));
        let uc = use_case(
            provider,
            Arc::new(ConfiguredAssignment::new(config.clone())),
            Arc::new(ScriptedJudgment::confidences(&[0.4, 0.7, 0.6])),
            config,
        );

        let outcome = uc
            .run(input(SubTaskSpec::new("2", "q"), &eligible, 3), &NoProgress, &NoRunLogger)
            .await
            .unwrap();

        assert_eq!(outcome.status(), SubTaskStatus::Exhausted);
        assert_eq!(outcome.attempts().len(), 3);
        assert_eq!(outcome.best_attempt_index(), Some(1));
        assert_eq!(outcome.effective_output(), Some("b"));
        assert_eq!(outcome.effective_confidence(), Some(0.7));
    }

    #[tokio::test]
    async fn test_failed_call_is_recorded_and_retried() {
        let config = single_model_config();
        let eligible = config.eligible_models(ProviderSelection::All);
        let provider = Arc::new(ScriptedProvider::local(vec![
            Err(ProviderError::Connection("refused".to_string())),
            Ok("answer".to_string()),
        ]));
        let judgment = Arc::new(ScriptedJudgment::confidences(&[0.92]));
        let uc = use_case(
            provider,
            Arc::new(ConfiguredAssignment::new(config.clone())),
            judgment.clone(),
            config,
        );

        let outcome = uc
            .run(input(SubTaskSpec::new("1", "q"), &eligible, 3), &NoProgress, &NoRunLogger)
            .await
            .unwrap();

        assert!(outcome.is_accepted());
        let first = &outcome.attempts()[0];
        assert!(!first.execution.succeeded_call);
        assert!(first.evaluation.is_none());
        assert!(first.execution.error_detail.as_deref().unwrap().contains("refused"));
        assert_eq!(outcome.accepted_attempt_index(), Some(1));
        // failed calls are never judged
        assert_eq!(judgment.seen().len(), 1);
    }

    #[tokio::test]
    async fn test_all_calls_fail_exhausts_without_output() {
        let config = single_model_config();
        let eligible = config.eligible_models(ProviderSelection::All);
        let provider = Arc::new(ScriptedProvider::local(vec![]));
        let uc = use_case(
            provider,
            Arc::new(ConfiguredAssignment::new(config.clone())),
            Arc::new(ScriptedJudgment::confidences(&[])),
            config,
        );

        let outcome = uc
            .run(input(SubTaskSpec::new("1", "q"), &eligible, 2), &NoProgress, &NoRunLogger)
            .await
            .unwrap();

        assert_eq!(outcome.status(), SubTaskStatus::Exhausted);
        assert_eq!(outcome.attempts().len(), 2);
        assert!(outcome.effective_output().is_none());
        assert!(outcome.failure_reason().is_some());
    }

    #[tokio::test]
    async fn test_consecutive_calls_never_repeat() {
        let config = Arc::new(
            OrchestrationConfig::default()
                .with_available_models(vec![ModelSpec::new("gemma3:4b", ProviderKind::Local)])
                .with_model_parameters(
                    "gemma3:4b",
                    ModelParameters::default()
                        .with_temperature(0.9)
                        .with_max_tokens(8000),
                ),
        );
        let eligible = config.eligible_models(ProviderSelection::All);
        let provider = Arc::new(ScriptedProvider::local(replies(&["a", "b", "c", "d", "e"])));
        let uc = use_case(
            provider.clone(),
            Arc::new(ConfiguredAssignment::new(config.clone())),
            Arc::new(ScriptedJudgment::confidences(&[0.1, 0.1, 0.1, 0.1, 0.1])),
            config,
        );

        let outcome = uc
            .run(input(SubTaskSpec::new("1", "q"), &eligible, 5), &NoProgress, &NoRunLogger)
            .await
            .unwrap();

        assert_eq!(outcome.attempts().len(), 5);
        for pair in outcome.attempts().windows(2) {
            assert!(!pair[0].assignment().same_call_as(pair[1].assignment()));
        }
        let calls = provider.calls();
        assert_eq!(calls[0].parameters.temperature, Some(0.9));
        assert_eq!(calls[1].parameters.temperature, Some(1.0));
        assert_eq!(calls[1].parameters.max_tokens, Some(8192));
    }

    #[tokio::test]
    async fn test_retry_rotates_to_untried_model() {
        let config = Arc::new(OrchestrationConfig::default().with_available_models(vec![
            ModelSpec::new("gemma3:4b", ProviderKind::Local),
            ModelSpec::new("qwen3:1.7b", ProviderKind::Local),
        ]));
        let eligible = config.eligible_models(ProviderSelection::All);
        let provider = Arc::new(ScriptedProvider::local(replies(&["a", "b"])));
        let uc = use_case(
            provider.clone(),
            Arc::new(ConfiguredAssignment::new(config.clone())),
            Arc::new(ScriptedJudgment::confidences(&[0.2, 0.95])),
            config,
        );

        let outcome = uc
            .run(input(SubTaskSpec::new("1", "q"), &eligible, 3), &NoProgress, &NoRunLogger)
            .await
            .unwrap();

        assert!(outcome.is_accepted());
        let models: Vec<_> = provider.calls().into_iter().map(|c| c.model).collect();
        assert_eq!(
            models,
            vec![ModelName::from("gemma3:4b"), ModelName::from("qwen3:1.7b")]
        );
    }

    #[tokio::test]
    async fn test_assignment_failure_falls_back_to_default_model() {
        let config = Arc::new(
            OrchestrationConfig::default()
                .with_default_model("qwen3:1.7b")
                .with_available_models(vec![
                    ModelSpec::new("gemma3:4b", ProviderKind::Local),
                    ModelSpec::new("qwen3:1.7b", ProviderKind::Local),
                ]),
        );
        let eligible = config.eligible_models(ProviderSelection::All);
        let provider = Arc::new(ScriptedProvider::local(replies(&["ok", "ok"])));
        let uc = use_case(
            provider.clone(),
            Arc::new(FailingAssignment),
            Arc::new(ScriptedJudgment::confidences(&[0.95])),
            config.clone(),
        );

        let outcome = uc
            .run(input(SubTaskSpec::new("1", "q"), &eligible, 2), &NoProgress, &NoRunLogger)
            .await
            .unwrap();
        assert!(outcome.is_accepted());
        assert_eq!(provider.calls()[0].model.as_str(), "qwen3:1.7b");

        let uc = use_case(
            provider.clone(),
            Arc::new(OffListAssignment),
            Arc::new(ScriptedJudgment::confidences(&[0.95])),
            config,
        );
        uc.run(input(SubTaskSpec::new("2", "q"), &eligible, 1), &NoProgress, &NoRunLogger)
            .await
            .unwrap();
        assert_eq!(provider.calls()[1].model.as_str(), "qwen3:1.7b");
    }

    #[tokio::test]
    async fn test_fallback_uses_first_eligible_when_default_excluded() {
        let config = Arc::new(OrchestrationConfig::default().with_available_models(vec![
            ModelSpec::new("gemma3:4b", ProviderKind::Local),
            ModelSpec::new("gpt-4o-mini", ProviderKind::Cloud),
        ]));
        let eligible = config.eligible_models(ProviderSelection::Cloud);
        let provider = Arc::new(ScriptedProvider::new(ProviderKind::Cloud, replies(&["ok"])));
        let uc = use_case(
            provider.clone(),
            Arc::new(FailingAssignment),
            Arc::new(ScriptedJudgment::confidences(&[0.95])),
            config,
        );

        let outcome = uc
            .run(input(SubTaskSpec::new("1", "q"), &eligible, 1), &NoProgress, &NoRunLogger)
            .await
            .unwrap();
        assert!(outcome.is_accepted());
        assert_eq!(provider.calls()[0].model.as_str(), "gpt-4o-mini");
        assert_eq!(
            outcome.attempts()[0].assignment().provider_kind,
            ProviderKind::Cloud
        );
    }

    #[tokio::test]
    async fn test_failing_assignment_rotates_before_reusing_default() {
        let config = Arc::new(OrchestrationConfig::default().with_available_models(vec![
            ModelSpec::new("gemma3:4b", ProviderKind::Local),
            ModelSpec::new("qwen3:1.7b", ProviderKind::Local),
        ]));
        let eligible = config.eligible_models(ProviderSelection::All);
        let provider = Arc::new(ScriptedProvider::local(replies(&["a", "b", "c"])));
        let uc = use_case(
            provider.clone(),
            Arc::new(FailingAssignment),
            Arc::new(ScriptedJudgment::confidences(&[0.1, 0.1, 0.1])),
            config,
        );

        let outcome = uc
            .run(input(SubTaskSpec::new("1", "q"), &eligible, 3), &NoProgress, &NoRunLogger)
            .await
            .unwrap();

        assert_eq!(outcome.status(), SubTaskStatus::Exhausted);
        let models: Vec<_> = provider
            .calls()
            .iter()
            .map(|c| c.model.as_str().to_string())
            .collect();
        assert_eq!(models, vec!["gemma3:4b", "qwen3:1.7b", "gemma3:4b"]);
        let first = outcome.attempts()[0].assignment();
        let last = outcome.attempts()[2].assignment();
        assert_eq!(last.attempt_index, 2);
        assert_ne!(first.parameters, last.parameters);
    }

    #[tokio::test]
    async fn test_slow_judgment_falls_back_to_similarity() {
        let config = single_model_config();
        let eligible = config.eligible_models(ProviderSelection::All);
        let provider = Arc::new(ScriptedProvider::local(replies(&["capital of france is paris"])));
        let uc = use_case(
            provider,
            Arc::new(ConfiguredAssignment::new(config.clone())),
            Arc::new(SlowJudgment),
            config,
        )
        .with_execution_params(
            ExecutionParams::default().with_judge_timeout(Some(Duration::from_millis(20))),
        );

        let outcome = uc
            .run(
                input(SubTaskSpec::new("1", "capital of france"), &eligible, 1),
                &NoProgress,
                &NoRunLogger,
            )
            .await
            .unwrap();

        let evaluation = outcome.attempts()[0].evaluation.as_ref().unwrap();
        assert_eq!(evaluation.method, JudgmentMethod::SimilarityFallback);
    }

    #[tokio::test]
    async fn test_dependency_context_reaches_prompt() {
        let config = single_model_config();
        let eligible = config.eligible_models(ProviderSelection::All);
        let provider = Arc::new(ScriptedProvider::local(replies(&["done"])));
        let uc = use_case(
            provider.clone(),
            Arc::new(ConfiguredAssignment::new(config.clone())),
            Arc::new(ScriptedJudgment::confidences(&[0.95])),
            config,
        );

        let mut run_input = input(SubTaskSpec::new("2", "Summarize"), &eligible, 1);
        run_input.dependency_context = Some("### Output of sub-task 1\nfacts".to_string());
        uc.run(run_input, &NoProgress, &NoRunLogger).await.unwrap();

        let prompt = &provider.calls()[0].prompt;
        assert!(prompt.contains("### Output of sub-task 1\nfacts"));
        assert!(prompt.ends_with("Summarize"));
    }

    #[tokio::test]
    async fn test_timeout_records_failed_attempt() {
        let config = single_model_config();
        let eligible = config.eligible_models(ProviderSelection::All);
        let provider = Arc::new(
            ScriptedProvider::local(replies(&["late"])).with_delay(Duration::from_secs(5)),
        );
        let uc = use_case(
            provider,
            Arc::new(ConfiguredAssignment::new(config.clone())),
            Arc::new(ScriptedJudgment::confidences(&[])),
            config,
        )
        .with_execution_params(
            ExecutionParams::default().with_call_timeout(Some(Duration::from_millis(20))),
        );

        let outcome = uc
            .run(input(SubTaskSpec::new("1", "q"), &eligible, 1), &NoProgress, &NoRunLogger)
            .await
            .unwrap();

        assert_eq!(outcome.status(), SubTaskStatus::Exhausted);
        let detail = outcome.attempts()[0].execution.error_detail.clone().unwrap();
        assert!(detail.contains("Timed out"));
    }

    #[tokio::test]
    async fn test_judge_fallback_can_accept() {
        let config = single_model_config();
        let eligible = config.eligible_models(ProviderSelection::All);
        // sub-task call succeeds, evaluator call fails
        let provider = Arc::new(ScriptedProvider::local(vec![
            Ok("Describe the water cycle".to_string()),
            Err(ProviderError::Connection("evaluator down".to_string())),
        ]));
        let providers = Arc::new(ProviderSet::new().with_provider(provider));
        let evaluator = ModelCall::from_config(providers.clone(), &config, config.evaluator());
        let judgment = Arc::new(LlmJudgment::new(evaluator, SimilarityJudgment::new(0.9)));
        let uc = RunSubTaskUseCase::new(
            providers,
            Arc::new(ConfiguredAssignment::new(config.clone())),
            judgment,
            config,
        );

        let outcome = uc
            .run(
                input(SubTaskSpec::new("1", "Describe the water cycle"), &eligible, 1),
                &NoProgress,
                &NoRunLogger,
            )
            .await
            .unwrap();

        assert!(outcome.is_accepted());
        let evaluation = outcome.attempts()[0].evaluation.as_ref().unwrap();
        assert_eq!(evaluation.method, JudgmentMethod::SimilarityFallback);
    }

    #[tokio::test]
    async fn test_no_eligible_models() {
        let config = single_model_config();
        let eligible = EligibleModels::default();
        let uc = use_case(
            Arc::new(ScriptedProvider::local(vec![])),
            Arc::new(ConfiguredAssignment::new(config.clone())),
            Arc::new(ScriptedJudgment::confidences(&[])),
            config,
        );

        let result = uc
            .run(input(SubTaskSpec::new("1", "q"), &eligible, 1), &NoProgress, &NoRunLogger)
            .await;
        match result {
            Err(RunSubTaskError::NoEligibleModels { spec }) => assert_eq!(spec.id.as_str(), "1"),
            other => panic!("expected no eligible models, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancel_during_call_drops_in_flight_attempt() {
        let config = single_model_config();
        let eligible = config.eligible_models(ProviderSelection::All);
        let provider = Arc::new(
            ScriptedProvider::local(replies(&["slow"])).with_delay(Duration::from_secs(5)),
        );
        let token = CancellationToken::new();
        let uc = use_case(
            provider,
            Arc::new(ConfiguredAssignment::new(config.clone())),
            Arc::new(ScriptedJudgment::confidences(&[])),
            config,
        )
        .with_cancellation(token.clone());

        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = uc
            .run(input(SubTaskSpec::new("1", "q"), &eligible, 3), &NoProgress, &NoRunLogger)
            .await;
        match result {
            Err(RunSubTaskError::Cancelled { partial }) => {
                assert_eq!(partial.status(), SubTaskStatus::InProgress);
                assert!(partial.attempts().is_empty());
            }
            other => panic!("expected cancellation, got {other:?}"),
        }
    }
}
