//! Process Request use case
//!
//! The orchestration engine: decompose a request, run every sub-task in
//! decomposition order through [`RunSubTaskUseCase`], thread each effective
//! output into the dependants that declare it, and aggregate the results.
//!
//! Sub-tasks run strictly one at a time. A sub-task whose dependencies cannot
//! be resolved is marked EXHAUSTED without any attempt and the run moves on.

use super::run_subtask::{RunSubTaskError, RunSubTaskInput, RunSubTaskUseCase};
use super::shared::{Cancelled, check_cancelled, run_cancellable};
use crate::config::ExecutionParams;
use crate::ports::aggregation::AggregationStrategy;
use crate::ports::assignment::AssignmentStrategy;
use crate::ports::backend_provider::ProviderSet;
use crate::ports::decomposition::{DecompositionError, DecompositionStrategy};
use crate::ports::judgment::JudgmentStrategy;
use crate::ports::progress::{NoProgress, OrchestrationProgress};
use crate::ports::run_logger::{NoRunLogger, RunEvent, RunLogger};
use sage_domain::{
    AggregatedResponse, EligibleModels, OrchestrationConfig, OutcomeError, ProviderSelection,
    Request, RunningContext, SubTaskOutcome, validate_specs,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that end a run without a response
#[derive(Error, Debug)]
pub enum ProcessRequestError {
    #[error("Decomposition failed: {0}")]
    Decomposition(#[from] DecompositionError),

    #[error("Sub-task lifecycle violation: {0}")]
    Lifecycle(#[from] OutcomeError),

    /// The run was cancelled; `partial` holds the outcomes reached so far,
    /// including the interrupted sub-task.
    #[error("Operation cancelled after {} sub-task(s)", partial.len())]
    Cancelled { partial: Vec<SubTaskOutcome> },
}

impl ProcessRequestError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ProcessRequestError::Cancelled { .. })
    }

    pub fn is_decomposition_failure(&self) -> bool {
        matches!(self, ProcessRequestError::Decomposition(_))
    }
}

/// Input for the ProcessRequest use case
#[derive(Debug, Clone)]
pub struct ProcessRequestInput {
    pub request: Request,
    /// Optional extra context handed to the decomposition strategy
    pub context: Option<String>,
    pub selection: ProviderSelection,
}

impl ProcessRequestInput {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            context: None,
            selection: ProviderSelection::default(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_selection(mut self, selection: ProviderSelection) -> Self {
        self.selection = selection;
        self
    }
}

/// Use case for processing one request end to end
pub struct ProcessRequestUseCase {
    providers: Arc<ProviderSet>,
    decomposition: Arc<dyn DecompositionStrategy>,
    aggregation: Arc<dyn AggregationStrategy>,
    config: Arc<OrchestrationConfig>,
    runner: RunSubTaskUseCase,
    params: ExecutionParams,
    run_logger: Arc<dyn RunLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl ProcessRequestUseCase {
    pub fn new(
        providers: Arc<ProviderSet>,
        decomposition: Arc<dyn DecompositionStrategy>,
        assignment: Arc<dyn AssignmentStrategy>,
        judgment: Arc<dyn JudgmentStrategy>,
        aggregation: Arc<dyn AggregationStrategy>,
        config: Arc<OrchestrationConfig>,
    ) -> Self {
        let runner =
            RunSubTaskUseCase::new(providers.clone(), assignment, judgment, config.clone());
        Self {
            providers,
            decomposition,
            aggregation,
            config,
            runner,
            params: ExecutionParams::default(),
            run_logger: Arc::new(NoRunLogger),
            cancellation_token: None,
        }
    }

    pub fn with_execution_params(mut self, params: ExecutionParams) -> Self {
        self.runner = self.runner.with_execution_params(params.clone());
        self.params = params;
        self
    }

    pub fn with_run_logger(mut self, logger: Arc<dyn RunLogger>) -> Self {
        self.run_logger = logger;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.runner = self.runner.with_cancellation(token.clone());
        self.cancellation_token = Some(token);
        self
    }

    pub fn config(&self) -> &OrchestrationConfig {
        &self.config
    }

    /// Process the request with default (no-op) progress
    pub async fn process(
        &self,
        input: ProcessRequestInput,
    ) -> Result<AggregatedResponse, ProcessRequestError> {
        self.process_with_progress(input, &NoProgress).await
    }

    /// Process the request with progress callbacks
    pub async fn process_with_progress(
        &self,
        input: ProcessRequestInput,
        progress: &dyn OrchestrationProgress,
    ) -> Result<AggregatedResponse, ProcessRequestError> {
        let started = Instant::now();
        let ProcessRequestInput {
            request,
            context,
            selection,
        } = input;

        self.run_logger.log(RunEvent::new(
            "run_started",
            json!({
                "request": request.content(),
                "selection": selection.as_str(),
                "decomposition": self.decomposition.name(),
                "aggregation": self.aggregation.name(),
                "max_attempts": self.config.max_attempts,
                "acceptance_threshold": self.config.acceptance_threshold,
            }),
        ));

        if check_cancelled(&self.cancellation_token).is_err() {
            return Err(self.cancelled(Vec::new()));
        }

        // Phase 1: Decomposition
        let decomposed = run_cancellable(
            &self.cancellation_token,
            self.decomposition.decompose(&request, context.as_deref()),
        )
        .await;
        let specs = match decomposed {
            Ok(result) => result?,
            Err(Cancelled) => return Err(self.cancelled(Vec::new())),
        };
        validate_specs(&specs).map_err(DecompositionError::from)?;

        info!(
            "Decomposed with '{}' into {} sub-task(s)",
            self.decomposition.name(),
            specs.len()
        );
        progress.on_decomposed(&specs);
        self.run_logger.log(RunEvent::new(
            "decomposed",
            json!({
                "strategy": self.decomposition.name(),
                "sub_tasks": &specs,
            }),
        ));

        let eligible = self.eligible_models(selection).await;
        let no_models = format!("no eligible models for selection '{}'", selection);
        if eligible.is_empty() {
            warn!("{}; every sub-task will be closed without attempts", no_models);
        } else {
            info!(
                "Processing request with {} eligible model(s) ({})",
                eligible.len(),
                selection
            );
        }

        // Phase 2: Sequential sub-task execution
        let total = specs.len();
        let mut running = RunningContext::new(&specs);
        let mut outcomes = Vec::with_capacity(total);

        for (position, spec) in specs.into_iter().enumerate() {
            if check_cancelled(&self.cancellation_token).is_err() {
                return Err(self.cancelled(outcomes));
            }
            progress.on_subtask_start(&spec, position, total);

            let outcome = match running.resolve(&spec) {
                _ if eligible.is_empty() => SubTaskOutcome::not_run(spec, no_models.clone()),
                Err(e) => {
                    warn!("Skipping sub-task {}: {}", spec.id, e);
                    SubTaskOutcome::dependency_failed(spec, e.to_string())
                }
                Ok(dependency_context) => {
                    let run = self
                        .runner
                        .run(
                            RunSubTaskInput {
                                spec,
                                dependency_context,
                                eligible: &eligible,
                                max_attempts: self.config.max_attempts,
                                acceptance_threshold: self.config.acceptance_threshold,
                            },
                            progress,
                            self.run_logger.as_ref(),
                        )
                        .await;
                    match run {
                        Ok(outcome) => outcome,
                        Err(RunSubTaskError::Cancelled { partial }) => {
                            outcomes.push(*partial);
                            return Err(self.cancelled(outcomes));
                        }
                        Err(RunSubTaskError::NoEligibleModels { spec }) => {
                            warn!("Skipping sub-task {}: {}", spec.id, no_models);
                            SubTaskOutcome::not_run(*spec, no_models.clone())
                        }
                        Err(RunSubTaskError::Lifecycle(e)) => return Err(e.into()),
                    }
                }
            };

            progress.on_subtask_complete(&outcome);
            self.run_logger.log(RunEvent::new(
                "sub_task_completed",
                json!({
                    "sub_task": outcome.id().as_str(),
                    "status": outcome.status(),
                    "attempts": outcome.attempts().len(),
                    "accepted_attempt": outcome.accepted_attempt_index(),
                    "best_attempt": outcome.best_attempt_index(),
                    "confidence": outcome.effective_confidence(),
                    "failure_reason": outcome.failure_reason(),
                }),
            ));
            running.fold(&outcome);
            outcomes.push(outcome);
        }

        // Phase 3: Aggregation
        progress.on_aggregating();
        let aggregated = run_cancellable(
            &self.cancellation_token,
            self.aggregation.aggregate(&request, &outcomes),
        )
        .await;
        let final_text = match aggregated {
            Ok(text) => text,
            Err(Cancelled) => return Err(self.cancelled(outcomes)),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let response = AggregatedResponse::new(request, final_text, outcomes, elapsed_ms);
        info!(
            "Run finished: {}/{} sub-task(s) accepted, {} attempt(s), {} ms",
            response.summary.num_accepted,
            response.summary.num_sub_tasks,
            response.summary.total_attempts,
            elapsed_ms
        );
        self.run_logger.log(RunEvent::new(
            "run_completed",
            json!({
                "summary": &response.summary,
                "final_text_chars": response.final_text.chars().count(),
            }),
        ));
        Ok(response)
    }

    /// Eligible models for this run, computed once.
    ///
    /// Models served by a family with no registered provider are dropped.
    /// When probing is enabled each provider is asked for its model list; a
    /// failed probe keeps the configured models, and a probe that would
    /// leave nothing eligible is ignored.
    async fn eligible_models(&self, selection: ProviderSelection) -> EligibleModels {
        let configured = self.config.eligible_models(selection);
        let registered = EligibleModels::new(
            configured
                .iter()
                .filter(|m| self.providers.contains(m.provider))
                .cloned()
                .collect(),
        );
        if registered.len() < configured.len() {
            debug!(
                "Dropped {} model(s) without a registered provider",
                configured.len() - registered.len()
            );
        }

        if !self.params.probe_providers {
            return registered;
        }

        let mut probed = registered.clone();
        for provider in self.providers.iter() {
            let kind = provider.kind();
            if !selection.includes(kind) {
                continue;
            }
            match tokio::time::timeout(self.params.probe_timeout, provider.available_models())
                .await
            {
                Ok(Ok(models)) => {
                    debug!("{} provider reports {} model(s)", kind, models.len());
                    probed = probed.narrowed(kind, &models);
                }
                Ok(Err(e)) => warn!("Probing {} provider failed: {}", kind, e),
                Err(_) => warn!(
                    "Probing {} provider timed out after {:?}",
                    kind, self.params.probe_timeout
                ),
            }
        }

        if probed.is_empty() {
            warn!("No configured model is reported by any provider; keeping configuration");
            registered
        } else {
            probed
        }
    }

    fn cancelled(&self, partial: Vec<SubTaskOutcome>) -> ProcessRequestError {
        info!("Run cancelled after {} sub-task(s)", partial.len());
        self.run_logger.log(RunEvent::new(
            "run_cancelled",
            json!({ "completed_sub_tasks": partial.len() }),
        ));
        ProcessRequestError::Cancelled { partial }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::backend_provider::ProviderError;
    use crate::strategies::{ConfiguredAssignment, SectionedAggregation, TemplateDecomposition};
    use crate::testing::{FixedDecomposition, ScriptedJudgment, ScriptedProvider};
    use sage_domain::{ModelName, ModelSpec, ProviderKind, SubTaskSpec, SubTaskStatus};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<&'static str>>,
    }

    impl RunLogger for RecordingLogger {
        fn log(&self, event: RunEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    fn config(max_attempts: usize) -> Arc<OrchestrationConfig> {
        Arc::new(
            OrchestrationConfig::default()
                .with_max_retries(max_attempts - 1)
                .with_available_models(vec![
                    ModelSpec::new("gemma3:4b", ProviderKind::Local),
                    ModelSpec::new("qwen3:1.7b", ProviderKind::Local),
                ]),
        )
    }

    fn engine(
        specs: Vec<SubTaskSpec>,
        provider: Arc<ScriptedProvider>,
        judgment: Arc<ScriptedJudgment>,
        config: Arc<OrchestrationConfig>,
    ) -> ProcessRequestUseCase {
        let providers = Arc::new(ProviderSet::new().with_provider(provider));
        ProcessRequestUseCase::new(
            providers,
            Arc::new(FixedDecomposition(specs)),
            Arc::new(ConfiguredAssignment::new(config.clone())),
            judgment,
            Arc::new(SectionedAggregation::new()),
            config,
        )
    }

    fn request(text: &str) -> ProcessRequestInput {
        ProcessRequestInput::new(Request::try_new(text).unwrap())
    }

    fn replies(texts: &[&str]) -> Vec<Result<String, ProviderError>> {
        texts.iter().map(|t| Ok(t.to_string())).collect()
    }

    #[tokio::test]
    async fn test_accept_then_exhaust_aggregates_in_order() {
        let specs = vec![
            SubTaskSpec::new("1", "List the planets"),
            SubTaskSpec::new("2", "Describe Jupiter"),
        ];
        let provider = Arc::new(ScriptedProvider::local(replies(&[
            "planets", "jupiter-a", "jupiter-b", "jupiter-c",
        ])));
        let judgment = Arc::new(ScriptedJudgment::confidences(&[0.95, 0.4, 0.7, 0.6]));
        let uc = engine(specs, provider, judgment, config(3));

        let response = uc.process(request("Tell me about planets")).await.unwrap();

        let first = &response.per_sub_task[0];
        assert_eq!(first.status(), SubTaskStatus::Accepted);
        assert_eq!(first.attempts().len(), 1);

        let second = &response.per_sub_task[1];
        assert_eq!(second.status(), SubTaskStatus::Exhausted);
        assert_eq!(second.attempts().len(), 3);
        assert_eq!(second.effective_output(), Some("jupiter-b"));

        let first_pos = response.final_text.find("planets").unwrap();
        let second_pos = response.final_text.find("jupiter-b").unwrap();
        assert!(first_pos < second_pos);
        assert!(!response.final_text.contains("jupiter-a"));

        assert_eq!(response.summary.num_sub_tasks, 2);
        assert_eq!(response.summary.num_accepted, 1);
        assert_eq!(response.summary.num_exhausted, 1);
        assert_eq!(response.summary.total_attempts, 4);
        assert!(!response.all_accepted());
    }

    #[tokio::test]
    async fn test_empty_decomposition_fails() {
        let provider = Arc::new(ScriptedProvider::local(vec![]));
        let uc = engine(
            vec![],
            provider.clone(),
            Arc::new(ScriptedJudgment::confidences(&[])),
            config(2),
        );

        let err = uc.process(request("anything")).await.unwrap_err();
        assert!(err.is_decomposition_failure());
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cyclic_decomposition_fails() {
        let specs = vec![
            SubTaskSpec::new("a", "x").with_dependency("b"),
            SubTaskSpec::new("b", "y").with_dependency("a"),
        ];
        let uc = engine(
            specs,
            Arc::new(ScriptedProvider::local(vec![])),
            Arc::new(ScriptedJudgment::confidences(&[])),
            config(2),
        );

        let err = uc.process(request("anything")).await.unwrap_err();
        assert!(matches!(
            err,
            ProcessRequestError::Decomposition(DecompositionError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_dependency_outputs_follow_declared_order() {
        let specs = vec![
            SubTaskSpec::new("a", "first"),
            SubTaskSpec::new("b", "second"),
            SubTaskSpec::new("c", "combine")
                .with_dependency("b")
                .with_dependency("a"),
        ];
        let provider = Arc::new(ScriptedProvider::local(replies(&[
            "alpha-out",
            "beta-out",
            "gamma-out",
        ])));
        let uc = engine(
            specs,
            provider.clone(),
            Arc::new(ScriptedJudgment::confidences(&[0.95, 0.95, 0.95])),
            config(1),
        );

        uc.process(request("q")).await.unwrap();

        let calls = provider.calls();
        assert_eq!(calls[0].prompt, "first");
        assert_eq!(calls[1].prompt, "second");
        let third = &calls[2].prompt;
        assert!(third.find("beta-out").unwrap() < third.find("alpha-out").unwrap());
        assert!(third.ends_with("combine"));
    }

    #[tokio::test]
    async fn test_independent_subtask_gets_no_context() {
        let provider = Arc::new(ScriptedProvider::local(replies(&["one", "two"])));
        let uc = engine(
            vec![SubTaskSpec::new("1", "p1"), SubTaskSpec::new("2", "p2")],
            provider.clone(),
            Arc::new(ScriptedJudgment::confidences(&[0.95, 0.95])),
            config(1),
        );

        uc.process(request("q")).await.unwrap();
        assert_eq!(provider.calls()[1].prompt, "p2");
    }

    #[tokio::test]
    async fn test_failed_dependency_skips_dependant_only() {
        let specs = vec![
            SubTaskSpec::new("1", "fails"),
            SubTaskSpec::new("2", "needs 1").with_dependency("1"),
            SubTaskSpec::new("3", "independent"),
        ];
        let provider = Arc::new(ScriptedProvider::local(vec![
            Err(ProviderError::Connection("down".to_string())),
            Ok("three".to_string()),
        ]));
        let uc = engine(
            specs,
            provider.clone(),
            Arc::new(ScriptedJudgment::confidences(&[0.95])),
            config(1),
        );

        let response = uc.process(request("q")).await.unwrap();

        let outcomes = &response.per_sub_task;
        assert_eq!(outcomes[0].status(), SubTaskStatus::Exhausted);
        assert!(outcomes[0].effective_output().is_none());

        assert_eq!(outcomes[1].status(), SubTaskStatus::Exhausted);
        assert!(outcomes[1].attempts().is_empty());
        assert!(outcomes[1].failure_reason().unwrap().contains("no output"));

        assert!(outcomes[2].is_accepted());
        assert_eq!(provider.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_forward_reference_is_not_yet_processed() {
        let specs = vec![
            SubTaskSpec::new("1", "needs 2").with_dependency("2"),
            SubTaskSpec::new("2", "plain"),
        ];
        let uc = engine(
            specs,
            Arc::new(ScriptedProvider::local(replies(&["two"]))),
            Arc::new(ScriptedJudgment::confidences(&[0.95])),
            config(1),
        );

        let response = uc.process(request("q")).await.unwrap();
        assert!(response.per_sub_task[0].attempts().is_empty());
        assert!(
            response.per_sub_task[0]
                .failure_reason()
                .unwrap()
                .contains("not run yet")
        );
        assert!(response.per_sub_task[1].is_accepted());
    }

    #[tokio::test]
    async fn test_no_eligible_models_still_aggregates() {
        let provider = Arc::new(ScriptedProvider::local(vec![]));
        let uc = engine(
            vec![
                SubTaskSpec::new("1", "p"),
                SubTaskSpec::new("2", "q").with_dependency("1"),
            ],
            provider.clone(),
            Arc::new(ScriptedJudgment::confidences(&[])),
            config(1),
        );

        let response = uc
            .process(request("q").with_selection(ProviderSelection::Cloud))
            .await
            .unwrap();

        assert_eq!(response.per_sub_task.len(), 2);
        for outcome in &response.per_sub_task {
            assert_eq!(outcome.status(), SubTaskStatus::Exhausted);
            assert!(outcome.attempts().is_empty());
            assert_eq!(
                outcome.failure_reason(),
                Some("no eligible models for selection 'cloud'")
            );
        }
        assert!(response.final_text.contains("[no output]"));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_decomposition_fails_even_without_eligible_models() {
        let uc = engine(
            vec![],
            Arc::new(ScriptedProvider::local(vec![])),
            Arc::new(ScriptedJudgment::confidences(&[])),
            config(1),
        );

        let err = uc
            .process(request("q").with_selection(ProviderSelection::Cloud))
            .await
            .unwrap_err();
        assert!(err.is_decomposition_failure());
    }

    #[tokio::test]
    async fn test_models_without_provider_are_not_eligible() {
        let config = Arc::new(OrchestrationConfig::default().with_available_models(vec![
            ModelSpec::new("gpt-4o-mini", ProviderKind::Cloud),
            ModelSpec::new("qwen3:1.7b", ProviderKind::Local),
        ]));
        let provider = Arc::new(ScriptedProvider::local(replies(&["ok"])));
        let uc = engine(
            vec![SubTaskSpec::new("1", "p")],
            provider.clone(),
            Arc::new(ScriptedJudgment::confidences(&[0.95])),
            config,
        );

        let response = uc.process(request("q")).await.unwrap();
        assert!(response.all_accepted());
        assert_eq!(provider.calls()[0].model, ModelName::from("qwen3:1.7b"));
    }

    #[tokio::test]
    async fn test_probe_narrows_eligible_models() {
        let provider = Arc::new(
            ScriptedProvider::local(replies(&["ok"])).with_models(&["qwen3:1.7b", "llama3"]),
        );
        let uc = engine(
            vec![SubTaskSpec::new("1", "p")],
            provider.clone(),
            Arc::new(ScriptedJudgment::confidences(&[0.95])),
            config(1),
        )
        .with_execution_params(ExecutionParams::default().with_probe_providers(true));

        uc.process(request("q")).await.unwrap();
        // default model gemma3:4b is not reachable
        assert_eq!(provider.calls()[0].model, ModelName::from("qwen3:1.7b"));
    }

    #[tokio::test]
    async fn test_empty_probe_keeps_configuration() {
        let provider = Arc::new(ScriptedProvider::local(replies(&["ok"])).with_models(&["other"]));
        let uc = engine(
            vec![SubTaskSpec::new("1", "p")],
            provider.clone(),
            Arc::new(ScriptedJudgment::confidences(&[0.95])),
            config(1),
        )
        .with_execution_params(ExecutionParams::default().with_probe_providers(true));

        uc.process(request("q")).await.unwrap();
        assert_eq!(provider.calls()[0].model, ModelName::from("gemma3:4b"));
    }

    #[tokio::test]
    async fn test_template_decomposition_chains_analysis_into_response() {
        let config = config(1);
        let provider = Arc::new(ScriptedProvider::local(replies(&["analysis-out", "final"])));
        let providers = Arc::new(ProviderSet::new().with_provider(provider.clone()));
        let uc = ProcessRequestUseCase::new(
            providers,
            Arc::new(TemplateDecomposition),
            Arc::new(ConfiguredAssignment::new(config.clone())),
            Arc::new(ScriptedJudgment::confidences(&[0.95, 0.95])),
            Arc::new(SectionedAggregation::without_headers()),
            config,
        );

        let response = uc.process(request("Write a haiku")).await.unwrap();
        assert_eq!(response.per_sub_task.len(), 2);
        assert!(provider.calls()[1].prompt.contains("analysis-out"));
        assert_eq!(response.final_text, "analysis-out\n\nfinal");
    }

    #[tokio::test]
    async fn test_cancelled_before_start_returns_empty_partial() {
        let token = CancellationToken::new();
        token.cancel();
        let provider = Arc::new(ScriptedProvider::local(replies(&["x"])));
        let uc = engine(
            vec![SubTaskSpec::new("1", "p")],
            provider.clone(),
            Arc::new(ScriptedJudgment::confidences(&[0.95])),
            config(1),
        )
        .with_cancellation(token);

        match uc.process(request("q")).await {
            Err(ProcessRequestError::Cancelled { partial }) => assert!(partial.is_empty()),
            other => panic!("expected cancellation, got {other:?}"),
        }
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_mid_run_keeps_completed_outcomes() {
        let token = CancellationToken::new();
        // the first call answers at once; the second hangs until cancelled
        let fast = Arc::new(ScriptedProvider::local(replies(&["done"])));
        let slow = Arc::new(
            ScriptedProvider::new(ProviderKind::Cloud, replies(&["late"]))
                .with_delay(Duration::from_secs(5)),
        );
        let config = Arc::new(
            OrchestrationConfig::default()
                .with_max_retries(0)
                .with_available_models(vec![
                    ModelSpec::new("gemma3:4b", ProviderKind::Local),
                    ModelSpec::new("gpt-4o-mini", ProviderKind::Cloud),
                ])
                .with_task_preference(sage_domain::TaskType::Code, "gpt-4o-mini"),
        );
        let providers = Arc::new(ProviderSet::new().with_provider(fast).with_provider(slow));
        let uc = ProcessRequestUseCase::new(
            providers,
            Arc::new(FixedDecomposition(vec![
                SubTaskSpec::new("1", "p1"),
                SubTaskSpec::new("2", "p2").with_task_type(sage_domain::TaskType::Code),
            ])),
            Arc::new(ConfiguredAssignment::new(config.clone())),
            Arc::new(ScriptedJudgment::confidences(&[0.95])),
            Arc::new(SectionedAggregation::new()),
            config,
        )
        .with_cancellation(token.clone());

        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        match uc.process(request("q")).await {
            Err(ProcessRequestError::Cancelled { partial }) => {
                assert_eq!(partial.len(), 2);
                assert!(partial[0].is_accepted());
                assert_eq!(partial[1].status(), SubTaskStatus::InProgress);
                assert!(partial[1].attempts().is_empty());
            }
            other => panic!("expected cancellation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_logger_sees_lifecycle_events() {
        let logger = Arc::new(RecordingLogger::default());
        let uc = engine(
            vec![SubTaskSpec::new("1", "p")],
            Arc::new(ScriptedProvider::local(replies(&["a", "b"]))),
            Arc::new(ScriptedJudgment::confidences(&[0.5, 0.95])),
            config(2),
        )
        .with_run_logger(logger.clone());

        uc.process(request("q")).await.unwrap();

        assert_eq!(
            *logger.events.lock().unwrap(),
            vec![
                "run_started",
                "decomposed",
                "attempt",
                "attempt",
                "sub_task_completed",
                "run_completed",
            ]
        );
    }
}
