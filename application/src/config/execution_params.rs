//! Execution parameters - use case call control.
//!
//! [`ExecutionParams`] groups the static parameters that bound the I/O of a
//! run: call timeouts and whether providers are probed before the eligible
//! model set is fixed. These are application-layer concerns, not domain
//! policy (thresholds and attempt budgets live in
//! [`OrchestrationConfig`](sage_domain::OrchestrationConfig)).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Call control parameters.
///
/// Used by ProcessRequestUseCase, RunSubTaskUseCase and the model-backed
/// strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Timeout for each sub-task backend call.
    pub call_timeout: Option<Duration>,
    /// Timeout for each judge-model call before falling back to similarity.
    pub judge_timeout: Option<Duration>,
    /// Ask each provider for its model list once at run start.
    pub probe_providers: bool,
    /// Timeout for each availability probe.
    pub probe_timeout: Duration,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            call_timeout: Some(Duration::from_secs(120)),
            judge_timeout: Some(Duration::from_secs(60)),
            probe_providers: false,
            probe_timeout: Duration::from_secs(5),
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_judge_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.judge_timeout = timeout;
        self
    }

    pub fn with_probe_providers(mut self, probe: bool) -> Self {
        self.probe_providers = probe;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Creates params from an optional timeout in seconds for both sub-task
    /// and judge calls. `None` disables the timeouts.
    pub fn from_timeout_seconds(seconds: Option<u64>) -> Self {
        let timeout = seconds.map(Duration::from_secs);
        Self::default()
            .with_call_timeout(timeout)
            .with_judge_timeout(timeout)
    }
}
