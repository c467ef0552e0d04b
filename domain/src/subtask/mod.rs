//! Sub-task domain
//!
//! A request is decomposed into an ordered list of [`SubTaskSpec`]s. Each one
//! is driven to a terminal [`SubTaskOutcome`] by the sub-task runner:
//!
//! ```text
//! SubTaskSpec ──▶ SubTaskOutcome { attempts: [Attempt, ...], status }
//!                                   │
//!                                   └─ Attempt = ExecutionResult + Option<EvaluationResult>
//! ```

pub mod outcome;
pub mod parser;
pub mod plan;
pub mod spec;

pub use outcome::{Attempt, ExecutionResult, OutcomeError, SubTaskOutcome, SubTaskStatus};
pub use parser::{parse_subtasks, parse_subtasks_json};
pub use plan::{DependencyError, PlanError, validate_specs};
pub use spec::{SubTaskId, SubTaskSpec, TaskType};
