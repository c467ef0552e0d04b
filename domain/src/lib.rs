//! Domain layer for sage
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Sub-tasks
//!
//! A request is decomposed into an ordered list of sub-tasks. Each sub-task
//! runs through assignment → execution → evaluation, retrying with escalated
//! parameters until an attempt is accepted or the attempt budget runs out.
//!
//! ## Effective output
//!
//! - **Accepted**: the output of the attempt that passed the threshold
//! - **Exhausted**: the output of the highest-confidence attempt, not the last

pub mod assignment;
pub mod core;
pub mod evaluation;
pub mod orchestration;
pub mod prompt;
pub mod subtask;

// Re-export commonly used types
pub use assignment::{ModelAssignment, ModelParameters, ParameterBounds, escalate, extract_model_name};
pub use core::{
    error::DomainError,
    model::{ModelName, ModelSpec, ProviderKind},
    request::Request,
};
pub use evaluation::{
    EvaluationResult, JudgmentMethod, Verdict, cosine_similarity, parse_confidence,
    parse_judgment,
};
pub use orchestration::{
    AggregatedResponse, EligibleModels, OrchestrationConfig, ProviderSelection, RunSummary,
    RunningContext,
};
pub use prompt::PromptTemplate;
pub use subtask::{
    Attempt, DependencyError, ExecutionResult, OutcomeError, PlanError, SubTaskId,
    SubTaskOutcome, SubTaskSpec, SubTaskStatus, TaskType, parse_subtasks, parse_subtasks_json,
    validate_specs,
};
