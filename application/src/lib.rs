//! Application layer for sage
//!
//! This crate contains use cases, port definitions, strategy implementations
//! and application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod strategies;
pub mod use_cases;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    aggregation::AggregationStrategy,
    assignment::{AssignmentError, AssignmentStrategy},
    backend_provider::{BackendProvider, ProviderError, ProviderSet},
    decomposition::{DecompositionError, DecompositionStrategy},
    judgment::JudgmentStrategy,
    progress::{NoProgress, OrchestrationProgress},
    run_logger::{NoRunLogger, RunEvent, RunLogger},
};
pub use strategies::{
    ConfiguredAssignment, LlmAssignment, LlmDecomposition, LlmJudgment, ModelCall,
    ModeratorAggregation, SectionedAggregation, SimilarityJudgment, SingleTaskDecomposition,
    TemplateDecomposition,
};
pub use use_cases::process_request::{
    ProcessRequestError, ProcessRequestInput, ProcessRequestUseCase,
};
pub use use_cases::run_subtask::{RunSubTaskError, RunSubTaskInput, RunSubTaskUseCase};
