//! Infrastructure layer for sage
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: HTTP backend providers, configuration
//! file loading and the JSONL run logger.

pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use config::{
    AggregationChoice, AssignmentChoice, ConfigLoader, ConfigValidationError,
    DecompositionChoice, FileConfig, FileModelsConfig, FileOrchestrationConfig,
    FileOutputConfig, FileOutputFormat,
};
pub use logging::JsonlRunLogger;
pub use providers::{OllamaProvider, OpenAiProvider, build_provider_set};
