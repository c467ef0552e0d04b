//! Orchestration domain
//!
//! Run-level concepts shared by the engine and its strategies.
//!
//! - [`OrchestrationConfig`] - frozen snapshot of thresholds, models and bounds
//! - [`ProviderSelection`] / [`EligibleModels`] - which models a run may use
//! - [`RunningContext`] - effective outputs threaded between sub-tasks
//! - [`AggregatedResponse`] - the final answer with per-sub-task history

pub mod config;
pub mod context;
pub mod value_objects;

pub use config::{EligibleModels, OrchestrationConfig, ProviderSelection};
pub use context::RunningContext;
pub use value_objects::{AggregatedResponse, RunSummary};
