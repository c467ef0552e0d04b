//! Ports (interfaces) for external dependencies
//!
//! Ports define the boundaries between the application layer and the outside
//! world. Strategies and adapters implement them; use cases depend only on
//! these traits.

pub mod aggregation;
pub mod assignment;
pub mod backend_provider;
pub mod decomposition;
pub mod judgment;
pub mod progress;
pub mod run_logger;
