//! Application-level configuration.
//!
//! - [`ExecutionParams`] - call timeouts and provider probing

pub mod execution_params;

pub use execution_params::ExecutionParams;
