//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod process_request;
pub mod run_subtask;
pub(crate) mod shared;
