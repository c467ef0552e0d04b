//! Model assignment domain
//!
//! Everything that decides *how* an attempt is issued: which model, which
//! provider family and which sampling parameters.
//!
//! - [`ModelAssignment`]: model + provider + parameters for one attempt
//! - [`escalate`]: pure retry escalation bounded by [`ParameterBounds`]
//! - [`extract_model_name`]: pick a candidate out of a router model's reply

pub mod parameters;
pub mod selection;
pub mod value_objects;

pub use parameters::{ModelParameters, ParameterBounds, escalate};
pub use selection::extract_model_name;
pub use value_objects::ModelAssignment;
