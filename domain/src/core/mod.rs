//! Core domain concepts shared across all subdomains.
//!
//! - [`model::ModelName`] / [`model::ProviderKind`]: backend models and the
//!   provider family that serves them
//! - [`request::Request`]: a validated top-level request
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
pub mod request;
pub mod string;
