//! Domain model for pptop-inject
//!
//! This module contains the request and error types that provide:
//! - One tagged request per protocol revision
//! - Structured errors that map onto the entry point's status codes

pub mod errors;
pub mod request;

// Re-export common types for convenience
pub use errors::{CommandError, GateError, InjectError, RequestField};
pub use request::InjectionRequest;
