//! Command construction
//!
//! Turns an [`InjectionRequest`](crate::domain::InjectionRequest) into the
//! Python source submitted to the embedded runtime. Construction is
//! bounds-checked against the revision's buffer capacity and refuses any path
//! that could escape its string literal.

pub mod buffer;
pub mod template;

pub use buffer::CommandText;
pub use template::{build_command, check_literal, path_budget};
