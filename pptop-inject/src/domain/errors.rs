//! Structured error types for pptop-inject
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! Every error knows the status code it is reported as through the C entry point.

use pptop_inject_common::{
    ProtocolRevision, STATUS_COMMAND_TOO_LONG, STATUS_GATE_TIMEOUT,
    STATUS_GATE_WAIT_UNSUPPORTED, STATUS_INVALID_ARGUMENT, STATUS_RUNTIME_UNAVAILABLE,
    STATUS_UNSAFE_ARGUMENT,
};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Text fields of a request that end up inside a string literal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestField {
    LibraryPath,
    LogPath,
}

impl fmt::Display for RequestField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestField::LibraryPath => f.write_str("library path"),
            RequestField::LogPath => f.write_str("log path"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("{0} must not be empty")]
    EmptyField(RequestField),

    #[error("{field} contains unsafe character {ch:?} at byte {index}")]
    UnsafeCharacter { field: RequestField, ch: char, index: usize },

    #[error("command needs {required} bytes but the {revision:?} buffer holds {capacity}")]
    TooLong { revision: ProtocolRevision, capacity: usize, required: usize },

    // Only guards CString::new: check_literal already rejects NUL as a
    // control character, so no request reaches this through build_command.
    #[error("command contains a NUL byte at {index}")]
    InteriorNul { index: usize },
}

impl CommandError {
    #[must_use]
    pub fn status_code(&self) -> i32 {
        match self {
            CommandError::EmptyField(_) => STATUS_INVALID_ARGUMENT,
            CommandError::UnsafeCharacter { .. } | CommandError::InteriorNul { .. } => {
                STATUS_UNSAFE_ARGUMENT
            }
            CommandError::TooLong { .. } => STATUS_COMMAND_TOO_LONG,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("no initialized runtime in this process")]
    RuntimeUnavailable,

    #[error("runtime gate not acquired within {0:?}")]
    Timeout(Duration),

    #[error("runtime does not support bounded gate waits")]
    BoundedWaitUnsupported,
}

impl GateError {
    #[must_use]
    pub fn status_code(&self) -> i32 {
        match self {
            GateError::RuntimeUnavailable => STATUS_RUNTIME_UNAVAILABLE,
            GateError::Timeout(_) => STATUS_GATE_TIMEOUT,
            GateError::BoundedWaitUnsupported => STATUS_GATE_WAIT_UNSUPPORTED,
        }
    }
}

#[derive(Error, Debug)]
pub enum InjectError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error("command evaluation failed with status {0}")]
    Evaluation(i32),
}

impl InjectError {
    /// Status code reported through the C entry point
    ///
    /// Evaluation failures return the evaluator's own status unchanged.
    #[must_use]
    pub fn status_code(&self) -> i32 {
        match self {
            InjectError::InvalidArgument(_) => STATUS_INVALID_ARGUMENT,
            InjectError::Command(e) => e.status_code(),
            InjectError::Gate(e) => e.status_code(),
            InjectError::Evaluation(status) => *status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsafe_character_display() {
        let err = CommandError::UnsafeCharacter { field: RequestField::LogPath, ch: '\'', index: 4 };
        assert_eq!(err.to_string(), "log path contains unsafe character '\\'' at byte 4");
    }

    #[test]
    fn test_too_long_display() {
        let err = CommandError::TooLong {
            revision: ProtocolRevision::V2,
            capacity: 1024,
            required: 1500,
        };
        assert!(err.to_string().contains("1500"));
        assert!(err.to_string().contains("V2"));
    }

    #[test]
    fn test_evaluation_status_passes_through() {
        assert_eq!(InjectError::Evaluation(-1).status_code(), -1);
        assert_eq!(InjectError::Evaluation(17).status_code(), 17);
    }

    #[test]
    fn test_nested_status_codes() {
        let err: InjectError = GateError::RuntimeUnavailable.into();
        assert_eq!(err.status_code(), STATUS_RUNTIME_UNAVAILABLE);

        let err: InjectError = CommandError::EmptyField(RequestField::LibraryPath).into();
        assert_eq!(err.status_code(), STATUS_INVALID_ARGUMENT);
    }

    #[test]
    fn test_gate_status_codes() {
        assert_eq!(GateError::Timeout(Duration::from_millis(5)).status_code(), STATUS_GATE_TIMEOUT);
        assert_eq!(GateError::BoundedWaitUnsupported.status_code(), STATUS_GATE_WAIT_UNSUPPORTED);
    }
}
