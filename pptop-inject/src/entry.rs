//! Injection entry point
//!
//! One call, one attempt, one status:
//!
//! ```text
//!  gate not held ──acquire──▶ gate held ──build──▶ evaluate ──drop guard──▶ gate not held
//!        ▲                        │                   │
//!        └──── drop guard ◀───────┴── build error ────┘ (status returned either way)
//! ```
//!
//! Nothing is retried and nothing is recovered here; the injector owns recovery.

use crate::command::build_command;
use crate::domain::{GateError, InjectError, InjectionRequest};
use crate::runtime::{EmbeddedRuntime, RuntimeGate};
use log::{debug, error, warn};
use pptop_inject_common::STATUS_OK;
use std::time::Duration;

/// How long to wait for the runtime gate
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GateWait {
    /// Wait as long as it takes
    #[default]
    Blocking,
    /// Give up after the given duration
    Bounded(Duration),
}

/// What to do when the gate cannot be acquired
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GateFailure {
    /// Return the failure as a status code
    #[default]
    Report,
    /// Abort the whole process. A runtime that cannot wait with a deadline
    /// is a configuration mismatch, not a stuck gate, and is still reported.
    Abort,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InjectionConfig {
    pub gate_wait: GateWait,
    pub on_gate_failure: GateFailure,
}

fn acquire<'rt, R: EmbeddedRuntime>(
    runtime: &'rt R,
    config: &InjectionConfig,
) -> Result<R::Gate<'rt>, GateError> {
    let gate = match config.gate_wait {
        GateWait::Blocking => runtime.acquire_gate(),
        GateWait::Bounded(timeout) => runtime.acquire_gate_within(timeout),
    };
    if let Err(ref e) = gate {
        if config.on_gate_failure == GateFailure::Abort
            && !matches!(e, GateError::BoundedWaitUnsupported)
        {
            error!("cannot enter runtime: {e}, aborting");
            std::process::abort();
        }
    }
    gate
}

/// Run one injection and report failures as [`InjectError`].
///
/// The gate is held from acquisition until evaluation has returned and is
/// released on every path out of this function, including command
/// construction errors.
///
/// # Errors
/// - [`InjectError::Gate`]: the runtime could not be entered
/// - [`InjectError::Command`]: the request cannot be rendered safely
/// - [`InjectError::Evaluation`]: the runtime reported a non-zero status
pub fn run_injection<R: EmbeddedRuntime>(
    runtime: &R,
    request: &InjectionRequest,
    config: &InjectionConfig,
) -> Result<(), InjectError> {
    let mut gate = acquire(runtime, config)?;
    let command = build_command(request)?;

    debug!("evaluating {:?} command for pid {}", request.revision(), request.process_id());
    let status = gate.evaluate(&command);
    drop(gate);

    if status == STATUS_OK {
        Ok(())
    } else {
        Err(InjectError::Evaluation(status))
    }
}

/// Status-code flavour of [`run_injection`] with a custom configuration.
pub fn start_injection_with<R: EmbeddedRuntime>(
    runtime: &R,
    request: &InjectionRequest,
    config: &InjectionConfig,
) -> i32 {
    match run_injection(runtime, request, config) {
        Ok(()) => STATUS_OK,
        Err(e) => {
            warn!("injection failed: {e}");
            e.status_code()
        }
    }
}

/// Inject with the default configuration (blocking wait, report failures).
///
/// Returns `0` on success, the evaluator's status if the command failed, or
/// one of the negative `STATUS_*` codes if it never reached the runtime.
pub fn start_injection<R: EmbeddedRuntime>(runtime: &R, request: &InjectionRequest) -> i32 {
    start_injection_with(runtime, request, &InjectionConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RecordingRuntime;
    use pptop_inject_common::{ProtocolRevision, STATUS_COMMAND_TOO_LONG, STATUS_UNSAFE_ARGUMENT};

    fn scenario(revision: ProtocolRevision) -> InjectionRequest {
        InjectionRequest::new(revision, "/opt/pp", 4242, 2, "/tmp/pp.log")
    }

    #[test]
    fn test_success_holds_gate_once() {
        let runtime = RecordingRuntime::new();
        assert_eq!(start_injection(&runtime, &scenario(ProtocolRevision::V1)), STATUS_OK);
        assert_eq!(runtime.acquire_count(), 1);
        assert_eq!(runtime.release_count(), 1);
        assert!(!runtime.is_held());
        assert_eq!(runtime.commands().len(), 1);
    }

    #[test]
    fn test_evaluation_status_passthrough() {
        for status in [-1, 1, 42, i32::MIN] {
            let runtime = RecordingRuntime::with_status(status);
            assert_eq!(start_injection(&runtime, &scenario(ProtocolRevision::V3)), status);
            assert!(!runtime.is_held());
        }
    }

    #[test]
    fn test_build_failure_releases_gate_without_evaluating() {
        let runtime = RecordingRuntime::new();
        let req = InjectionRequest::new(ProtocolRevision::V2, "/opt/pp", 1, 2, "/tmp/'x");
        assert_eq!(start_injection(&runtime, &req), STATUS_UNSAFE_ARGUMENT);
        assert_eq!(runtime.acquire_count(), 1);
        assert_eq!(runtime.release_count(), 1);
        assert!(runtime.commands().is_empty());
    }

    #[test]
    fn test_oversized_request_reports_too_long() {
        let runtime = RecordingRuntime::new();
        let req = InjectionRequest::new(ProtocolRevision::V3, "/opt/pp", 1, 2, "x".repeat(2000));
        assert_eq!(start_injection(&runtime, &req), STATUS_COMMAND_TOO_LONG);
        assert!(!runtime.is_held());
    }

    #[test]
    fn test_run_injection_error_variants() {
        let runtime = RecordingRuntime::with_status(-1);
        let err = run_injection(&runtime, &scenario(ProtocolRevision::V2), &InjectionConfig::default())
            .unwrap_err();
        assert!(matches!(err, InjectError::Evaluation(-1)));
    }
}
