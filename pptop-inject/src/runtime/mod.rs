//! Embedded-runtime capability
//!
//! The entry point never reaches for a process-wide interpreter on its own;
//! it is handed an [`EmbeddedRuntime`] and only touches runtime-managed state
//! through the [`RuntimeGate`] guard that runtime hands out.
//!
//! ## Implementations
//!
//! - [`PythonRuntime`] (`python` feature): the CPython interpreter already
//!   initialized in this process, gated by the GIL
//! - [`RecordingRuntime`]: captures commands instead of running them; used by
//!   `pptop-inject render` and by tests

#[cfg(feature = "python")]
pub mod python;
pub mod recording;

#[cfg(feature = "python")]
pub use python::{GilGate, PythonRuntime};
pub use recording::{RecordingGate, RecordingRuntime};

use crate::command::CommandText;
use crate::domain::GateError;
use std::time::Duration;

/// Exclusive access to runtime-managed state.
///
/// Holding a value of this type means the current thread holds the runtime
/// gate. Dropping it releases the gate; implementations must release in
/// `Drop` so every exit path, including early returns and unwinding, lets go.
pub trait RuntimeGate {
    /// Evaluate `command` in the runtime's global namespace.
    ///
    /// Returns the evaluator's status unchanged (`0` on success).
    fn evaluate(&mut self, command: &CommandText) -> i32;

    /// Whether the calling thread currently holds the gate
    fn holds_gate(&self) -> bool;
}

/// Handle on a scripting runtime living in this process
pub trait EmbeddedRuntime {
    type Gate<'rt>: RuntimeGate
    where
        Self: 'rt;

    /// Block until the gate is held by the calling thread.
    ///
    /// There is no timeout: if another holder never releases, this never returns.
    ///
    /// # Errors
    /// [`GateError::RuntimeUnavailable`] when there is no runtime to enter.
    fn acquire_gate(&self) -> Result<Self::Gate<'_>, GateError>;

    /// Like [`acquire_gate`](Self::acquire_gate), giving up after `timeout`.
    ///
    /// # Errors
    /// [`GateError::Timeout`] when the wait expires. Runtimes whose gate
    /// primitive cannot be waited on with a deadline (CPython's GIL among
    /// them) keep this default and return [`GateError::BoundedWaitUnsupported`].
    fn acquire_gate_within(&self, timeout: Duration) -> Result<Self::Gate<'_>, GateError> {
        let _ = timeout;
        Err(GateError::BoundedWaitUnsupported)
    }
}
