//! CPython backend
//!
//! Talks to the interpreter that the host process already initialized. The
//! gate is the GIL, taken with `PyGILState_Ensure` so a thread the
//! interpreter has never seen (the injector's thread) gets a thread state on
//! the way in, and given back with `PyGILState_Release`.
//!
//! `PyGILState_Ensure` has no deadline, so only blocking waits are supported:
//! a bounded wait reports [`GateError::BoundedWaitUnsupported`] without
//! touching the GIL.

#![allow(unsafe_code)] // raw CPython API

use super::{EmbeddedRuntime, RuntimeGate};
use crate::command::CommandText;
use crate::domain::GateError;
use log::debug;
use pyo3::ffi;
use std::marker::PhantomData;

/// The interpreter already running in this process
#[derive(Debug)]
pub struct PythonRuntime {
    _private: (),
}

impl PythonRuntime {
    /// Handle on the current process's interpreter.
    ///
    /// # Errors
    /// [`GateError::RuntimeUnavailable`] if the interpreter has not been
    /// initialized (or has already been finalized).
    pub fn current() -> Result<Self, GateError> {
        if is_initialized() {
            Ok(Self { _private: () })
        } else {
            Err(GateError::RuntimeUnavailable)
        }
    }
}

fn is_initialized() -> bool {
    // SAFETY: Py_IsInitialized may be called at any time, with or without the GIL
    unsafe { ffi::Py_IsInitialized() != 0 }
}

impl EmbeddedRuntime for PythonRuntime {
    type Gate<'rt> = GilGate
    where
        Self: 'rt;

    fn acquire_gate(&self) -> Result<GilGate, GateError> {
        // The interpreter may have been finalized since `current()`
        if !is_initialized() {
            return Err(GateError::RuntimeUnavailable);
        }
        // SAFETY: the interpreter is initialized; PyGILState_Ensure is valid
        // from any thread and nests if this thread already holds the GIL
        let state = unsafe { ffi::PyGILState_Ensure() };
        debug!("GIL acquired");
        Ok(GilGate { state, _not_send: PhantomData })
    }
}

/// Held GIL. Released on drop, on the thread that acquired it.
pub struct GilGate {
    state: ffi::PyGILState_STATE,
    // PyGILState_Release must run on the acquiring thread
    _not_send: PhantomData<*mut ()>,
}

impl RuntimeGate for GilGate {
    fn evaluate(&mut self, command: &CommandText) -> i32 {
        // SAFETY: the GIL is held for the lifetime of `self` and the command
        // is a valid NUL-terminated C string
        unsafe { ffi::PyRun_SimpleString(command.as_c_str().as_ptr()) }
    }

    fn holds_gate(&self) -> bool {
        // SAFETY: PyGILState_Check only inspects thread-local state
        unsafe { ffi::PyGILState_Check() == 1 }
    }
}

impl Drop for GilGate {
    fn drop(&mut self) {
        // SAFETY: pairs with the PyGILState_Ensure that produced `state`,
        // on the same thread (GilGate is !Send)
        unsafe { ffi::PyGILState_Release(self.state) };
        debug!("GIL released");
    }
}
