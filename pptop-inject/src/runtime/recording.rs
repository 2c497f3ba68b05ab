//! Runtime that records commands instead of executing them

use super::{EmbeddedRuntime, RuntimeGate};
use crate::command::CommandText;
use crate::domain::GateError;
use std::cell::{Cell, RefCell};
use std::time::Duration;

/// In-process stand-in for an embedded interpreter.
///
/// Every evaluated command is kept, and evaluation returns a fixed status.
/// Like the GIL the gate is re-entrant for the thread holding it, so the
/// runtime tracks a hold depth and counts every acquire and release.
#[derive(Debug, Default)]
pub struct RecordingRuntime {
    status: i32,
    commands: RefCell<Vec<CommandText>>,
    depth: Cell<usize>,
    acquired: Cell<usize>,
    released: Cell<usize>,
}

impl RecordingRuntime {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runtime whose evaluations all report `status`
    #[must_use]
    pub fn with_status(status: i32) -> Self {
        Self { status, ..Self::default() }
    }

    /// Commands evaluated so far, oldest first
    #[must_use]
    pub fn commands(&self) -> Vec<CommandText> {
        self.commands.borrow().clone()
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        self.depth.get() > 0
    }

    #[must_use]
    pub fn acquire_count(&self) -> usize {
        self.acquired.get()
    }

    #[must_use]
    pub fn release_count(&self) -> usize {
        self.released.get()
    }
}

impl EmbeddedRuntime for RecordingRuntime {
    type Gate<'rt> = RecordingGate<'rt>
    where
        Self: 'rt;

    fn acquire_gate(&self) -> Result<RecordingGate<'_>, GateError> {
        self.depth.set(self.depth.get() + 1);
        self.acquired.set(self.acquired.get() + 1);
        Ok(RecordingGate { runtime: self })
    }

    // Nothing else can hold this gate, so a bounded wait never has to wait.
    fn acquire_gate_within(&self, _timeout: Duration) -> Result<RecordingGate<'_>, GateError> {
        self.acquire_gate()
    }
}

pub struct RecordingGate<'rt> {
    runtime: &'rt RecordingRuntime,
}

impl RuntimeGate for RecordingGate<'_> {
    fn evaluate(&mut self, command: &CommandText) -> i32 {
        self.runtime.commands.borrow_mut().push(command.clone());
        self.runtime.status
    }

    fn holds_gate(&self) -> bool {
        self.runtime.is_held()
    }
}

impl Drop for RecordingGate<'_> {
    fn drop(&mut self) {
        self.runtime.depth.set(self.runtime.depth.get().saturating_sub(1));
        self.runtime.released.set(self.runtime.released.get() + 1);
    }
}
