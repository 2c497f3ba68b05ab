//! Dry-run rendering of injection requests
//!
//! Pushes a request through the same entry path the shim uses, against a
//! recording runtime, and hands back the command that would have been
//! evaluated. A request the shim would refuse fails here with the same error.

use crate::command::{path_budget, CommandText};
use crate::domain::{InjectError, InjectionRequest};
use crate::entry::{run_injection, InjectionConfig};
use crate::runtime::RecordingRuntime;
use serde::Serialize;

/// Command the entry point would evaluate for `request`.
///
/// # Errors
/// Whatever [`run_injection`] reports; the recording runtime itself never fails.
pub fn render(request: &InjectionRequest) -> Result<CommandText, InjectError> {
    let runtime = RecordingRuntime::new();
    run_injection(&runtime, request, &InjectionConfig::default())?;
    runtime
        .commands()
        .pop()
        .ok_or_else(|| InjectError::InvalidArgument("no command was evaluated".to_string()))
}

/// JSON form of `render --json`
#[derive(Debug, Serialize)]
pub struct RenderReport {
    pub revision: u32,
    pub symbol: &'static str,
    pub capacity: usize,
    pub length: usize,
    pub library_path_budget: usize,
    pub command: String,
}

impl RenderReport {
    #[must_use]
    pub fn new(command: &CommandText) -> Self {
        let revision = command.revision();
        Self {
            revision: revision.as_u32(),
            symbol: revision.entry_symbol(),
            capacity: revision.command_capacity(),
            length: command.len(),
            library_path_budget: path_budget(revision),
            command: command.as_str().to_string(),
        }
    }
}
