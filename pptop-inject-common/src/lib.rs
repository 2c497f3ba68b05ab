//! # Shared ABI Contract (Shim ↔ Injector ↔ Injection Module)
//!
//! Constants and small value types shared between the native shim loaded into
//! the target process (`pptop-shim`) and the host-side tooling
//! (`pptop-inject`). Everything here is part of a binary contract with an
//! external party: the injector resolves the exported symbol names, and the
//! Python injection module must accept the positional arguments in the order
//! the selected protocol revision emits them.
//!
//! ## Key Items
//!
//! - [`ProtocolRevision`] - Which `start(...)` signature the command targets
//! - [`INJECTION_MODULE`] / [`START_OPERATION`] - Fixed import target
//! - `STATUS_*` - Return codes of the exported entry points

#![cfg_attr(not(test), no_std)]

// ============================================================================
// Injection Module Contract
// ============================================================================

/// Python module imported by the generated command.
///
/// Must be importable once the library path has been placed on `sys.path`.
pub const INJECTION_MODULE: &str = "pptop.injection";

/// Operation called on [`INJECTION_MODULE`] to start the monitoring session.
pub const START_OPERATION: &str = "start";

// ============================================================================
// Exported Symbols
// ============================================================================

/// Entry point resolved by the injector after loading the shim.
///
/// Implements whichever revision the shim was built for.
pub const ENTRY_SYMBOL: &str = "__pptop_start_injection";

/// Revision-pinned entry points, always exported alongside [`ENTRY_SYMBOL`].
pub const ENTRY_SYMBOL_V1: &str = "__pptop_start_injection_v1";
pub const ENTRY_SYMBOL_V2: &str = "__pptop_start_injection_v2";
pub const ENTRY_SYMBOL_V3: &str = "__pptop_start_injection_v3";

// ============================================================================
// Status Codes
// ============================================================================
//
// Zero and `STATUS_EVAL_FAILED` come straight from `PyRun_SimpleString` and are
// passed through untouched. The remaining codes are produced before the
// command reaches the runtime and never collide with the evaluator's values.

/// Command evaluated without raising.
pub const STATUS_OK: i32 = 0;

/// The evaluator reported an exception (module missing, import error, `start` raised).
pub const STATUS_EVAL_FAILED: i32 = -1;

/// Null pointer or non-UTF-8 path handed to the entry point.
pub const STATUS_INVALID_ARGUMENT: i32 = -2;

/// A path contains a character that would break out of the string literal.
pub const STATUS_UNSAFE_ARGUMENT: i32 = -3;

/// The formatted command does not fit the revision's buffer.
pub const STATUS_COMMAND_TOO_LONG: i32 = -4;

/// No initialised runtime in this process.
pub const STATUS_RUNTIME_UNAVAILABLE: i32 = -5;

/// Bounded gate wait expired.
pub const STATUS_GATE_TIMEOUT: i32 = -6;

/// The entry point panicked; the panic was contained at the FFI boundary.
pub const STATUS_PANIC: i32 = -7;

/// A bounded gate wait was requested from a runtime that can only block.
pub const STATUS_GATE_WAIT_UNSUPPORTED: i32 = -8;

// ============================================================================
// Protocol Revisions
// ============================================================================

/// Command buffer size used by the first revision, terminator included.
pub const V1_COMMAND_CAPACITY: usize = 3000;

/// Command buffer size used by every later revision, terminator included.
pub const COMMAND_CAPACITY: usize = 1024;

/// Positional-argument contract between the shim and `pptop.injection.start`.
///
/// | Revision | `start(...)` arguments             | Path insertion |
/// |----------|------------------------------------|----------------|
/// | `V1`     | `pid, log_path`                    | unconditional  |
/// | `V2`     | `pid, log_path, protocol`          | unconditional  |
/// | `V3`     | `pid, protocol, log_path`          | only if absent |
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProtocolRevision {
    V1 = 1,
    V2 = 2,
    V3 = 3,
}

impl ProtocolRevision {
    /// All revisions, oldest first
    pub const ALL: [ProtocolRevision; 3] =
        [ProtocolRevision::V1, ProtocolRevision::V2, ProtocolRevision::V3];

    /// Decode a numeric revision (`1`, `2` or `3`)
    #[must_use]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(ProtocolRevision::V1),
            2 => Some(ProtocolRevision::V2),
            3 => Some(ProtocolRevision::V3),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Size of the command buffer, including the trailing NUL.
    #[must_use]
    pub const fn command_capacity(self) -> usize {
        match self {
            ProtocolRevision::V1 => V1_COMMAND_CAPACITY,
            ProtocolRevision::V2 | ProtocolRevision::V3 => COMMAND_CAPACITY,
        }
    }

    /// Longest command text (without terminator) this revision accepts.
    #[must_use]
    pub const fn max_command_len(self) -> usize {
        self.command_capacity() - 1
    }

    /// Whether the library path is only inserted when not already on `sys.path`.
    #[must_use]
    pub const fn idempotent_path_insert(self) -> bool {
        matches!(self, ProtocolRevision::V3)
    }

    /// Whether `start(...)` receives a protocol version argument.
    #[must_use]
    pub const fn carries_protocol(self) -> bool {
        !matches!(self, ProtocolRevision::V1)
    }

    /// Name of the revision-pinned exported symbol.
    #[must_use]
    pub const fn entry_symbol(self) -> &'static str {
        match self {
            ProtocolRevision::V1 => ENTRY_SYMBOL_V1,
            ProtocolRevision::V2 => ENTRY_SYMBOL_V2,
            ProtocolRevision::V3 => ENTRY_SYMBOL_V3,
        }
    }
}
