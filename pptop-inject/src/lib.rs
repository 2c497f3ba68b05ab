//! # pptop-inject - Native Injection Shim for pptop
//!
//! pptop profiles a running Python process by getting code into it. The
//! injector maps a small native library (`pptop-shim`) into the target and
//! calls its exported entry point on a thread of its own. That entry point
//! enters the interpreter already running there, imports `pptop.injection`
//! and calls its `start(...)`, which starts the monitoring session. This
//! crate holds everything behind that entry point.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────┐       ┌──────────────────────────────┐
//! │ Injector (external)          │       │ Target process               │
//! │  loads pptop-shim, calls     │──────▶│  __pptop_start_injection(..) │
//! │  __pptop_start_injection     │       │        │                     │
//! └──────────────────────────────┘       │        ▼                     │
//!                                        │  entry::start_injection      │
//!                                        │   1. acquire gate (GIL)      │
//!                                        │   2. command::build_command  │
//!                                        │   3. PyRun_SimpleString      │
//!                                        │   4. release gate            │
//!                                        │        │                     │
//!                                        │        ▼                     │
//!                                        │  pptop.injection.start(...)  │
//!                                        └──────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`domain`]: [`InjectionRequest`] (one variant per protocol revision) and errors
//! - [`command`]: bounds-checked, injection-safe command construction
//! - [`runtime`]: the [`EmbeddedRuntime`](runtime::EmbeddedRuntime) capability and its
//!   gate guard; CPython backend behind the `python` feature
//! - [`entry`]: the entry point itself
//! - [`preflight`]: injector-side request checks
//! - [`render`]: dry-run of the entry point for `pptop-inject render`
//! - [`cli`]: arguments of the `pptop-inject` binary
//!
//! ## Protocol Revisions
//!
//! | Revision | `start(...)` arguments   | `sys.path` insertion | Buffer |
//! |----------|--------------------------|----------------------|--------|
//! | 1        | `pid, log`               | always               | 3000   |
//! | 2        | `pid, log, protocol`     | always               | 1024   |
//! | 3        | `pid, protocol, log`     | only if absent       | 1024   |
//!
//! The revision is a binary contract with the injection module: a mismatch
//! fails inside the runtime and shows up only as a non-zero status.

pub mod cli;
pub mod command;
pub mod domain;
pub mod entry;
pub mod preflight;
pub mod render;
pub mod runtime;

pub use domain::{CommandError, GateError, InjectError, InjectionRequest};
pub use entry::{start_injection, start_injection_with, GateFailure, GateWait, InjectionConfig};
