//! # Injected Shim (Target-Process Side)
//!
//! Shared library the injector maps into a running Python process. It exports
//! C entry points that the injector calls on a thread of its own; each one
//! enters the interpreter through the GIL and starts `pptop.injection`.
//!
//! ## Exports
//!
//! - `__pptop_start_injection` - revision chosen at build time (`revision-v*` feature)
//! - `__pptop_start_injection_v1` - `(library_path, pid, log_path)`
//! - `__pptop_start_injection_v2` - `(library_path, pid, log_path, protocol)`
//! - `__pptop_start_injection_v3` - `(library_path, pid, protocol, log_path)`
//!
//! All return `0` on success, the interpreter's status if the command raised,
//! or a negative `STATUS_*` code from `pptop-inject-common`.
//!
//! ## Build
//!
//! ```bash
//! cargo build -p pptop-shim --release
//! ```
//!
//! No logger is installed here: log records go wherever the host process
//! sends them, which is usually nowhere.

#![allow(unsafe_code)] // C ABI exports

#[cfg(any(
    all(feature = "revision-v1", feature = "revision-v2"),
    all(feature = "revision-v1", feature = "revision-v3"),
    all(feature = "revision-v2", feature = "revision-v3"),
    not(any(feature = "revision-v1", feature = "revision-v2", feature = "revision-v3")),
))]
compile_error!("enable exactly one of the revision-v1, revision-v2, revision-v3 features");

use log::warn;
use pptop_inject::runtime::PythonRuntime;
use pptop_inject::{start_injection, InjectError, InjectionRequest};
use pptop_inject_common::STATUS_PANIC;
use std::ffi::{c_char, c_int, c_uint, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Copy a C path argument into an owned string.
///
/// # Safety
/// `ptr` is null or points to a NUL-terminated string that stays valid for
/// the duration of the call.
unsafe fn path_arg(ptr: *const c_char, name: &str) -> Result<String, InjectError> {
    if ptr.is_null() {
        return Err(InjectError::InvalidArgument(format!("{name} is null")));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(str::to_owned)
        .map_err(|_| InjectError::InvalidArgument(format!("{name} is not valid UTF-8")))
}

/// Decode the arguments, then run one injection against this process's interpreter.
///
/// Panics never cross the C boundary.
fn inject(decode: impl FnOnce() -> Result<InjectionRequest, InjectError>) -> c_int {
    catch_unwind(AssertUnwindSafe(|| {
        let request = match decode() {
            Ok(request) => request,
            Err(e) => {
                warn!("rejected injection call: {e}");
                return e.status_code();
            }
        };
        match PythonRuntime::current() {
            Ok(runtime) => start_injection(&runtime, &request),
            Err(e) => {
                warn!("cannot inject: {e}");
                e.status_code()
            }
        }
    }))
    .unwrap_or(STATUS_PANIC)
}

/// Revision 1 entry point.
///
/// # Safety
/// `library_path` and `log_path` must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn __pptop_start_injection_v1(
    library_path: *const c_char,
    pid: c_uint,
    log_path: *const c_char,
) -> c_int {
    inject(|| {
        Ok(InjectionRequest::V1 {
            library_path: path_arg(library_path, "library path")?,
            process_id: pid,
            log_path: path_arg(log_path, "log path")?,
        })
    })
}

/// Revision 2 entry point.
///
/// # Safety
/// `library_path` and `log_path` must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn __pptop_start_injection_v2(
    library_path: *const c_char,
    pid: c_uint,
    log_path: *const c_char,
    protocol: c_uint,
) -> c_int {
    inject(|| {
        Ok(InjectionRequest::V2 {
            library_path: path_arg(library_path, "library path")?,
            process_id: pid,
            log_path: path_arg(log_path, "log path")?,
            protocol_version: protocol,
        })
    })
}

/// Revision 3 entry point.
///
/// # Safety
/// `library_path` and `log_path` must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn __pptop_start_injection_v3(
    library_path: *const c_char,
    pid: c_uint,
    protocol: c_uint,
    log_path: *const c_char,
) -> c_int {
    inject(|| {
        Ok(InjectionRequest::V3 {
            library_path: path_arg(library_path, "library path")?,
            process_id: pid,
            protocol_version: protocol,
            log_path: path_arg(log_path, "log path")?,
        })
    })
}

/// Entry point resolved by the injector (revision 1 signature).
///
/// # Safety
/// See [`__pptop_start_injection_v1`].
#[cfg(feature = "revision-v1")]
#[no_mangle]
pub unsafe extern "C" fn __pptop_start_injection(
    library_path: *const c_char,
    pid: c_uint,
    log_path: *const c_char,
) -> c_int {
    __pptop_start_injection_v1(library_path, pid, log_path)
}

/// Entry point resolved by the injector (revision 2 signature).
///
/// # Safety
/// See [`__pptop_start_injection_v2`].
#[cfg(feature = "revision-v2")]
#[no_mangle]
pub unsafe extern "C" fn __pptop_start_injection(
    library_path: *const c_char,
    pid: c_uint,
    log_path: *const c_char,
    protocol: c_uint,
) -> c_int {
    __pptop_start_injection_v2(library_path, pid, log_path, protocol)
}

/// Entry point resolved by the injector (revision 3 signature).
///
/// # Safety
/// See [`__pptop_start_injection_v3`].
#[cfg(feature = "revision-v3")]
#[no_mangle]
pub unsafe extern "C" fn __pptop_start_injection(
    library_path: *const c_char,
    pid: c_uint,
    protocol: c_uint,
    log_path: *const c_char,
) -> c_int {
    __pptop_start_injection_v3(library_path, pid, protocol, log_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pptop_inject_common::{STATUS_INVALID_ARGUMENT, STATUS_RUNTIME_UNAVAILABLE};
    use std::ptr;

    // The test binary never initializes an interpreter, so every call that
    // gets past argument decoding stops at the runtime check.

    #[test]
    fn test_null_paths_rejected() {
        let log = c"/tmp/pp.log";
        let status = unsafe { __pptop_start_injection_v1(ptr::null(), 1, log.as_ptr()) };
        assert_eq!(status, STATUS_INVALID_ARGUMENT);

        let lib = c"/opt/pp";
        let status = unsafe { __pptop_start_injection_v3(lib.as_ptr(), 1, 2, ptr::null()) };
        assert_eq!(status, STATUS_INVALID_ARGUMENT);
    }

    #[test]
    fn test_non_utf8_path_rejected() {
        let lib = [b'/', 0xff, 0xfe, 0];
        let log = c"/tmp/pp.log";
        let status =
            unsafe { __pptop_start_injection_v2(lib.as_ptr().cast(), 1, log.as_ptr(), 2) };
        assert_eq!(status, STATUS_INVALID_ARGUMENT);
    }

    #[test]
    fn test_no_interpreter_reported() {
        let lib = c"/opt/pp";
        let log = c"/tmp/pp.log";
        let status = unsafe { __pptop_start_injection_v3(lib.as_ptr(), 4242, 2, log.as_ptr()) };
        assert_eq!(status, STATUS_RUNTIME_UNAVAILABLE);
    }

    #[cfg(feature = "revision-v3")]
    #[test]
    fn test_default_symbol_has_v3_signature() {
        let lib = c"/opt/pp";
        let status = unsafe { __pptop_start_injection(lib.as_ptr(), 4242, 2, ptr::null()) };
        assert_eq!(status, STATUS_INVALID_ARGUMENT);
    }
}
