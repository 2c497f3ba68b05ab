//! Pre-flight checks for pptop-inject
//!
//! Validates an injection request on the injector's side, before the shim is
//! loaded into anything. Provides clear, actionable error messages instead of
//! the bare non-zero status the shim would return.

#![allow(unsafe_code)] // access() requires unsafe

use crate::command::build_command;
use crate::domain::InjectionRequest;
use anyhow::{bail, Context, Result};
use pptop_inject_common::INJECTION_MODULE;
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// Run all pre-flight checks for `request`, returning the command length
pub fn run_preflight_checks(request: &InjectionRequest, quiet: bool) -> Result<usize> {
    let length = check_command_fits(request)?;
    check_library_path(Path::new(request.library_path()), quiet)?;
    check_log_sink(request.log_path())?;
    Ok(length)
}

/// Check that the request renders within its revision's buffer
pub fn check_command_fits(request: &InjectionRequest) -> Result<usize> {
    let command = build_command(request).with_context(|| {
        format!("Request cannot be sent with protocol revision {}", request.revision().as_u32())
    })?;
    Ok(command.len())
}

/// Locate the injection package below `library_path`, if it is there
#[must_use]
pub fn find_injection_module(library_path: &Path) -> Option<PathBuf> {
    let relative: PathBuf = INJECTION_MODULE.split('.').collect();
    let module = library_path.join(&relative).with_extension("py");
    if module.is_file() {
        return Some(module);
    }
    let package = library_path.join(relative).join("__init__.py");
    package.is_file().then_some(package)
}

/// Check that the library path is a directory, ideally holding the injection package
fn check_library_path(library_path: &Path, quiet: bool) -> Result<()> {
    if !library_path.exists() {
        bail!(
            "Library path not found: {}\n\n\
             It is prepended to sys.path in the target process and must exist there.",
            library_path.display()
        );
    }
    if !library_path.is_dir() {
        bail!(
            "Not a directory: {}\n\n\
             The library path must be the directory that contains the '{}' package.",
            library_path.display(),
            INJECTION_MODULE.split('.').next().unwrap_or(INJECTION_MODULE)
        );
    }
    if !quiet && find_injection_module(library_path).is_none() {
        eprintln!(
            "warning: {INJECTION_MODULE} not found under {}, the target must import it from elsewhere",
            library_path.display()
        );
    }
    Ok(())
}

/// Check that the injection module will be able to write its log
fn check_log_sink(log_path: &str) -> Result<()> {
    // Empty log path disables logging in the injection module
    if log_path.is_empty() {
        return Ok(());
    }

    let path = Path::new(log_path);
    if path.is_dir() {
        bail!("Log path is a directory: {log_path}");
    }

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        bail!(
            "Log directory not found: {}\n\n\
             Create it first, the injection module does not create directories.",
            parent.display()
        );
    }

    let c_parent = CString::new(parent.as_os_str().as_bytes())
        .with_context(|| format!("Invalid log directory: {}", parent.display()))?;
    if unsafe { libc::access(c_parent.as_ptr(), libc::W_OK) } != 0 {
        bail!(
            "Log directory not writable: {}\n\n\
             The target process writes the log, so it needs write access here.",
            parent.display()
        );
    }
    Ok(())
}
