//! Per-revision command templates
//!
//! Paths are embedded as single-quoted Python string literals. Rather than
//! escaping, anything that could terminate or alter the literal is rejected
//! before a single byte is written.

use super::buffer::{BoundedBuffer, CommandText};
use crate::domain::{CommandError, InjectionRequest, RequestField};
use log::debug;
use pptop_inject_common::{ProtocolRevision, INJECTION_MODULE, START_OPERATION};
use std::fmt::Write;

/// Reject characters that are significant inside a single-quoted literal.
///
/// Quotes and backslashes would end or escape the literal; control characters
/// (newline, carriage return, NUL, ...) would end the statement or the C string.
///
/// # Errors
/// [`CommandError::UnsafeCharacter`] with the byte offset of the first offender.
pub fn check_literal(field: RequestField, value: &str) -> Result<(), CommandError> {
    match value.char_indices().find(|&(_, ch)| ch == '\'' || ch == '\\' || ch.is_control()) {
        Some((index, ch)) => Err(CommandError::UnsafeCharacter { field, ch, index }),
        None => Ok(()),
    }
}

fn check_request(request: &InjectionRequest) -> Result<(), CommandError> {
    if request.library_path().is_empty() {
        return Err(CommandError::EmptyField(RequestField::LibraryPath));
    }
    check_literal(RequestField::LibraryPath, request.library_path())?;
    check_literal(RequestField::LogPath, request.log_path())
}

/// Build the command text for `request`.
///
/// The result is byte-identical for identical requests.
///
/// # Errors
/// - Empty library path or unsafe characters in either path
/// - Formatted command larger than the revision's buffer
pub fn build_command(request: &InjectionRequest) -> Result<CommandText, CommandError> {
    check_request(request)?;

    let mut buf = BoundedBuffer::new(request.revision());
    let module = INJECTION_MODULE;
    let start = START_OPERATION;

    // Writes into BoundedBuffer never fail; overflow is reported by finish()
    let _ = match request {
        InjectionRequest::V1 { library_path, process_id, log_path } => write!(
            buf,
            "import sys; sys.path.insert(0, '{library_path}');\
             import {module}; {module}.{start}({process_id},'{log_path}')"
        ),
        InjectionRequest::V2 { library_path, process_id, log_path, protocol_version } => write!(
            buf,
            "import sys; sys.path.insert(0, '{library_path}');\
             import {module}; {module}.{start}({process_id},'{log_path}',{protocol_version})"
        ),
        InjectionRequest::V3 { library_path, process_id, protocol_version, log_path } => write!(
            buf,
            "import sys; sys.path.insert(0, '{library_path}') \
             if '{library_path}' not in sys.path else None\n\
             import {module}; {module}.{start}({process_id},{protocol_version},'{log_path}')"
        ),
    };

    let command = buf.finish()?;
    debug!(
        "built {:?} command: {} of {} bytes",
        command.revision(),
        command.len(),
        command.revision().command_capacity()
    );
    Ok(command)
}

/// Longest library path that still fits `revision` with an empty log path.
///
/// For V1 and V2 this is also the combined budget of both paths; V3 spends
/// the library path twice. Assumes the widest rendering of both integers.
#[must_use]
pub fn path_budget(revision: ProtocolRevision) -> usize {
    let widest = InjectionRequest::new(revision, "/", u32::MAX, u32::MAX, "");
    let fixed = match build_command(&widest) {
        Ok(command) => command.len(),
        Err(_) => return 0,
    };
    // V3 repeats the library path in the membership test
    let lib_copies = if revision.idempotent_path_insert() { 2 } else { 1 };
    revision.max_command_len().saturating_sub(fixed - lib_copies) / lib_copies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v1_matches_reference_command() {
        let req = InjectionRequest::new(ProtocolRevision::V1, "/opt/pp", 4242, 0, "/tmp/pp.log");
        let command = build_command(&req).unwrap();
        assert_eq!(
            command.as_str(),
            "import sys; sys.path.insert(0, '/opt/pp');\
             import pptop.injection; pptop.injection.start(4242,'/tmp/pp.log')"
        );
    }

    #[test]
    fn test_v2_appends_protocol() {
        let req = InjectionRequest::new(ProtocolRevision::V2, "/opt/pp", 4242, 2, "/tmp/pp.log");
        let command = build_command(&req).unwrap();
        assert!(command.as_str().ends_with("pptop.injection.start(4242,'/tmp/pp.log',2)"));
        assert_eq!(command.as_str().lines().count(), 1);
    }

    #[test]
    fn test_v3_is_two_lines_with_guard() {
        let req = InjectionRequest::new(ProtocolRevision::V3, "/opt/pp", 4242, 2, "/tmp/pp.log");
        let command = build_command(&req).unwrap();
        let lines: Vec<&str> = command.as_str().lines().collect();
        assert_eq!(
            lines,
            vec![
                "import sys; sys.path.insert(0, '/opt/pp') if '/opt/pp' not in sys.path else None",
                "import pptop.injection; pptop.injection.start(4242,2,'/tmp/pp.log')",
            ]
        );
    }

    #[test]
    fn test_empty_log_path_is_allowed() {
        let req = InjectionRequest::new(ProtocolRevision::V1, "/opt/pp", 1, 0, "");
        assert!(build_command(&req).unwrap().as_str().ends_with("start(1,'')"));
    }

    #[test]
    fn test_empty_library_path_rejected() {
        let req = InjectionRequest::new(ProtocolRevision::V3, "", 1, 2, "/tmp/x");
        assert_eq!(build_command(&req), Err(CommandError::EmptyField(RequestField::LibraryPath)));
    }

    #[test]
    fn test_quote_in_log_path_rejected() {
        let req = InjectionRequest::new(ProtocolRevision::V3, "/opt/pp", 1, 2, "/tmp/a'b.log");
        assert_eq!(
            build_command(&req),
            Err(CommandError::UnsafeCharacter { field: RequestField::LogPath, ch: '\'', index: 6 })
        );
    }

    #[test]
    fn test_newline_in_log_path_rejected() {
        let req = InjectionRequest::new(ProtocolRevision::V1, "/opt/pp", 1, 0, "/tmp/x\nimport os");
        assert!(matches!(
            build_command(&req),
            Err(CommandError::UnsafeCharacter { field: RequestField::LogPath, ch: '\n', .. })
        ));
    }

    #[test]
    fn test_backslash_and_nul_in_library_path_rejected() {
        for bad in ["/opt/p\\p", "/opt/p\0p", "/opt/p\rp"] {
            let req = InjectionRequest::new(ProtocolRevision::V2, bad, 1, 2, "/tmp/x");
            assert!(matches!(
                build_command(&req),
                Err(CommandError::UnsafeCharacter { field: RequestField::LibraryPath, .. })
            ));
        }
    }

    #[test]
    fn test_nul_in_log_path_is_unsafe_character() {
        let req = InjectionRequest::new(ProtocolRevision::V3, "/opt/pp", 1, 2, "/tmp/a\0b");
        assert_eq!(
            build_command(&req).unwrap_err(),
            CommandError::UnsafeCharacter { field: RequestField::LogPath, ch: '\0', index: 6 }
        );
    }

    #[test]
    fn test_non_ascii_paths_are_fine() {
        let req = InjectionRequest::new(ProtocolRevision::V3, "/opt/pptöp", 1, 2, "/tmp/лог");
        assert!(build_command(&req).is_ok());
    }

    #[test]
    fn test_long_log_path_fails_cleanly() {
        let long = format!("/tmp/{}", "x".repeat(1100));
        let req = InjectionRequest::new(ProtocolRevision::V2, "/opt/pp", 1, 2, long);
        assert!(matches!(
            build_command(&req),
            Err(CommandError::TooLong { capacity: 1024, .. })
        ));
    }

    #[test]
    fn test_path_budget_is_tight() {
        for revision in ProtocolRevision::ALL {
            let budget = path_budget(revision);
            let lib = format!("/{}", "l".repeat(budget - 1));
            let fits = InjectionRequest::new(revision, lib.clone(), u32::MAX, u32::MAX, "");
            assert!(build_command(&fits).is_ok(), "{revision:?} budget {budget} should fit");

            let over = InjectionRequest::new(revision, format!("{lib}l"), u32::MAX, u32::MAX, "");
            assert!(build_command(&over).is_err(), "{revision:?} budget {budget} is not tight");
        }
    }
}
