//! Fixed-capacity command buffer

use crate::domain::CommandError;
use pptop_inject_common::ProtocolRevision;
use std::ffi::{CStr, CString};
use std::fmt;

/// Write sink that never grows past its limit.
///
/// Writes past the limit are dropped but still counted, so an overflow can be
/// reported with the exact size the command would have needed.
pub(crate) struct BoundedBuffer {
    revision: ProtocolRevision,
    text: String,
    required: usize,
}

impl BoundedBuffer {
    pub(crate) fn new(revision: ProtocolRevision) -> Self {
        Self { revision, text: String::with_capacity(revision.max_command_len()), required: 0 }
    }

    pub(crate) fn finish(self) -> Result<CommandText, CommandError> {
        if self.required > self.revision.max_command_len() {
            return Err(CommandError::TooLong {
                revision: self.revision,
                capacity: self.revision.command_capacity(),
                // terminator included, to compare against `capacity`
                required: self.required + 1,
            });
        }
        let text = CString::new(self.text)
            .map_err(|e| CommandError::InteriorNul { index: e.nul_position() })?;
        Ok(CommandText { revision: self.revision, text })
    }
}

impl fmt::Write for BoundedBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.required += s.len();
        if self.required <= self.revision.max_command_len() {
            self.text.push_str(s);
        }
        Ok(())
    }
}

/// Complete, NUL-terminated command ready for evaluation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandText {
    revision: ProtocolRevision,
    text: CString,
}

impl CommandText {
    #[must_use]
    pub fn revision(&self) -> ProtocolRevision {
        self.revision
    }

    #[must_use]
    pub fn as_c_str(&self) -> &CStr {
        &self.text
    }

    /// Command source. Always valid UTF-8 since it is built from `&str` pieces.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.text.to_str().unwrap_or_default()
    }

    /// Length in bytes, terminator excluded
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.as_bytes().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for CommandText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    #[test]
    fn test_fits_exactly() {
        let mut buf = BoundedBuffer::new(ProtocolRevision::V2);
        buf.write_str(&"a".repeat(1023)).unwrap();
        let text = buf.finish().expect("1023 bytes fit a 1024 byte buffer");
        assert_eq!(text.len(), 1023);
    }

    #[test]
    fn test_one_byte_over() {
        let mut buf = BoundedBuffer::new(ProtocolRevision::V2);
        buf.write_str(&"a".repeat(1000)).unwrap();
        buf.write_str(&"b".repeat(24)).unwrap();
        let err = buf.finish().unwrap_err();
        assert_eq!(
            err,
            CommandError::TooLong { revision: ProtocolRevision::V2, capacity: 1024, required: 1025 }
        );
    }

    #[test]
    fn test_v1_has_larger_buffer() {
        let mut buf = BoundedBuffer::new(ProtocolRevision::V1);
        buf.write_str(&"a".repeat(2000)).unwrap();
        assert!(buf.finish().is_ok());
    }

    #[test]
    fn test_never_grows() {
        let mut buf = BoundedBuffer::new(ProtocolRevision::V3);
        let capacity = buf.text.capacity();
        for _ in 0..100 {
            buf.write_str(&"x".repeat(100)).unwrap();
        }
        assert_eq!(buf.text.capacity(), capacity);
        assert_eq!(buf.required, 10_000);
    }

    #[test]
    fn test_interior_nul_caught_at_conversion() {
        let mut buf = BoundedBuffer::new(ProtocolRevision::V3);
        buf.write_str("print(1)\0").unwrap();
        assert_eq!(buf.finish().unwrap_err(), CommandError::InteriorNul { index: 8 });
    }
}
