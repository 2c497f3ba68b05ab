//! Injection requests, one variant per protocol revision
//!
//! Field order inside each variant mirrors the C signature of that revision.

use pptop_inject_common::ProtocolRevision;
use serde::{Deserialize, Serialize};

/// Parameters handed to the entry point by the injector
///
/// Nothing here is validated against the target process: `process_id` and
/// `protocol_version` are forwarded verbatim to `pptop.injection.start`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "revision", rename_all = "lowercase")]
pub enum InjectionRequest {
    V1 {
        library_path: String,
        process_id: u32,
        log_path: String,
    },
    V2 {
        library_path: String,
        process_id: u32,
        log_path: String,
        protocol_version: u32,
    },
    V3 {
        library_path: String,
        process_id: u32,
        protocol_version: u32,
        log_path: String,
    },
}

impl InjectionRequest {
    /// Build a request for `revision`.
    ///
    /// `protocol_version` is ignored for [`ProtocolRevision::V1`].
    pub fn new(
        revision: ProtocolRevision,
        library_path: impl Into<String>,
        process_id: u32,
        protocol_version: u32,
        log_path: impl Into<String>,
    ) -> Self {
        let library_path = library_path.into();
        let log_path = log_path.into();
        match revision {
            ProtocolRevision::V1 => InjectionRequest::V1 { library_path, process_id, log_path },
            ProtocolRevision::V2 => {
                InjectionRequest::V2 { library_path, process_id, log_path, protocol_version }
            }
            ProtocolRevision::V3 => {
                InjectionRequest::V3 { library_path, process_id, protocol_version, log_path }
            }
        }
    }

    #[must_use]
    pub fn revision(&self) -> ProtocolRevision {
        match self {
            InjectionRequest::V1 { .. } => ProtocolRevision::V1,
            InjectionRequest::V2 { .. } => ProtocolRevision::V2,
            InjectionRequest::V3 { .. } => ProtocolRevision::V3,
        }
    }

    #[must_use]
    pub fn library_path(&self) -> &str {
        match self {
            InjectionRequest::V1 { library_path, .. }
            | InjectionRequest::V2 { library_path, .. }
            | InjectionRequest::V3 { library_path, .. } => library_path,
        }
    }

    #[must_use]
    pub fn log_path(&self) -> &str {
        match self {
            InjectionRequest::V1 { log_path, .. }
            | InjectionRequest::V2 { log_path, .. }
            | InjectionRequest::V3 { log_path, .. } => log_path,
        }
    }

    #[must_use]
    pub fn process_id(&self) -> u32 {
        match self {
            InjectionRequest::V1 { process_id, .. }
            | InjectionRequest::V2 { process_id, .. }
            | InjectionRequest::V3 { process_id, .. } => *process_id,
        }
    }

    /// Protocol version, absent for revision 1
    #[must_use]
    pub fn protocol_version(&self) -> Option<u32> {
        match self {
            InjectionRequest::V1 { .. } => None,
            InjectionRequest::V2 { protocol_version, .. }
            | InjectionRequest::V3 { protocol_version, .. } => Some(*protocol_version),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_selects_variant() {
        let req = InjectionRequest::new(ProtocolRevision::V3, "/opt/pp", 4242, 2, "/tmp/pp.log");
        assert_eq!(req.revision(), ProtocolRevision::V3);
        assert_eq!(req.library_path(), "/opt/pp");
        assert_eq!(req.process_id(), 4242);
        assert_eq!(req.protocol_version(), Some(2));
        assert_eq!(req.log_path(), "/tmp/pp.log");
    }

    #[test]
    fn test_v1_has_no_protocol() {
        let req = InjectionRequest::new(ProtocolRevision::V1, "/opt/pp", 1, 9, "");
        assert_eq!(req.protocol_version(), None);
    }

    #[test]
    fn test_request_file_format() {
        let json = r#"{"revision":"v2","library_path":"/opt/pp","process_id":7,"log_path":"/tmp/x.log","protocol_version":3}"#;
        let req: InjectionRequest = serde_json::from_str(json).expect("valid request");
        assert_eq!(
            req,
            InjectionRequest::V2 {
                library_path: "/opt/pp".to_string(),
                process_id: 7,
                log_path: "/tmp/x.log".to_string(),
                protocol_version: 3,
            }
        );
    }

    #[test]
    fn test_request_file_requires_every_field() {
        let json = r#"{"revision":"v3","library_path":"/opt/pp","process_id":7,"log_path":"/tmp/x.log"}"#;
        assert!(serde_json::from_str::<InjectionRequest>(json).is_err());
    }
}
