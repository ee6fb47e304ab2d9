use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::UploadErrorKind;
use crate::models::{FileDescriptor, ValidationOutcome};

/// Audit outcome for a single validated file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AuditOutcome {
    Accepted { sanitized_name: String },
    Rejected { reason: UploadErrorKind },
}

/// Append-only audit entry, one per validated file.
///
/// `io_failure` separates filesystem trouble from content rejections so
/// operators can triage without parsing the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub original_name: String,
    pub declared_mime_type: String,
    pub size_bytes: u64,
    pub outcome: AuditOutcome,
    pub io_failure: bool,
    pub recorded_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn from_outcome(file: &FileDescriptor, outcome: &ValidationOutcome) -> Self {
        let (outcome, io_failure) = match outcome {
            ValidationOutcome::Accepted { sanitized_name } => (
                AuditOutcome::Accepted {
                    sanitized_name: sanitized_name.clone(),
                },
                false,
            ),
            ValidationOutcome::Rejected { reason } => (
                AuditOutcome::Rejected {
                    reason: reason.clone(),
                },
                reason.is_io_failure(),
            ),
        };

        Self {
            original_name: file.original_name.clone(),
            declared_mime_type: file.declared_mime_type.clone(),
            size_bytes: file.size_bytes,
            outcome,
            io_failure,
            recorded_at: Utc::now(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self.outcome, AuditOutcome::Accepted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> FileDescriptor {
        FileDescriptor::new("notes.txt", "text/plain", 12, "/tmp/upload-1")
    }

    #[test]
    fn test_record_from_accepted_outcome() {
        let record = AuditRecord::from_outcome(
            &descriptor(),
            &ValidationOutcome::Accepted {
                sanitized_name: "notes-abc.txt".to_string(),
            },
        );
        assert!(record.is_accepted());
        assert!(!record.io_failure);
        assert_eq!(record.original_name, "notes.txt");
    }

    #[test]
    fn test_record_flags_io_failure() {
        let record = AuditRecord::from_outcome(
            &descriptor(),
            &ValidationOutcome::Rejected {
                reason: UploadErrorKind::IoFailure {
                    message: "permission denied".to_string(),
                },
            },
        );
        assert!(!record.is_accepted());
        assert!(record.io_failure);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["outcome"]["status"], "rejected");
        assert_eq!(json["outcome"]["reason"]["kind"], "io_failure");
    }
}
