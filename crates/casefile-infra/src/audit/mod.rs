//! Tracing-backed audit sink
//!
//! Writes one structured event per [`AuditRecord`] on the [`AUDIT_TARGET`]
//! target, so the trail can be routed separately with an `EnvFilter` directive
//! such as `casefile::audit=info`.

use async_trait::async_trait;

use casefile_core::{AuditOutcome, AuditRecord, AuditSink, ErrorMetadata};

pub const AUDIT_TARGET: &str = "casefile::audit";

#[derive(Debug, Clone, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, record: AuditRecord) {
        let recorded_at = record.recorded_at.to_rfc3339();
        match &record.outcome {
            AuditOutcome::Accepted { sanitized_name } => {
                tracing::info!(
                    target: AUDIT_TARGET,
                    original_name = %record.original_name.escape_debug(),
                    declared = %record.declared_mime_type,
                    size_bytes = record.size_bytes,
                    sanitized_name = %sanitized_name,
                    recorded_at = %recorded_at,
                    "Upload accepted"
                );
            }
            AuditOutcome::Rejected { reason } => {
                tracing::warn!(
                    target: AUDIT_TARGET,
                    original_name = %record.original_name.escape_debug(),
                    declared = %record.declared_mime_type,
                    size_bytes = record.size_bytes,
                    error_code = reason.error_code(),
                    reason = %reason,
                    io_failure = record.io_failure,
                    recorded_at = %recorded_at,
                    "Upload rejected"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casefile_core::{FileDescriptor, UploadErrorKind, ValidationOutcome};

    #[tokio::test]
    async fn test_record_does_not_panic_without_subscriber() {
        let file = FileDescriptor::new("a\nb.txt", "text/plain", 3, "/tmp/upload");
        let sink = TracingAuditSink::new();

        sink.record(AuditRecord::from_outcome(
            &file,
            &ValidationOutcome::Rejected {
                reason: UploadErrorKind::InvalidCharacters,
            },
        ))
        .await;
        sink.record(AuditRecord::from_outcome(
            &file,
            &ValidationOutcome::Accepted {
                sanitized_name: "ab-0.txt".to_string(),
            },
        ))
        .await;
    }
}
