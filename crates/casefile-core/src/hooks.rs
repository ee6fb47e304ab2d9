//! Hooks for the audit collaborator
//!
//! The pipeline emits one [`AuditRecord`] per validated file through the
//! [`AuditSink`] trait. The append-only trail itself lives outside this
//! workspace; `casefile-infra` ships a tracing-backed sink.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::models::AuditRecord;

/// Receiver of per-file audit records
///
/// Implementations must not fail the upload: recording is best-effort and
/// errors are handled inside the sink.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, record: AuditRecord);
}

/// No-op implementation for when auditing is disabled
pub struct NoOpAuditSink;

#[async_trait]
impl AuditSink for NoOpAuditSink {
    async fn record(&self, _record: AuditRecord) {}
}

/// Keeps records in memory, in arrival order
#[derive(Default)]
pub struct RecordingAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl RecordingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn record(&self, record: AuditRecord) {
        match self.records.lock() {
            Ok(mut records) => records.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }
    }
}
