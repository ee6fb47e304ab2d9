//! Test helpers: pipeline construction and a scratch upload directory.
//!
//! Run from workspace root: `cargo test -p casefile-processing --test batch_test`.

#![allow(dead_code)]

pub mod fixtures;

use std::path::PathBuf;
use std::sync::Arc;

use casefile_core::{FileDescriptor, RecordingAuditSink, SizeLimits, UploadConfig};
use casefile_processing::UploadPipeline;
use tempfile::TempDir;
use uuid::Uuid;

/// Pipeline wired to an in-memory audit sink, plus the temp dir that holds
/// materialized uploads.
pub struct TestPipeline {
    pub pipeline: UploadPipeline,
    pub audit: Arc<RecordingAuditSink>,
    pub _temp_dir: TempDir,
    upload_dir: PathBuf,
}

impl TestPipeline {
    /// Write `data` to a fresh storage path and describe it as an upload.
    pub async fn upload(&self, original_name: &str, mime: &str, data: &[u8]) -> FileDescriptor {
        let path = self
            .upload_dir
            .join(format!("upload-{}", Uuid::new_v4().simple()));
        tokio::fs::write(&path, data)
            .await
            .expect("Failed to write upload fixture");
        FileDescriptor::new(original_name, mime, data.len() as u64, path)
    }
}

/// Small ceilings so size scenarios stay cheap.
pub fn test_config() -> UploadConfig {
    UploadConfig {
        size_limits: SizeLimits {
            image: 4 * 1024,
            document: 8 * 1024,
            default: 1024,
        },
        ..UploadConfig::default()
    }
}

pub fn setup_pipeline() -> TestPipeline {
    setup_pipeline_with(test_config())
}

pub fn setup_pipeline_with(config: UploadConfig) -> TestPipeline {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let upload_dir = temp_dir.path().to_path_buf();
    let audit = Arc::new(RecordingAuditSink::new());
    let pipeline = UploadPipeline::new(&config)
        .expect("Failed to build pipeline")
        .with_audit_sink(audit.clone());

    TestPipeline {
        pipeline,
        audit,
        _temp_dir: temp_dir,
        upload_dir,
    }
}
