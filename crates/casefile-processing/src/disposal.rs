//! Disposal of rejected uploads
//!
//! Removing a file that is already gone counts as success, so cleanup can run
//! again after a partial failure.

use async_trait::async_trait;
use std::path::Path;

use casefile_core::UploadErrorKind;

/// Removes a materialized upload from temporary storage
#[async_trait]
pub trait Disposer: Send + Sync {
    async fn dispose(&self, storage_path: &Path) -> Result<(), UploadErrorKind>;
}

/// Local filesystem disposer
#[derive(Debug, Clone, Default)]
pub struct LocalDisposer;

#[async_trait]
impl Disposer for LocalDisposer {
    async fn dispose(&self, storage_path: &Path) -> Result<(), UploadErrorKind> {
        let start = std::time::Instant::now();

        match tokio::fs::remove_file(storage_path).await {
            Ok(()) => {
                tracing::debug!(
                    path = %storage_path.display(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Disposed rejected upload"
                );
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    path = %storage_path.display(),
                    "Upload already absent, nothing to dispose"
                );
                Ok(())
            }
            Err(e) => Err(UploadErrorKind::io(e)),
        }
    }
}
