//! Upload pipeline: policy → filename → size → signature → content scan.
//!
//! Every file of a submission runs through the same stage sequence. Stages are
//! ordered by cost so a file rejected on metadata never has its bytes read.
//! A batch is decided only after all files have been validated: one failure
//! rejects the whole submission and every file in it is disposed of.

use anyhow::{Context, Result};
use futures::future::join_all;
use std::sync::Arc;

use casefile_core::{
    AcceptedFile, AuditRecord, AuditSink, BatchRejection, ErrorMetadata, FileDescriptor, LogLevel,
    NoOpAuditSink, UploadConfig, UploadErrorKind, ValidationOutcome,
};

use crate::disposal::{Disposer, LocalDisposer};
use crate::filename::sanitize_filename;
use crate::policy::PolicyTable;
use crate::scanner::ContentScanner;
use crate::signature::SignatureTable;

/// Behaviour switches for [`UploadPipeline`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Remove every file of a rejected batch from temporary storage.
    pub dispose_rejected: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            dispose_rejected: true,
        }
    }
}

/// Upload acceptance pipeline
///
/// Tables and scanner rules are immutable and shared, so a single pipeline can
/// serve concurrent submissions.
#[derive(Clone)]
pub struct UploadPipeline {
    policy: Arc<PolicyTable>,
    signatures: Arc<SignatureTable>,
    scanner: Arc<ContentScanner>,
    disposer: Arc<dyn Disposer>,
    audit: Arc<dyn AuditSink>,
    options: PipelineOptions,
}

impl UploadPipeline {
    /// Build a pipeline from configuration with the built-in signature table,
    /// local disposal and no audit sink.
    pub fn new(config: &UploadConfig) -> Result<Self> {
        let scanner = ContentScanner::new().context("Failed to compile content scanning rules")?;
        Ok(Self::from_parts(
            PolicyTable::from_config(config),
            SignatureTable::builtin(),
            scanner,
        ))
    }

    pub fn from_parts(
        policy: PolicyTable,
        signatures: SignatureTable,
        scanner: ContentScanner,
    ) -> Self {
        Self {
            policy: Arc::new(policy),
            signatures: Arc::new(signatures),
            scanner: Arc::new(scanner),
            disposer: Arc::new(LocalDisposer),
            audit: Arc::new(NoOpAuditSink),
            options: PipelineOptions::default(),
        }
    }

    pub fn with_disposer(mut self, disposer: Arc<dyn Disposer>) -> Self {
        self.disposer = disposer;
        self
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn policy(&self) -> &PolicyTable {
        &self.policy
    }

    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    /// Run every stage on one file and record the outcome.
    pub async fn validate_file(&self, file: &FileDescriptor) -> ValidationOutcome {
        match self.evaluate(file).await {
            Ok(accepted) => ValidationOutcome::Accepted {
                sanitized_name: accepted.sanitized_name,
            },
            Err(reason) => ValidationOutcome::Rejected { reason },
        }
    }

    /// Validate every file of a submission concurrently.
    ///
    /// Results come back in submission order. Nothing is disposed here; see
    /// [`UploadPipeline::decide`].
    pub async fn validate_batch(
        &self,
        files: &[FileDescriptor],
    ) -> Vec<Result<AcceptedFile, UploadErrorKind>> {
        join_all(files.iter().map(|file| self.evaluate(file))).await
    }

    /// Accept or reject a validated batch as a unit.
    ///
    /// On rejection every file of the batch, including those that passed, is
    /// disposed of (when enabled) and the first failure in submission order is
    /// returned.
    pub async fn decide(
        &self,
        files: &[FileDescriptor],
        results: Vec<Result<AcceptedFile, UploadErrorKind>>,
    ) -> Result<Vec<AcceptedFile>, BatchRejection> {
        let mut accepted = Vec::with_capacity(results.len());
        let mut first_failure = None;

        for (file, result) in files.iter().zip(results) {
            match result {
                Ok(file) => accepted.push(file),
                Err(kind) => {
                    if first_failure.is_none() {
                        first_failure = Some((kind, file.original_name.clone()));
                    }
                }
            }
        }

        let Some((kind, original_name)) = first_failure else {
            tracing::info!(
                file_count = accepted.len(),
                "Upload batch accepted"
            );
            return Ok(accepted);
        };

        tracing::warn!(
            file_count = files.len(),
            error_code = kind.error_code(),
            "Upload batch rejected"
        );

        if self.options.dispose_rejected {
            self.dispose_all(files).await;
        }

        Err(BatchRejection {
            kind,
            original_name,
            constraints: self.policy.constraints(),
        })
    }

    /// Validate and decide a whole submission.
    pub async fn process(
        &self,
        files: Vec<FileDescriptor>,
    ) -> Result<Vec<AcceptedFile>, BatchRejection> {
        let results = self.validate_batch(&files).await;
        self.decide(&files, results).await
    }

    async fn evaluate(&self, file: &FileDescriptor) -> Result<AcceptedFile, UploadErrorKind> {
        let result = self.run_stages(file).await;

        let outcome = match &result {
            Ok(accepted) => ValidationOutcome::Accepted {
                sanitized_name: accepted.sanitized_name.clone(),
            },
            Err(reason) => {
                log_rejection(file, reason);
                ValidationOutcome::Rejected {
                    reason: reason.clone(),
                }
            }
        };
        self.audit
            .record(AuditRecord::from_outcome(file, &outcome))
            .await;

        result
    }

    async fn run_stages(&self, file: &FileDescriptor) -> Result<AcceptedFile, UploadErrorKind> {
        let entry = self.policy.lookup(&file.declared_mime_type).ok_or_else(|| {
            UploadErrorKind::UnknownDeclaredType {
                declared: file.declared_mime_type.clone(),
            }
        })?;
        let declared = entry.declared_type;
        self.policy.check_extension(entry, &file.original_name)?;

        let sanitized = sanitize_filename(&file.original_name)?;

        let max = self.policy.size_limit_for(entry.size_class);
        if file.size_bytes > max {
            return Err(UploadErrorKind::FileTooLarge {
                size: file.size_bytes,
                max,
            });
        }

        self.signatures
            .verify(&file.storage_path, declared)
            .await?;
        self.scanner.scan(&file.storage_path, declared).await?;

        tracing::debug!(
            declared = %declared,
            size_bytes = file.size_bytes,
            storage_name = %sanitized,
            "Upload passed all checks"
        );

        Ok(AcceptedFile {
            sanitized_name: sanitized.into_string(),
            declared_mime_type: declared,
            size_bytes: file.size_bytes,
            storage_path: file.storage_path.clone(),
        })
    }

    async fn dispose_all(&self, files: &[FileDescriptor]) {
        let results = join_all(
            files
                .iter()
                .map(|file| self.disposer.dispose(&file.storage_path)),
        )
        .await;

        for (file, result) in files.iter().zip(results) {
            if let Err(e) = result {
                tracing::warn!(
                    error = %e,
                    path = %file.storage_path.display(),
                    "Failed to dispose rejected upload"
                );
            }
        }
    }
}

fn log_rejection(file: &FileDescriptor, reason: &UploadErrorKind) {
    let error_code = reason.error_code();
    match reason.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %reason, error_code, declared = %file.declared_mime_type, "Upload rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %reason, error_code, declared = %file.declared_mime_type, "Upload rejected");
        }
        LogLevel::Error => {
            tracing::error!(error = %reason, error_code, declared = %file.declared_mime_type, "Upload rejected");
        }
    }
}
