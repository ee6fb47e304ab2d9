//! Helpers for the `casefile-validate` binary: descriptor construction from
//! local paths and report rendering.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use casefile_core::{
    AcceptedFile, BatchRejection, DeclaredType, FileDescriptor, UploadErrorKind,
};
use casefile_infra::{init_telemetry, ErrorResponse, TelemetryFormat};

/// Declared type used when none is given and the extension is unknown.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing(json: bool, environment: &str) {
    let format = if json {
        TelemetryFormat::Json
    } else {
        TelemetryFormat::Pretty
    };
    if let Err(e) = init_telemetry(format, environment) {
        eprintln!("Failed to initialize tracing: {}", e);
    }
}

/// Declared MIME type for a local file: the override if given, otherwise a
/// guess from the extension.
pub fn declared_type_for(path: &Path, declared_override: Option<&str>) -> String {
    if let Some(declared) = declared_override {
        return declared.to_string();
    }
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(DeclaredType::from_extension)
        .map(|t| t.mime_type().to_string())
        .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string())
}

/// Describe a local file as an upload that is already materialized in place.
pub async fn describe_file(path: &Path, declared_override: Option<&str>) -> Result<FileDescriptor> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Failed to read metadata for {}", path.display()))?;
    if !metadata.is_file() {
        anyhow::bail!("{} is not a regular file", path.display());
    }

    let original_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    Ok(FileDescriptor::new(
        original_name,
        declared_type_for(path, declared_override),
        metadata.len(),
        path,
    ))
}

/// Per-file line of a report
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    pub original_name: String,
    pub declared_mime_type: String,
    pub size_bytes: u64,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitized_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<UploadErrorKind>,
}

impl FileReport {
    pub fn new(file: &FileDescriptor, result: &Result<AcceptedFile, UploadErrorKind>) -> Self {
        let (sanitized_name, reason) = match result {
            Ok(accepted) => (Some(accepted.sanitized_name.clone()), None),
            Err(reason) => (None, Some(reason.clone())),
        };
        Self {
            path: file.storage_path.display().to_string(),
            original_name: file.original_name.clone(),
            declared_mime_type: file.declared_mime_type.clone(),
            size_bytes: file.size_bytes,
            accepted: result.is_ok(),
            sanitized_name,
            reason,
        }
    }
}

/// Whole-batch report
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub accepted: bool,
    pub files: Vec<FileReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<ErrorResponse>,
}

impl BatchReport {
    pub fn new(
        files: Vec<FileReport>,
        decision: &Result<Vec<AcceptedFile>, BatchRejection>,
        is_production: bool,
    ) -> Self {
        Self {
            accepted: decision.is_ok(),
            files,
            rejection: decision
                .as_ref()
                .err()
                .map(|rejection| ErrorResponse::from_error(rejection, is_production)),
        }
    }
}

pub fn print_report_table(report: &BatchReport) {
    println!("\n=== Upload Validation ===\n");

    if report.files.is_empty() {
        println!("No files given.");
    } else {
        println!(
            "{:<30} {:<24} {:>10} {:<8} {:<40}",
            "File", "Declared Type", "Size", "Status", "Detail"
        );
        println!("{}", "-".repeat(116));

        for file in &report.files {
            let (status, detail) = match (&file.sanitized_name, &file.reason) {
                (Some(name), _) => ("ok", name.clone()),
                (None, Some(reason)) => ("rejected", reason.to_string()),
                (None, None) => ("rejected", String::new()),
            };
            println!(
                "{:<30} {:<24} {:>10} {:<8} {:<40}",
                truncate_string(&file.original_name, 30),
                truncate_string(&file.declared_mime_type, 24),
                file.size_bytes,
                status,
                truncate_string(&detail, 40)
            );
        }
    }

    match &report.rejection {
        None => println!("\nBatch accepted."),
        Some(rejection) => println!("\nBatch rejected: {}", rejection.error),
    }
}
