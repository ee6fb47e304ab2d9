//! Error types module
//!
//! This module provides the error taxonomy of the upload acceptance pipeline.
//! Every stage returns an [`UploadErrorKind`]; the orchestrator wraps the first
//! failure of a batch into a [`BatchRejection`](crate::models::BatchRejection).
//!
//! Client-facing messages never describe signature bytes or scanner patterns,
//! only the structured kind and the declared constraints.

use serde::{Deserialize, Serialize};

use crate::models::DeclaredType;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for rejected or suspicious input
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "FILE_TOO_LARGE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Reason a file (or a whole submission) was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UploadErrorKind {
    #[error("Declared type is not allowed: {declared}")]
    UnknownDeclaredType { declared: String },

    #[error("Extension '{extension}' is not allowed for {declared:?}")]
    ExtensionMismatch {
        declared: DeclaredType,
        extension: String,
    },

    #[error("Invalid filename")]
    InvalidFilename,

    #[error("Filename too long: {length} characters (max: {max})")]
    FilenameTooLong { length: usize, max: usize },

    #[error("Filename contains characters outside the allowlist")]
    InvalidCharacters,

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("File content does not match declared type {declared:?}")]
    ContentMismatch { declared: DeclaredType },

    #[error("Malicious content detected: {rule}")]
    MaliciousContent { rule: String },

    #[error("IO failure: {message}")]
    IoFailure { message: String },

    #[error("Too many files: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("Too many form fields: {count} (max: {max})")]
    TooManyFields { count: usize, max: usize },
}

impl UploadErrorKind {
    /// True when the rejection came from the filesystem rather than the content.
    pub fn is_io_failure(&self) -> bool {
        matches!(self, UploadErrorKind::IoFailure { .. })
    }

    pub fn io(err: std::io::Error) -> Self {
        UploadErrorKind::IoFailure {
            message: err.to_string(),
        }
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn upload_error_static_metadata(
    err: &UploadErrorKind,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        UploadErrorKind::UnknownDeclaredType { .. } => (
            415,
            "UNSUPPORTED_FILE_TYPE",
            false,
            Some("Upload one of the allowed file types"),
            false,
            LogLevel::Debug,
        ),
        UploadErrorKind::ExtensionMismatch { .. } => (
            400,
            "EXTENSION_MISMATCH",
            false,
            Some("Make sure the file extension matches the file type"),
            false,
            LogLevel::Debug,
        ),
        UploadErrorKind::InvalidFilename => (
            400,
            "INVALID_FILENAME",
            false,
            Some("Rename the file and try again"),
            false,
            LogLevel::Warn,
        ),
        UploadErrorKind::FilenameTooLong { .. } => (
            400,
            "FILENAME_TOO_LONG",
            false,
            Some("Use a shorter filename"),
            false,
            LogLevel::Debug,
        ),
        UploadErrorKind::InvalidCharacters => (
            400,
            "INVALID_FILENAME_CHARACTERS",
            false,
            Some("Use only letters, digits, spaces, dots, dashes and underscores"),
            false,
            LogLevel::Debug,
        ),
        UploadErrorKind::FileTooLarge { .. } => (
            413,
            "FILE_TOO_LARGE",
            false,
            Some("Reduce the file size and try again"),
            false,
            LogLevel::Debug,
        ),
        UploadErrorKind::ContentMismatch { .. } => (
            400,
            "CONTENT_MISMATCH",
            false,
            Some("Check that the file is not corrupted and has the right type"),
            true,
            LogLevel::Warn,
        ),
        UploadErrorKind::MaliciousContent { .. } => (
            400,
            "MALICIOUS_CONTENT",
            false,
            None,
            true,
            LogLevel::Warn,
        ),
        UploadErrorKind::IoFailure { .. } => (
            500,
            "UPLOAD_IO_FAILURE",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        UploadErrorKind::TooManyFiles { .. } => (
            400,
            "TOO_MANY_FILES",
            false,
            Some("Attach fewer files to the report"),
            false,
            LogLevel::Debug,
        ),
        UploadErrorKind::TooManyFields { .. } => (
            400,
            "TOO_MANY_FIELDS",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
    }
}

impl ErrorMetadata for UploadErrorKind {
    fn http_status_code(&self) -> u16 {
        upload_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        upload_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        upload_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        upload_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        upload_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        upload_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            UploadErrorKind::UnknownDeclaredType { .. } => "File type is not allowed".to_string(),
            UploadErrorKind::ExtensionMismatch { .. } => {
                "File extension does not match the declared file type".to_string()
            }
            UploadErrorKind::InvalidFilename => "Filename is not allowed".to_string(),
            UploadErrorKind::FilenameTooLong { max, .. } => {
                format!("Filename exceeds {} characters", max)
            }
            UploadErrorKind::InvalidCharacters => {
                "Filename contains characters that are not allowed".to_string()
            }
            UploadErrorKind::FileTooLarge { max, .. } => {
                format!("File size exceeds maximum allowed size of {} bytes", max)
            }
            UploadErrorKind::ContentMismatch { .. } => {
                "File content does not match the declared file type".to_string()
            }
            UploadErrorKind::MaliciousContent { .. } => "File content is not allowed".to_string(),
            UploadErrorKind::IoFailure { .. } => "File could not be processed".to_string(),
            UploadErrorKind::TooManyFiles { max, .. } => {
                format!("A report may carry at most {} files", max)
            }
            UploadErrorKind::TooManyFields { max, .. } => {
                format!("A submission may carry at most {} form fields", max)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_file_too_large() {
        let err = UploadErrorKind::FileTooLarge {
            size: 2048,
            max: 1024,
        };
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.error_code(), "FILE_TOO_LARGE");
        assert!(!err.is_recoverable());
        assert!(err.client_message().contains("1024"));
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_malicious_content_hides_rule() {
        let err = UploadErrorKind::MaliciousContent {
            rule: "server_open_tag".to_string(),
        };
        assert_eq!(err.error_code(), "MALICIOUS_CONTENT");
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("server_open_tag"));
        assert!(err.to_string().contains("server_open_tag"));
    }

    #[test]
    fn test_error_metadata_content_mismatch_hides_type_detail() {
        let err = UploadErrorKind::ContentMismatch {
            declared: DeclaredType::Png,
        };
        assert_eq!(err.http_status_code(), 400);
        assert!(!err.client_message().contains("Png"));
    }

    #[test]
    fn test_io_failure_is_flagged() {
        let err = UploadErrorKind::io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(err.is_io_failure());
        assert_eq!(err.http_status_code(), 500);
        assert!(err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Error);
        assert!(!UploadErrorKind::InvalidFilename.is_io_failure());
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let err = UploadErrorKind::FilenameTooLong {
            length: 300,
            max: 255,
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "filename_too_long");
        assert_eq!(json["length"], 300);
    }
}
