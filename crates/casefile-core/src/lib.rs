//! Casefile Core Library
//!
//! This crate provides the upload domain models, error types and configuration
//! shared across all Casefile components.

pub mod config;
pub mod constants;
pub mod error;
pub mod hooks;
pub mod models;

// Re-export commonly used types
pub use config::{SizeLimits, UploadConfig};
pub use error::{ErrorMetadata, LogLevel, UploadErrorKind};
pub use hooks::{AuditSink, NoOpAuditSink, RecordingAuditSink};
pub use models::{
    AcceptedFile, AuditOutcome, AuditRecord, BatchRejection, ContentCategory,
    DeclaredConstraints, DeclaredType, FileDescriptor, SanitizedName, SizeClass,
    ValidationOutcome,
};
