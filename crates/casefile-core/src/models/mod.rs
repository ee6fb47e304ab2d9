//! Data models for the upload pipeline
//!
//! `upload` holds the descriptor/outcome types the pipeline consumes and
//! produces; `audit` holds the side-channel record emitted per file.

mod audit;
mod upload;

pub use audit::{AuditOutcome, AuditRecord};
pub use upload::{
    AcceptedFile, BatchRejection, ContentCategory, DeclaredConstraints, DeclaredType,
    FileDescriptor, SanitizedName, SizeClass, ValidationOutcome,
};
