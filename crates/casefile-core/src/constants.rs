//! Upload pipeline constants
//!
//! Read windows and input-shape defaults. Size ceilings live in
//! [`crate::config::UploadConfig`] because they are operator-tunable.

/// Bytes read from the head of a file for magic-number verification.
pub const SIGNATURE_WINDOW_BYTES: usize = 512;

/// Bytes read from the head of a file for content scanning.
pub const CONTENT_SCAN_WINDOW_BYTES: usize = 10_000;

/// Maximum length of an original filename, in characters.
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Maximum length of a generated storage name, in bytes.
pub const MAX_STORAGE_NAME_BYTES: usize = 255;

/// Maximum number of percent-decoding passes applied to a filename.
pub const MAX_PERCENT_DECODE_PASSES: usize = 3;

pub const DEFAULT_MAX_FILES_PER_SUBMISSION: usize = 5;
pub const DEFAULT_MAX_FIELDS_PER_SUBMISSION: usize = 10;

pub const DEFAULT_MAX_IMAGE_SIZE_MB: u64 = 5;
pub const DEFAULT_MAX_DOCUMENT_SIZE_MB: u64 = 10;
pub const DEFAULT_MAX_DEFAULT_SIZE_MB: u64 = 2;
