//! Configuration module
//!
//! Upload acceptance settings: the declared-type allowlist, per-size-class
//! byte ceilings and the input-shape limits of a submission. Loaded once at
//! start-up and shared read-only afterwards.

use serde::{Deserialize, Serialize};
use std::env;

use crate::constants::{
    DEFAULT_MAX_DEFAULT_SIZE_MB, DEFAULT_MAX_DOCUMENT_SIZE_MB, DEFAULT_MAX_FIELDS_PER_SUBMISSION,
    DEFAULT_MAX_FILES_PER_SUBMISSION, DEFAULT_MAX_IMAGE_SIZE_MB,
};
use crate::error::UploadErrorKind;
use crate::models::{DeclaredType, SizeClass};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Byte ceiling per size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeLimits {
    pub image: u64,
    pub document: u64,
    pub default: u64,
}

impl SizeLimits {
    pub fn for_class(&self, class: SizeClass) -> u64 {
        match class {
            SizeClass::Image => self.image,
            SizeClass::Document => self.document,
            SizeClass::Default => self.default,
        }
    }
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            image: DEFAULT_MAX_IMAGE_SIZE_MB * BYTES_PER_MB,
            document: DEFAULT_MAX_DOCUMENT_SIZE_MB * BYTES_PER_MB,
            default: DEFAULT_MAX_DEFAULT_SIZE_MB * BYTES_PER_MB,
        }
    }
}

/// Upload acceptance configuration
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub allowed_types: Vec<DeclaredType>,
    pub size_limits: SizeLimits,
    pub max_files_per_submission: usize,
    pub max_fields_per_submission: usize,
    pub environment: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_types: DeclaredType::ALL.to_vec(),
            size_limits: SizeLimits::default(),
            max_files_per_submission: DEFAULT_MAX_FILES_PER_SUBMISSION,
            max_fields_per_submission: DEFAULT_MAX_FIELDS_PER_SUBMISSION,
            environment: "development".to_string(),
        }
    }
}

impl UploadConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let allowed_types = match env::var("UPLOAD_ALLOWED_TYPES") {
            Ok(raw) => parse_allowed_types(&raw)?,
            Err(_) => DeclaredType::ALL.to_vec(),
        };

        let size_limits = SizeLimits {
            image: bytes_from_mb_env("UPLOAD_MAX_IMAGE_SIZE_MB", DEFAULT_MAX_IMAGE_SIZE_MB)?,
            document: bytes_from_mb_env("UPLOAD_MAX_DOCUMENT_SIZE_MB", DEFAULT_MAX_DOCUMENT_SIZE_MB)?,
            default: bytes_from_mb_env("UPLOAD_MAX_DEFAULT_SIZE_MB", DEFAULT_MAX_DEFAULT_SIZE_MB)?,
        };

        let max_files_per_submission =
            count_from_env("UPLOAD_MAX_FILES", DEFAULT_MAX_FILES_PER_SUBMISSION)?;
        let max_fields_per_submission =
            count_from_env("UPLOAD_MAX_FIELDS", DEFAULT_MAX_FIELDS_PER_SUBMISSION)?;

        let config = Self {
            allowed_types,
            size_limits,
            max_files_per_submission,
            max_fields_per_submission,
            environment,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.allowed_types.is_empty() {
            return Err(anyhow::anyhow!(
                "UPLOAD_ALLOWED_TYPES must name at least one supported type"
            ));
        }

        let limits = self.size_limits;
        if limits.image == 0 || limits.document == 0 || limits.default == 0 {
            return Err(anyhow::anyhow!("Upload size ceilings must be positive"));
        }

        if self.max_files_per_submission == 0 {
            return Err(anyhow::anyhow!("UPLOAD_MAX_FILES must be at least 1"));
        }

        if self.max_fields_per_submission < self.max_files_per_submission {
            return Err(anyhow::anyhow!(
                "UPLOAD_MAX_FIELDS must be at least UPLOAD_MAX_FILES"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Enforce the input-shape limits of a submission before any file is validated.
    pub fn check_submission_shape(
        &self,
        file_count: usize,
        field_count: usize,
    ) -> Result<(), UploadErrorKind> {
        if file_count > self.max_files_per_submission {
            return Err(UploadErrorKind::TooManyFiles {
                count: file_count,
                max: self.max_files_per_submission,
            });
        }
        if field_count > self.max_fields_per_submission {
            return Err(UploadErrorKind::TooManyFields {
                count: field_count,
                max: self.max_fields_per_submission,
            });
        }
        Ok(())
    }
}

/// Parse a comma-separated list of MIME types into declared types.
///
/// Unknown entries are a configuration error rather than silently dropped.
pub fn parse_allowed_types(raw: &str) -> Result<Vec<DeclaredType>, anyhow::Error> {
    let mut types = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let declared = entry
            .parse::<DeclaredType>()
            .map_err(|_| anyhow::anyhow!("Unsupported type in UPLOAD_ALLOWED_TYPES: {}", entry))?;
        if !types.contains(&declared) {
            types.push(declared);
        }
    }
    Ok(types)
}

fn bytes_from_mb_env(key: &str, default_mb: u64) -> Result<u64, anyhow::Error> {
    let mb = match env::var(key) {
        Ok(raw) => parse_megabytes(key, &raw)?,
        Err(_) => default_mb,
    };
    Ok(mb.saturating_mul(BYTES_PER_MB))
}

fn parse_megabytes(key: &str, raw: &str) -> Result<u64, anyhow::Error> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| anyhow::anyhow!("{} must be a whole number of megabytes: {}", key, e))
}

fn count_from_env(key: &str, default: usize) -> Result<usize, anyhow::Error> {
    match env::var(key) {
        Ok(raw) => parse_count(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_count(key: &str, raw: &str) -> Result<usize, anyhow::Error> {
    raw.trim()
        .parse::<usize>()
        .map_err(|e| anyhow::anyhow!("{} must be a whole number: {}", key, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = UploadConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_files_per_submission, 5);
        assert_eq!(config.size_limits.image, 5 * 1024 * 1024);
        assert!(!config.is_production());
    }

    #[test]
    fn test_size_limits_for_class() {
        let limits = SizeLimits {
            image: 1,
            document: 2,
            default: 3,
        };
        assert_eq!(limits.for_class(SizeClass::Image), 1);
        assert_eq!(limits.for_class(SizeClass::Document), 2);
        assert_eq!(limits.for_class(SizeClass::Default), 3);
    }

    #[test]
    fn test_parse_allowed_types() {
        let types = parse_allowed_types("image/png, application/pdf,,image/png").unwrap();
        assert_eq!(types, vec![DeclaredType::Png, DeclaredType::Pdf]);
        assert!(parse_allowed_types("image/png,application/x-sh").is_err());
    }

    #[test]
    fn test_validate_rejects_zero_ceiling() {
        let config = UploadConfig {
            size_limits: SizeLimits {
                image: 0,
                document: 1,
                default: 1,
            },
            ..UploadConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_allowlist() {
        let config = UploadConfig {
            allowed_types: vec![],
            ..UploadConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_counts_are_errors() {
        assert_eq!(parse_count("UPLOAD_MAX_FILES", " 7 ").unwrap(), 7);
        let err = parse_count("UPLOAD_MAX_FILES", "five").unwrap_err();
        assert!(err.to_string().contains("UPLOAD_MAX_FILES"));
        assert!(parse_count("UPLOAD_MAX_FIELDS", "-1").is_err());
        assert!(parse_count("UPLOAD_MAX_FIELDS", "").is_err());
    }

    #[test]
    fn test_malformed_megabytes_are_errors() {
        assert_eq!(parse_megabytes("UPLOAD_MAX_IMAGE_SIZE_MB", "5").unwrap(), 5);
        assert!(parse_megabytes("UPLOAD_MAX_IMAGE_SIZE_MB", "5MB").is_err());
    }

    #[test]
    fn test_check_submission_shape() {
        let config = UploadConfig::default();
        assert!(config.check_submission_shape(5, 10).is_ok());
        assert!(matches!(
            config.check_submission_shape(6, 6),
            Err(UploadErrorKind::TooManyFiles { count: 6, max: 5 })
        ));
        assert!(matches!(
            config.check_submission_shape(1, 11),
            Err(UploadErrorKind::TooManyFields { count: 11, max: 10 })
        ));
    }
}
