//! Declared-type allowlist
//!
//! Maps each accepted [`DeclaredType`] to its permitted extensions and size
//! class. Built once from [`UploadConfig`] and shared read-only.

use std::collections::HashMap;
use std::path::Path;

use casefile_core::config::SizeLimits;
use casefile_core::models::{DeclaredConstraints, DeclaredType, SizeClass};
use casefile_core::{UploadConfig, UploadErrorKind};

/// One allowlisted declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyEntry {
    pub declared_type: DeclaredType,
    pub allowed_extensions: Vec<&'static str>,
    pub size_class: SizeClass,
}

impl PolicyEntry {
    fn for_type(declared_type: DeclaredType) -> Self {
        Self {
            declared_type,
            allowed_extensions: declared_type.default_extensions().to_vec(),
            size_class: declared_type.size_class(),
        }
    }
}

/// Upload policy table
pub struct PolicyTable {
    entries: HashMap<DeclaredType, PolicyEntry>,
    // Preserves configuration order for client-facing messages.
    order: Vec<DeclaredType>,
    size_limits: SizeLimits,
}

impl PolicyTable {
    pub fn new(allowed: &[DeclaredType], size_limits: SizeLimits) -> Self {
        let mut entries = HashMap::new();
        let mut order = Vec::new();
        for declared in allowed {
            if entries
                .insert(*declared, PolicyEntry::for_type(*declared))
                .is_none()
            {
                order.push(*declared);
            }
        }

        Self {
            entries,
            order,
            size_limits,
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(&config.allowed_types, config.size_limits)
    }

    /// Look up the policy for a declared MIME string.
    ///
    /// `None` for strings that are not a supported type and for supported
    /// types left out of the allowlist.
    pub fn lookup(&self, declared_mime_type: &str) -> Option<&PolicyEntry> {
        let declared = declared_mime_type.parse::<DeclaredType>().ok()?;
        self.entries.get(&declared)
    }

    /// Byte ceiling for a size class
    pub fn size_limit_for(&self, size_class: SizeClass) -> u64 {
        self.size_limits.for_class(size_class)
    }

    /// Check the original filename's extension against the entry (case-insensitive).
    ///
    /// A name without an extension passes; the declared type still drives the
    /// signature and content stages.
    pub fn check_extension(
        &self,
        entry: &PolicyEntry,
        original_name: &str,
    ) -> Result<(), UploadErrorKind> {
        let Some(extension) = extension_of(original_name) else {
            tracing::debug!(
                declared = %entry.declared_type,
                "No filename extension, relying on declared type checks"
            );
            return Ok(());
        };

        if !entry
            .allowed_extensions
            .iter()
            .any(|allowed| *allowed == extension)
        {
            return Err(UploadErrorKind::ExtensionMismatch {
                declared: entry.declared_type,
                extension,
            });
        }

        Ok(())
    }

    /// MIME strings of the allowlisted types, in configuration order
    pub fn allowed_types(&self) -> Vec<String> {
        self.order
            .iter()
            .map(|t| t.mime_type().to_string())
            .collect()
    }

    pub fn size_limits(&self) -> SizeLimits {
        self.size_limits
    }

    pub fn constraints(&self) -> DeclaredConstraints {
        DeclaredConstraints {
            allowed_types: self.allowed_types(),
            size_limits: self.size_limits,
        }
    }
}

/// Lowercased extension of the last path component, if any.
///
/// A leading dot (".profile") does not start an extension.
fn extension_of(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    Path::new(base)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_lowercase())
}
