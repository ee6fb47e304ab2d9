//! Magic-number verification
//!
//! A declared type may need several signatures at different offsets; all of
//! them must match. WebP is the case in point: a RIFF container marker at
//! offset 0 alone would also accept WAV or AVI files.

use std::collections::HashMap;
use std::path::Path;

use casefile_core::constants::SIGNATURE_WINDOW_BYTES;
use casefile_core::{DeclaredType, UploadErrorKind};

use crate::bounded_read::read_head;

/// Expected bytes at a fixed offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub offset: usize,
    pub expected: &'static [u8],
}

impl Signature {
    pub const fn at(offset: usize, expected: &'static [u8]) -> Self {
        Self { offset, expected }
    }

    fn end(&self) -> usize {
        self.offset + self.expected.len()
    }

    fn matches(&self, head: &[u8]) -> bool {
        head.get(self.offset..self.end()) == Some(self.expected)
    }
}

/// Signature table keyed by declared type
///
/// Types without an entry (SVG, text, office documents) skip verification.
pub struct SignatureTable {
    entries: HashMap<DeclaredType, Vec<Signature>>,
}

impl SignatureTable {
    /// Build a table, enforcing that every signature is non-empty and fits in
    /// the read window.
    pub fn new(
        entries: impl IntoIterator<Item = (DeclaredType, Vec<Signature>)>,
    ) -> Result<Self, anyhow::Error> {
        let mut table = HashMap::new();
        for (declared, signatures) in entries {
            for signature in &signatures {
                if signature.expected.is_empty() {
                    return Err(anyhow::anyhow!(
                        "Empty signature for {} at offset {}",
                        declared,
                        signature.offset
                    ));
                }
                if signature.end() > SIGNATURE_WINDOW_BYTES {
                    return Err(anyhow::anyhow!(
                        "Signature for {} ends at byte {}, beyond the {}-byte window",
                        declared,
                        signature.end(),
                        SIGNATURE_WINDOW_BYTES
                    ));
                }
            }
            if !signatures.is_empty() {
                table.insert(declared, signatures);
            }
        }
        Ok(Self { entries: table })
    }

    /// Built-in signatures for the supported raster and document formats
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();
        entries.insert(DeclaredType::Jpeg, vec![Signature::at(0, &[0xFF, 0xD8, 0xFF])]);
        entries.insert(
            DeclaredType::Png,
            vec![Signature::at(
                0,
                &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
            )],
        );
        entries.insert(DeclaredType::Gif, vec![Signature::at(0, b"GIF8")]);
        entries.insert(
            DeclaredType::Webp,
            vec![Signature::at(0, b"RIFF"), Signature::at(8, b"WEBP")],
        );
        entries.insert(DeclaredType::Pdf, vec![Signature::at(0, b"%PDF")]);
        Self { entries }
    }

    pub fn signatures_for(&self, declared: DeclaredType) -> Option<&[Signature]> {
        self.entries.get(&declared).map(Vec::as_slice)
    }

    /// Compare an already-read file head against the signatures for `declared`.
    pub fn check(&self, declared: DeclaredType, head: &[u8]) -> Result<(), UploadErrorKind> {
        let Some(signatures) = self.signatures_for(declared) else {
            return Ok(());
        };

        if signatures.iter().all(|s| s.matches(head)) {
            Ok(())
        } else {
            Err(UploadErrorKind::ContentMismatch { declared })
        }
    }

    /// Verify the file at `path` against the signatures for `declared`.
    ///
    /// Reads at most [`SIGNATURE_WINDOW_BYTES`]; types without signatures are
    /// not read at all.
    pub async fn verify(&self, path: &Path, declared: DeclaredType) -> Result<(), UploadErrorKind> {
        if self.signatures_for(declared).is_none() {
            tracing::debug!(
                declared = %declared,
                "No signature registered, relying on allowlist"
            );
            return Ok(());
        }

        let head = read_head(path, SIGNATURE_WINDOW_BYTES)
            .await
            .map_err(UploadErrorKind::io)?;
        self.check(declared, &head)
    }
}

impl Default for SignatureTable {
    fn default() -> Self {
        Self::builtin()
    }
}
