//! Filename sanitization
//!
//! Traversal sequences are rejected outright rather than stripped: a name
//! that had `..` removed can still resolve to an unexpected sibling path.
//! The storage name never reuses the original verbatim; it always carries a
//! random 128-bit token.

use percent_encoding::percent_decode_str;
use uuid::Uuid;

use casefile_core::constants::{
    MAX_FILENAME_LENGTH, MAX_PERCENT_DECODE_PASSES, MAX_STORAGE_NAME_BYTES,
};
use casefile_core::{SanitizedName, UploadErrorKind};

/// Length of a simple-format UUID plus the joining hyphen.
const TOKEN_SUFFIX_LEN: usize = 33;

/// Stem used when nothing of the original stem survives.
const FALLBACK_STEM: &str = "file";

/// Sanitize an original filename and derive its storage name.
///
/// The storage name is `stem-{token}{.ext}`, where the token is a UUID v4 in
/// simple (32 hex digit) form and the extension is lowercased.
pub fn sanitize_filename(original_name: &str) -> Result<SanitizedName, UploadErrorKind> {
    if contains_traversal(original_name) {
        tracing::warn!(
            filename = %original_name.escape_debug(),
            "Rejected filename with path traversal sequence"
        );
        return Err(UploadErrorKind::InvalidFilename);
    }

    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);

    if base.chars().all(|c| c == '.' || c.is_whitespace()) {
        return Err(UploadErrorKind::InvalidFilename);
    }

    let length = base.chars().count();
    if length > MAX_FILENAME_LENGTH {
        return Err(UploadErrorKind::FilenameTooLong {
            length,
            max: MAX_FILENAME_LENGTH,
        });
    }

    if !base.chars().all(is_allowed_char) {
        return Err(UploadErrorKind::InvalidCharacters);
    }

    let (stem, extension) = split_extension(base);
    build_storage_name(stem, extension)
}

/// Detects `..` in the raw name or in any percent-decoded layer of it, as
/// well as percent-encoded path separators.
fn contains_traversal(name: &str) -> bool {
    let mut current = name.to_string();
    for _ in 0..=MAX_PERCENT_DECODE_PASSES {
        if current.contains("..") {
            return true;
        }
        let lower = current.to_ascii_lowercase();
        if lower.contains("%2f") || lower.contains("%5c") {
            return true;
        }

        let decoded = percent_decode_str(&current).decode_utf8_lossy().into_owned();
        if decoded == current {
            break;
        }
        current = decoded;
    }
    false
}

fn is_allowed_char(c: char) -> bool {
    c.is_alphanumeric()
        || matches!(c, '.' | '_' | '-')
        || (c.is_whitespace() && !c.is_control())
}

/// Split on the last dot. A leading dot, a trailing dot, or a non-alphanumeric
/// suffix does not count as an extension.
fn split_extension(base: &str) -> (&str, Option<String>) {
    match base.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < base.len() => {
            let ext = &base[idx + 1..];
            if ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                (&base[..idx], Some(ext.to_ascii_lowercase()))
            } else {
                (base, None)
            }
        }
        _ => (base, None),
    }
}

/// Fails when the extension alone leaves no room for a stem within
/// [`MAX_STORAGE_NAME_BYTES`].
fn build_storage_name(
    stem: &str,
    extension: Option<String>,
) -> Result<SanitizedName, UploadErrorKind> {
    let token = Uuid::new_v4().simple().to_string();

    let ext_len = extension.as_ref().map(|e| e.len() + 1).unwrap_or(0);
    let budget = MAX_STORAGE_NAME_BYTES.saturating_sub(TOKEN_SUFFIX_LEN + ext_len);

    let mut safe_stem = String::with_capacity(stem.len().min(budget));
    for c in stem
        .trim_matches(|c: char| c == '.' || c.is_whitespace())
        .chars()
    {
        let c = if c.is_whitespace() { '_' } else { c };
        if safe_stem.len() + c.len_utf8() > budget {
            break;
        }
        safe_stem.push(c);
    }
    if safe_stem.is_empty() {
        safe_stem.push_str(FALLBACK_STEM);
    }

    let storage_name = match &extension {
        Some(ext) => format!("{}-{}.{}", safe_stem, token, ext),
        None => format!("{}-{}", safe_stem, token),
    };

    if storage_name.len() > MAX_STORAGE_NAME_BYTES {
        return Err(UploadErrorKind::FilenameTooLong {
            length: storage_name.len(),
            max: MAX_STORAGE_NAME_BYTES,
        });
    }

    Ok(SanitizedName::new(storage_name, extension))
}
