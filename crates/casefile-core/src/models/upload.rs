use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::SizeLimits;
use crate::error::{ErrorMetadata, LogLevel, UploadErrorKind};

/// Size class used to pick a byte ceiling for a declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Image,
    Document,
    Default,
}

/// How the bytes of a declared type are expected to look
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    /// Binary raster image (JPEG, PNG, ...)
    RasterImage,
    /// Image format that is itself XML markup
    MarkupImage,
    /// Binary document container (PDF, Office)
    BinaryDocument,
    /// Plain or delimited text
    Text,
}

impl ContentCategory {
    /// Whether a downstream consumer may interpret the content as markup.
    pub fn is_markup_capable(&self) -> bool {
        matches!(self, ContentCategory::MarkupImage | ContentCategory::Text)
    }

    /// Null bytes are legitimate inside binary formats only.
    pub fn allows_null_bytes(&self) -> bool {
        matches!(
            self,
            ContentCategory::RasterImage | ContentCategory::BinaryDocument
        )
    }
}

/// Closed set of declared MIME types the pipeline knows how to check.
///
/// Being in this enum does not mean a type is accepted: the configured
/// allowlist decides that. Anything that does not parse into a variant is
/// rejected as [`UploadErrorKind::UnknownDeclaredType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredType {
    Jpeg,
    Png,
    Gif,
    Webp,
    Svg,
    Pdf,
    PlainText,
    Csv,
    MsWord,
    Docx,
}

impl DeclaredType {
    pub const ALL: [DeclaredType; 10] = [
        DeclaredType::Jpeg,
        DeclaredType::Png,
        DeclaredType::Gif,
        DeclaredType::Webp,
        DeclaredType::Svg,
        DeclaredType::Pdf,
        DeclaredType::PlainText,
        DeclaredType::Csv,
        DeclaredType::MsWord,
        DeclaredType::Docx,
    ];

    /// Canonical MIME string
    pub fn mime_type(&self) -> &'static str {
        match self {
            DeclaredType::Jpeg => "image/jpeg",
            DeclaredType::Png => "image/png",
            DeclaredType::Gif => "image/gif",
            DeclaredType::Webp => "image/webp",
            DeclaredType::Svg => "image/svg+xml",
            DeclaredType::Pdf => "application/pdf",
            DeclaredType::PlainText => "text/plain",
            DeclaredType::Csv => "text/csv",
            DeclaredType::MsWord => "application/msword",
            DeclaredType::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Extensions (without leading dot) that may carry this type
    pub fn default_extensions(&self) -> &'static [&'static str] {
        match self {
            DeclaredType::Jpeg => &["jpg", "jpeg"],
            DeclaredType::Png => &["png"],
            DeclaredType::Gif => &["gif"],
            DeclaredType::Webp => &["webp"],
            DeclaredType::Svg => &["svg"],
            DeclaredType::Pdf => &["pdf"],
            DeclaredType::PlainText => &["txt"],
            DeclaredType::Csv => &["csv"],
            DeclaredType::MsWord => &["doc"],
            DeclaredType::Docx => &["docx"],
        }
    }

    pub fn size_class(&self) -> SizeClass {
        match self {
            DeclaredType::Jpeg
            | DeclaredType::Png
            | DeclaredType::Gif
            | DeclaredType::Webp
            | DeclaredType::Svg => SizeClass::Image,
            DeclaredType::Pdf | DeclaredType::MsWord | DeclaredType::Docx => SizeClass::Document,
            DeclaredType::PlainText | DeclaredType::Csv => SizeClass::Default,
        }
    }

    pub fn category(&self) -> ContentCategory {
        match self {
            DeclaredType::Jpeg | DeclaredType::Png | DeclaredType::Gif | DeclaredType::Webp => {
                ContentCategory::RasterImage
            }
            DeclaredType::Svg => ContentCategory::MarkupImage,
            DeclaredType::Pdf | DeclaredType::MsWord | DeclaredType::Docx => {
                ContentCategory::BinaryDocument
            }
            DeclaredType::PlainText | DeclaredType::Csv => ContentCategory::Text,
        }
    }

    /// Guess a declared type from a filename extension (case-insensitive).
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.trim_start_matches('.').to_lowercase();
        DeclaredType::ALL
            .into_iter()
            .find(|t| t.default_extensions().contains(&extension.as_str()))
    }
}

/// Normalize MIME type by stripping parameters (e.g. "text/plain; charset=utf-8" -> "text/plain").
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase()
}

impl FromStr for DeclaredType {
    type Err = UploadErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_mime_type(s);
        match normalized.as_str() {
            "image/jpeg" | "image/jpg" => Ok(DeclaredType::Jpeg),
            "image/png" => Ok(DeclaredType::Png),
            "image/gif" => Ok(DeclaredType::Gif),
            "image/webp" => Ok(DeclaredType::Webp),
            "image/svg+xml" => Ok(DeclaredType::Svg),
            "application/pdf" => Ok(DeclaredType::Pdf),
            "text/plain" => Ok(DeclaredType::PlainText),
            "text/csv" => Ok(DeclaredType::Csv),
            "application/msword" => Ok(DeclaredType::MsWord),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Ok(DeclaredType::Docx)
            }
            _ => Err(UploadErrorKind::UnknownDeclaredType {
                declared: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// A file already materialized by the transfer layer.
///
/// The pipeline reads it and may delete it on rejection. It never creates or
/// relocates the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub original_name: String,
    pub declared_mime_type: String,
    pub size_bytes: u64,
    pub storage_path: PathBuf,
}

impl FileDescriptor {
    pub fn new(
        original_name: impl Into<String>,
        declared_mime_type: impl Into<String>,
        size_bytes: u64,
        storage_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            declared_mime_type: declared_mime_type.into(),
            size_bytes,
            storage_path: storage_path.into(),
        }
    }
}

/// Storage name derived from an original filename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizedName {
    storage_name: String,
    extension: Option<String>,
}

impl SanitizedName {
    pub fn new(storage_name: String, extension: Option<String>) -> Self {
        Self {
            storage_name,
            extension,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.storage_name
    }

    /// Lowercased extension without the leading dot
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    pub fn into_string(self) -> String {
        self.storage_name
    }
}

impl fmt::Display for SanitizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_name)
    }
}

/// Result of running every stage on one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ValidationOutcome {
    Accepted { sanitized_name: String },
    Rejected { reason: UploadErrorKind },
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted { .. })
    }
}

/// Metadata handed to the persistence layer for an accepted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedFile {
    pub sanitized_name: String,
    pub declared_mime_type: DeclaredType,
    pub size_bytes: u64,
    pub storage_path: PathBuf,
}

/// Allowed types and size ceilings, echoed back to the client on rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredConstraints {
    pub allowed_types: Vec<String>,
    pub size_limits: SizeLimits,
}

/// First failure of a rejected batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("Upload rejected for '{original_name}': {kind}")]
pub struct BatchRejection {
    pub kind: UploadErrorKind,
    pub original_name: String,
    pub constraints: DeclaredConstraints,
}

impl ErrorMetadata for BatchRejection {
    fn http_status_code(&self) -> u16 {
        self.kind.http_status_code()
    }

    fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    fn is_recoverable(&self) -> bool {
        self.kind.is_recoverable()
    }

    fn suggested_action(&self) -> Option<&'static str> {
        self.kind.suggested_action()
    }

    fn client_message(&self) -> String {
        let limits = &self.constraints.size_limits;
        format!(
            "{} ({}). Allowed types: {}. Maximum sizes: images {} bytes, documents {} bytes, other files {} bytes",
            self.kind.client_message(),
            self.original_name,
            self.constraints.allowed_types.join(", "),
            limits.image,
            limits.document,
            limits.default,
        )
    }

    fn is_sensitive(&self) -> bool {
        self.kind.is_sensitive()
    }

    fn log_level(&self) -> LogLevel {
        self.kind.log_level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declared_type_normalizes() {
        assert_eq!(
            "IMAGE/JPEG".parse::<DeclaredType>().unwrap(),
            DeclaredType::Jpeg
        );
        assert_eq!(
            "text/plain; charset=utf-8".parse::<DeclaredType>().unwrap(),
            DeclaredType::PlainText
        );
        assert_eq!(
            " image/svg+xml ".parse::<DeclaredType>().unwrap(),
            DeclaredType::Svg
        );
    }

    #[test]
    fn test_parse_unknown_declared_type() {
        let err = "application/x-msdownload"
            .parse::<DeclaredType>()
            .unwrap_err();
        assert!(matches!(err, UploadErrorKind::UnknownDeclaredType { .. }));
    }

    #[test]
    fn test_every_type_has_an_extension_and_round_trips_its_mime() {
        for t in DeclaredType::ALL {
            assert!(!t.default_extensions().is_empty());
            assert_eq!(t.mime_type().parse::<DeclaredType>().unwrap(), t);
        }
    }

    #[test]
    fn test_categories() {
        assert!(DeclaredType::Svg.category().is_markup_capable());
        assert!(!DeclaredType::Svg.category().allows_null_bytes());
        assert!(DeclaredType::Png.category().allows_null_bytes());
        assert!(!DeclaredType::Png.category().is_markup_capable());
        assert!(DeclaredType::Docx.category().allows_null_bytes());
        assert!(DeclaredType::PlainText.category().is_markup_capable());
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(DeclaredType::from_extension("JPG"), Some(DeclaredType::Jpeg));
        assert_eq!(DeclaredType::from_extension(".pdf"), Some(DeclaredType::Pdf));
        assert_eq!(DeclaredType::from_extension("exe"), None);
    }

    #[test]
    fn test_batch_rejection_client_message_lists_constraints() {
        let rejection = BatchRejection {
            kind: UploadErrorKind::ContentMismatch {
                declared: DeclaredType::Png,
            },
            original_name: "b.png".to_string(),
            constraints: DeclaredConstraints {
                allowed_types: vec!["image/png".to_string(), "application/pdf".to_string()],
                size_limits: SizeLimits {
                    image: 100,
                    document: 200,
                    default: 50,
                },
            },
        };
        let message = rejection.client_message();
        assert!(message.contains("b.png"));
        assert!(message.contains("image/png, application/pdf"));
        assert!(message.contains("200"));
        assert_eq!(rejection.error_code(), "CONTENT_MISMATCH");
    }
}
