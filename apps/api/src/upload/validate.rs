//! Layered validation of uploaded résumé files.
//!
//! Contract: clearly-wrong inputs (size bounds, disallowed extension or
//! MIME type) are returned as `Err(UploadError)` and abort the request.
//! Maybe-fine findings from the content sanity checks are accumulated into
//! [`ValidationReport::errors`] instead, leaving the call site to decide
//! whether they are fatal.

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::upload::sniff::{self, DetectedType};

pub const DEFAULT_MAX_SIZE: usize = 10 * 1024 * 1024;
pub const DEFAULT_MIN_SIZE: usize = 100;

/// Fewer non-zero bytes than this and the file is reported as empty/corrupt.
const MIN_NON_ZERO_BYTES: usize = 50;

pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "doc", "txt"];

pub const DEFAULT_ALLOWED_TYPES: &[&str] = &[
    sniff::PDF_MIME,
    sniff::DOCX_MIME,
    sniff::DOC_MIME,
    sniff::TEXT_MIME,
];

/// Fatal validation failures. Each carries structured details for logging;
/// `code()` gives the machine-readable form used in API error bodies.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("file corrupted or empty: {size} bytes is below the {min} byte minimum")]
    TooSmall { size: usize, min: usize },

    #[error("file type not allowed: extension '.{extension}' is not an accepted format")]
    ExtensionNotAllowed { extension: String },

    #[error("file type not allowed: detected type '{mime_type}' is not an accepted format")]
    TypeNotAllowed { mime_type: String },

    #[error("file failed content checks: {0}")]
    Content(String),
}

impl UploadError {
    pub fn code(&self) -> &'static str {
        match self {
            UploadError::TooLarge { .. } => "FILE_TOO_LARGE",
            UploadError::TooSmall { .. } => "FILE_CORRUPTED",
            UploadError::ExtensionNotAllowed { .. } | UploadError::TypeNotAllowed { .. } => {
                "TYPE_NOT_ALLOWED"
            }
            UploadError::Content(_) => "FILE_CONTENT",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationOptions {
    pub max_size: usize,
    pub min_size: usize,
    pub allowed_types: Vec<String>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            min_size: DEFAULT_MIN_SIZE,
            allowed_types: DEFAULT_ALLOWED_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Outcome of the soft (content-level) checks. `is_valid` holds exactly when
/// `errors` is empty; fatal problems never reach this struct.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub mime_type: Option<String>,
    /// Detected extension with leading dot, e.g. `.pdf`.
    pub extension: Option<String>,
    pub size: usize,
    pub errors: Vec<String>,
}

/// Validates an uploaded buffer against size bounds, the type allow-list and
/// content sanity heuristics.
///
/// The extension check only runs when a filename was declared. A mismatch
/// between declared extension and sniffed type is logged, not rejected:
/// sniffing is informative, not authoritative, because innocuous encoders
/// sometimes mislabel.
pub fn validate_upload(
    bytes: &[u8],
    filename: Option<&str>,
    options: &ValidationOptions,
) -> Result<ValidationReport, UploadError> {
    let size = bytes.len();
    if size > options.max_size {
        return Err(UploadError::TooLarge {
            size,
            limit: options.max_size,
        });
    }
    if size < options.min_size {
        return Err(UploadError::TooSmall {
            size,
            min: options.min_size,
        });
    }

    let detected = sniff::detect_type(bytes);

    if let Some(name) = filename {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(UploadError::ExtensionNotAllowed { extension });
        }
        if let (Some(declared), Some(detected)) =
            (mime_guess::from_path(name).first_raw(), &detected)
        {
            if declared != detected.mime {
                warn!(
                    filename = name,
                    declared,
                    detected = detected.mime,
                    "declared extension does not match sniffed type"
                );
            }
        }
    }

    if let Some(detected) = &detected {
        let allowed = options.allowed_types.iter().any(|t| t == detected.mime);
        // Plain text and Office ZIP containers are notoriously under-detected
        // by generic sniffers, so they pass through the allow-list.
        let pass_through = detected.mime.starts_with("text/") || detected.mime.contains("zip");
        if !allowed && !pass_through {
            return Err(UploadError::TypeNotAllowed {
                mime_type: detected.mime.to_string(),
            });
        }
    }

    let mut errors = Vec::new();

    let non_zero = bytes.iter().filter(|&&b| b != 0).count();
    if non_zero < MIN_NON_ZERO_BYTES {
        errors.push("file appears empty or corrupt".to_string());
    }

    if matches!(&detected, Some(DetectedType { mime, .. }) if *mime == sniff::PDF_MIME)
        && !bytes.starts_with(b"%PDF")
    {
        errors.push("PDF header missing or corrupt".to_string());
    }

    Ok(ValidationReport {
        is_valid: errors.is_empty(),
        mime_type: detected.as_ref().map(|d| d.mime.to_string()),
        extension: detected.as_ref().map(|d| format!(".{}", d.extension)),
        size,
        errors,
    })
}

/// Like [`validate_upload`] but treats content findings as fatal too,
/// joining them into a single error.
pub fn validate_upload_strict(
    bytes: &[u8],
    filename: Option<&str>,
    options: &ValidationOptions,
) -> Result<ValidationReport, UploadError> {
    let report = validate_upload(bytes, filename, options)?;
    if !report.is_valid {
        return Err(UploadError::Content(report.errors.join("; ")));
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_pdf(size: usize) -> Vec<u8> {
        let mut buf = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\n".to_vec();
        while buf.len() < size {
            buf.push(b'x');
        }
        buf.truncate(size);
        buf
    }

    #[test]
    fn two_kilobyte_pdf_with_filename_passes_cleanly() {
        let buf = minimal_pdf(2048);
        let report =
            validate_upload(&buf, Some("resume.pdf"), &ValidationOptions::default()).unwrap();

        assert!(report.is_valid);
        assert_eq!(report.mime_type.as_deref(), Some("application/pdf"));
        assert_eq!(report.extension.as_deref(), Some(".pdf"));
        assert_eq!(report.size, 2048);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn oversized_file_fails_fast() {
        let buf = minimal_pdf(DEFAULT_MAX_SIZE + 1);
        let err = validate_upload(&buf, None, &ValidationOptions::default()).unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { .. }));
        assert_eq!(err.code(), "FILE_TOO_LARGE");
    }

    #[test]
    fn undersized_file_fails_fast() {
        let err =
            validate_upload(&minimal_pdf(99), None, &ValidationOptions::default()).unwrap_err();
        match err {
            UploadError::TooSmall { size, min } => {
                assert_eq!(size, 99);
                assert_eq!(min, DEFAULT_MIN_SIZE);
            }
            other => panic!("expected TooSmall, got {other:?}"),
        }
    }

    #[test]
    fn exe_filename_is_rejected_regardless_of_content() {
        let buf = minimal_pdf(2048);
        let err =
            validate_upload(&buf, Some("resume.exe"), &ValidationOptions::default()).unwrap_err();
        match err {
            UploadError::ExtensionNotAllowed { extension } => assert_eq!(extension, "exe"),
            other => panic!("expected ExtensionNotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn filename_without_extension_is_rejected() {
        let buf = minimal_pdf(2048);
        let err = validate_upload(&buf, Some("resume"), &ValidationOptions::default()).unwrap_err();
        assert!(matches!(err, UploadError::ExtensionNotAllowed { .. }));
    }

    #[test]
    fn missing_filename_skips_extension_check() {
        let report = validate_upload(&minimal_pdf(500), None, &ValidationOptions::default());
        assert!(report.unwrap().is_valid);
    }

    #[test]
    fn mislabeled_extension_warns_but_passes() {
        // PDF bytes declared as .txt: sniffing is informative, not blocking.
        let report =
            validate_upload(&minimal_pdf(500), Some("resume.txt"), &ValidationOptions::default())
                .unwrap();
        assert!(report.is_valid);
        assert_eq!(report.mime_type.as_deref(), Some("application/pdf"));
    }

    #[test]
    fn detected_type_outside_allow_list_is_rejected() {
        // A PNG signature followed by padding: detected, but not a document.
        let mut buf = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        buf.extend(std::iter::repeat(0x41).take(200));
        let err = validate_upload(&buf, None, &ValidationOptions::default()).unwrap_err();
        match err {
            UploadError::TypeNotAllowed { mime_type } => assert_eq!(mime_type, "image/png"),
            other => panic!("expected TypeNotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn all_zero_buffer_returns_soft_content_error() {
        let buf = vec![0u8; 1000];
        let report = validate_upload(&buf, None, &ValidationOptions::default()).unwrap();
        assert!(!report.is_valid);
        assert!(report.errors[0].contains("empty or corrupt"));
        assert_eq!(report.mime_type, None);
    }

    #[test]
    fn plain_text_resume_passes() {
        let buf = b"Jane Doe\njane@example.com\nStaff Engineer, 12 years.\n".repeat(5);
        let report =
            validate_upload(&buf, Some("resume.txt"), &ValidationOptions::default()).unwrap();
        assert!(report.is_valid);
        assert_eq!(report.mime_type.as_deref(), Some("text/plain"));
        assert_eq!(report.extension.as_deref(), Some(".txt"));
    }

    #[test]
    fn strict_variant_turns_content_findings_into_errors() {
        let buf = vec![0u8; 1000];
        let err =
            validate_upload_strict(&buf, None, &ValidationOptions::default()).unwrap_err();
        match err {
            UploadError::Content(msg) => assert!(msg.contains("empty or corrupt")),
            other => panic!("expected Content, got {other:?}"),
        }
        assert_eq!(
            validate_upload_strict(&vec![0u8; 1000], None, &ValidationOptions::default())
                .unwrap_err()
                .code(),
            "FILE_CONTENT"
        );
    }

    #[test]
    fn custom_size_bounds_are_honored() {
        let options = ValidationOptions {
            max_size: 1024,
            min_size: 10,
            ..Default::default()
        };
        assert!(validate_upload(&minimal_pdf(500), None, &options).is_ok());
        assert!(matches!(
            validate_upload(&minimal_pdf(2000), None, &options),
            Err(UploadError::TooLarge { .. })
        ));
    }
}
