//! Content-based file type detection.
//!
//! Detectors are tried in priority order: the `infer` signature library
//! first, then the manual magic-byte table. The manual table exists because
//! generic sniffers under-detect two formats we care about: Office packages
//! (a bare ZIP signature is not enough, the archive must also look like a
//! Word package) and plain text (no signature at all, only a printability
//! heuristic).

use tracing::debug;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const DOC_MIME: &str = "application/msword";
pub const TEXT_MIME: &str = "text/plain";

/// How far into the buffer the manual heuristics look.
const SNIFF_WINDOW: usize = 1000;
/// Fraction of printable/whitespace bytes required to call a buffer text.
const PRINTABLE_RATIO: f64 = 0.85;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedType {
    pub mime: &'static str,
    /// Extension without the leading dot, e.g. `pdf`.
    pub extension: &'static str,
}

/// A single detection strategy. Returns `None` when the strategy has no
/// opinion, letting the next one in the chain try.
pub trait TypeDetector {
    fn detect(&self, bytes: &[u8]) -> Option<DetectedType>;
}

/// Signature detection via the `infer` database.
pub struct LibraryDetector;

impl TypeDetector for LibraryDetector {
    fn detect(&self, bytes: &[u8]) -> Option<DetectedType> {
        infer::get(bytes).map(|kind| DetectedType {
            mime: kind.mime_type(),
            extension: kind.extension(),
        })
    }
}

/// Manual magic-byte table for the formats the upload flow accepts.
pub struct MagicByteDetector;

impl TypeDetector for MagicByteDetector {
    fn detect(&self, bytes: &[u8]) -> Option<DetectedType> {
        if bytes.starts_with(b"%PDF") {
            return Some(DetectedType {
                mime: PDF_MIME,
                extension: "pdf",
            });
        }

        // ZIP local-file signature. Only call it DOCX if the head of the
        // archive also looks like a Word package; a bare ZIP stays
        // undetected here. The window is deliberately bounded even though
        // unusual archive layouts can push the package markers past it.
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            let head = &bytes[..bytes.len().min(SNIFF_WINDOW)];
            if contains(head, b"word/") || contains(head, b"[Content_Types].xml") {
                return Some(DetectedType {
                    mime: DOCX_MIME,
                    extension: "docx",
                });
            }
            return None;
        }

        // OLE2 compound file, i.e. legacy .doc.
        if bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
            return Some(DetectedType {
                mime: DOC_MIME,
                extension: "doc",
            });
        }

        if looks_like_text(bytes) {
            return Some(DetectedType {
                mime: TEXT_MIME,
                extension: "txt",
            });
        }

        None
    }
}

/// Runs the detector chain over `bytes` and returns the first verdict.
pub fn detect_type(bytes: &[u8]) -> Option<DetectedType> {
    let detectors: [&dyn TypeDetector; 2] = [&LibraryDetector, &MagicByteDetector];
    let detected = detectors.iter().find_map(|d| d.detect(bytes));
    debug!(mime = ?detected.as_ref().map(|d| d.mime), "sniffed upload type");
    detected
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// Samples the first [`SNIFF_WINDOW`] bytes; at least [`PRINTABLE_RATIO`] of
/// them must be printable ASCII or common whitespace.
fn looks_like_text(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SNIFF_WINDOW)];
    if head.is_empty() {
        return false;
    }
    let printable = head
        .iter()
        .filter(|&&b| (0x20..=0x7E).contains(&b) || matches!(b, b'\t' | b'\r' | b'\n'))
        .count();
    printable as f64 / head.len() as f64 >= PRINTABLE_RATIO
}
