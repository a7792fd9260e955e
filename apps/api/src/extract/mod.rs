//! Text extraction from validated uploads, ahead of the LLM call.
//!
//! PDFs go through `pdf-extract`; plain text is decoded as UTF-8. Office
//! documents have no local extractor, so their printable runs are salvaged
//! and the LLM extraction prompt is left to structure the noisy result.

use anyhow::{Context, Result};
use tracing::debug;

use crate::upload::sniff;

/// Minimum length of a printable ASCII run worth salvaging from a binary
/// document.
const MIN_RUN_LEN: usize = 4;

/// Extracts text from `bytes` according to the sniffed MIME type.
/// Undetected inputs are treated as plain text (the validator has already
/// let them through).
pub fn extract_text(bytes: &[u8], mime: Option<&str>) -> Result<String> {
    let text = match mime {
        Some(sniff::PDF_MIME) => pdf_extract::extract_text_from_mem(bytes)
            .context("failed to extract text from PDF")?,
        Some(sniff::DOCX_MIME) | Some(sniff::DOC_MIME) => salvage_text(bytes),
        Some(m) if m.contains("zip") => salvage_text(bytes),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    let text = text.trim().to_string();
    debug!(chars = text.len(), mime = ?mime, "extracted resume text");
    if text.is_empty() {
        anyhow::bail!("no text could be extracted from the document");
    }
    Ok(text)
}

/// Best-effort recovery of readable content from a binary container: keeps
/// printable ASCII runs of at least [`MIN_RUN_LEN`] characters, separated by
/// newlines.
fn salvage_text(bytes: &[u8]) -> String {
    let mut runs: Vec<String> = Vec::new();
    let mut current = String::new();
    for &b in bytes {
        if (0x20..=0x7E).contains(&b) {
            current.push(b as char);
        } else {
            if current.trim().len() >= MIN_RUN_LEN {
                runs.push(current.trim().to_string());
            }
            current.clear();
        }
    }
    if current.trim().len() >= MIN_RUN_LEN {
        runs.push(current.trim().to_string());
    }
    runs.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        let text = extract_text(b"Jane Doe\nStaff Engineer\n", Some(sniff::TEXT_MIME)).unwrap();
        assert_eq!(text, "Jane Doe\nStaff Engineer");
    }

    #[test]
    fn undetected_input_decodes_lossily() {
        let mut bytes = b"Resume of John ".to_vec();
        bytes.push(0xFF); // invalid UTF-8, replaced not rejected
        bytes.extend_from_slice(b"Smith");
        let text = extract_text(&bytes, None).unwrap();
        assert!(text.contains("Resume of John"));
        assert!(text.contains("Smith"));
    }

    #[test]
    fn empty_document_is_an_error() {
        assert!(extract_text(b"   \n  ", Some(sniff::TEXT_MIME)).is_err());
    }

    #[test]
    fn salvage_keeps_long_printable_runs_only() {
        let mut bytes = vec![0x00, 0x01];
        bytes.extend_from_slice(b"Senior Backend Engineer");
        bytes.extend([0x00, 0x02, 0x03]);
        bytes.extend_from_slice(b"ab"); // below the run threshold
        bytes.push(0x00);
        bytes.extend_from_slice(b"Python, Rust");

        let text = salvage_text(&bytes);
        assert_eq!(text, "Senior Backend Engineer\nPython, Rust");
    }

    #[test]
    fn salvage_applies_to_office_documents() {
        let mut bytes = vec![0xD0, 0xCF, 0x11, 0xE0];
        bytes.extend_from_slice(b"Acme Corp 2019-2024");
        let text = extract_text(&bytes, Some(sniff::DOC_MIME)).unwrap();
        assert!(text.contains("Acme Corp"));
    }
}
