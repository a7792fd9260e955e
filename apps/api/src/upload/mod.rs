//! Upload validation for résumé files.
//!
//! Two layers: `sniff` decides what the bytes actually are (signature
//! library first, manual magic-byte table as fallback), `validate` enforces
//! size bounds, the extension/MIME allow-list and content sanity checks
//! before anything expensive (text extraction, LLM calls) runs.

pub mod sniff;
pub mod validate;

pub use sniff::{detect_type, DetectedType};
pub use validate::{
    validate_upload, validate_upload_strict, UploadError, ValidationOptions, ValidationReport,
};
