//! Boundary input checks, run before any gateway call or pdfium load.
//!
//! Every failure here is a [`ServiceError::Input`] whose message reaches the
//! client verbatim, so the wording is part of the API.

use crate::error::ServiceError;
use tracing::debug;

pub const NO_TEXT: &str = "No text provided";
pub const NO_FILE: &str = "No file uploaded";
pub const NO_FILE_NAME: &str = "No file selected";
pub const NOT_A_PDF: &str = "Uploaded file is not a PDF";
pub const NO_EXTRACTABLE_TEXT: &str = "No text could be extracted from the PDF";

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Reject absent, empty, or whitespace-only text.
pub fn require_text(text: Option<&str>) -> Result<&str, ServiceError> {
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(ServiceError::input(NO_TEXT)),
    }
}

/// A file received from a multipart upload.
#[derive(Debug, Clone)]
pub struct PdfUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Validate an upload: a part must be present, carry a file name, and start
/// with the PDF magic bytes.
pub fn require_pdf(
    file_name: Option<&str>,
    bytes: Option<Vec<u8>>,
) -> Result<PdfUpload, ServiceError> {
    let bytes = bytes.ok_or_else(|| ServiceError::input(NO_FILE))?;
    let file_name = match file_name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(ServiceError::input(NO_FILE_NAME)),
    };
    if !bytes.starts_with(PDF_MAGIC) {
        let head: Vec<u8> = bytes.iter().copied().take(4).collect();
        debug!("Rejected upload {}: magic {:?}", file_name, head);
        return Err(ServiceError::input(NOT_A_PDF));
    }
    Ok(PdfUpload { file_name, bytes })
}

/// Reject extraction output with no visible characters.
pub fn require_extracted(text: String) -> Result<String, ServiceError> {
    if text.trim().is_empty() {
        Err(ServiceError::input(NO_EXTRACTABLE_TEXT))
    } else {
        Ok(text)
    }
}
