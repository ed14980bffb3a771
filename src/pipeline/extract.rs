//! PDF text extraction via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! pdfium is a C++ library with internal global state. Loading a document
//! and walking its text layer is CPU-bound and blocking, so the work runs on
//! Tokio's blocking pool instead of stalling an async worker.
//!
//! The engine is bound per call. Uploads are infrequent and a fresh binding
//! keeps no document state alive between requests.

use crate::error::ExtractionError;
use async_trait::async_trait;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Turns PDF bytes into plain text.
///
/// [`PdfiumExtractor`] is the production implementation; tests substitute a
/// fake so the HTTP layer can be exercised without the native library.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Text of every page in order, each page followed by a newline.
    async fn extract_text(&self, bytes: Vec<u8>) -> Result<String, ExtractionError>;
}

/// Extractor backed by a dynamically loaded pdfium library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumExtractor {
    lib_path: Option<PathBuf>,
}

impl PdfiumExtractor {
    /// `lib_path` points at the pdfium shared library; `None` searches the
    /// system library path.
    pub fn new(lib_path: Option<PathBuf>) -> Self {
        Self { lib_path }
    }
}

#[async_trait]
impl TextExtractor for PdfiumExtractor {
    async fn extract_text(&self, bytes: Vec<u8>) -> Result<String, ExtractionError> {
        let lib_path = self.lib_path.clone();
        tokio::task::spawn_blocking(move || extract_text_blocking(lib_path, bytes))
            .await
            .map_err(|e| ExtractionError::TaskFailed(e.to_string()))?
    }
}

fn bind(lib_path: Option<&PathBuf>) -> Result<Pdfium, ExtractionError> {
    let bindings = match lib_path {
        Some(path) => {
            debug!("Binding pdfium from {}", path.display());
            Pdfium::bind_to_library(path)
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| ExtractionError::EngineUnavailable(format!("{e:?}")))?;
    Ok(Pdfium::new(bindings))
}

fn extract_text_blocking(
    lib_path: Option<PathBuf>,
    bytes: Vec<u8>,
) -> Result<String, ExtractionError> {
    let start = Instant::now();
    let size = bytes.len();
    let pdfium = bind(lib_path.as_ref())?;

    let document = pdfium
        .load_pdf_from_byte_vec(bytes, None)
        .map_err(|e| ExtractionError::CorruptPdf(format!("{e:?}")))?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;

    let mut text = String::new();
    for (idx, page) in pages.iter().enumerate() {
        let page_text = page
            .text()
            .map_err(|e| ExtractionError::CorruptPdf(format!("page {}: {e:?}", idx + 1)))?;
        let content = page_text.all();
        debug!("Page {}: {} chars", idx + 1, content.len());
        text.push_str(&content);
        text.push('\n');
    }

    info!(
        "Extracted {} chars from {} pages ({} bytes) in {:?}",
        text.len(),
        total_pages,
        size,
        start.elapsed()
    );
    Ok(text)
}
