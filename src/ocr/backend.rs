//! OCR backend abstraction.

use std::path::Path;

use thiserror::Error;

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Text recognized on one page.
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Page number (1-indexed).
    pub page: u32,
    pub text: String,
    pub processing_time_ms: u64,
}

/// Configuration for OCR backends.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Language profile, `+`-separated for multi-language models (e.g. "por+eng").
    pub language: String,
    /// Rendering resolution for PDF pages.
    pub dpi: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "por+eng".to_string(),
            dpi: 300,
        }
    }
}

/// Trait for OCR backends.
pub trait OcrBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Check if this backend can run (binaries installed, models present).
    fn is_available(&self) -> bool;

    /// Describe what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Number of pages in a PDF, as seen by the backend's renderer.
    fn page_count(&self, pdf_path: &Path) -> Result<u32, OcrError>;

    /// Render and recognize one page of a PDF.
    fn ocr_pdf_page(&self, pdf_path: &Path, page: u32) -> Result<OcrResult, OcrError>;

    /// Recognize every page of a PDF, in page order.
    ///
    /// `pages` is the page count when the caller already knows it. Pages that
    /// fail individually are skipped; an unavailable backend aborts the run.
    fn ocr_pdf(&self, pdf_path: &Path, pages: Option<u32>) -> Result<Vec<OcrResult>, OcrError> {
        let count = match pages {
            Some(count) => count,
            None => self.page_count(pdf_path)?,
        };

        let mut results = Vec::with_capacity(count as usize);
        for page in 1..=count {
            match self.ocr_pdf_page(pdf_path, page) {
                Ok(result) => results.push(result),
                Err(e @ OcrError::BackendNotAvailable(_)) => return Err(e),
                Err(e) => tracing::warn!("OCR failed for page {}: {}", page, e),
            }
        }
        Ok(results)
    }
}
