//! Text extraction with OCR fallback.
//!
//! Every input yields exactly one [`Extraction`]: errors inside a pass only
//! mean that pass produced nothing.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use lopdf::Document;
use thiserror::Error;
use tracing::{debug, warn};

use super::backend::{OcrBackend, OcrConfig};
use super::tesseract::TesseractBackend;
use crate::config::ExtractionConfig;
use crate::models::Extraction;

/// Results at or below this many characters count as no text.
pub const DEFAULT_MIN_CHARS: usize = 50;

/// Header placed before each OCR'd page's text.
pub fn page_marker(page: u32) -> String {
    format!("--- Página {} ---", page)
}

/// Why the embedded-text pass produced nothing.
#[derive(Debug, Error)]
enum DirectError {
    #[error("cannot read PDF: {0}")]
    Load(#[source] lopdf::Error),

    #[error("PDF is encrypted")]
    Encrypted,

    #[error("text extraction failed on page {page}: {source}")]
    Page {
        page: u32,
        #[source]
        source: lopdf::Error,
    },

    #[error("PDF parser panicked")]
    Panicked,
}

/// Embedded text of a document.
struct DirectText {
    text: String,
    pages: u32,
}

/// Text extractor: embedded text first, OCR as fallback.
pub struct TextExtractor {
    /// Extracted text must be longer than this to count as a result.
    min_chars: usize,
    /// OCR backend, `None` when OCR is disabled or unavailable.
    ocr: Option<Box<dyn OcrBackend>>,
}

impl TextExtractor {
    /// Create an extractor. The OCR backend's availability is checked once
    /// here; an unavailable backend is dropped and extraction runs direct-only.
    pub fn new(ocr: Option<Box<dyn OcrBackend>>) -> Self {
        let ocr = ocr.and_then(|backend| {
            if backend.is_available() {
                Some(backend)
            } else {
                warn!(
                    "OCR backend {} unavailable, continuing without OCR: {}",
                    backend.name(),
                    backend.availability_hint()
                );
                None
            }
        });

        Self {
            min_chars: DEFAULT_MIN_CHARS,
            ocr,
        }
    }

    /// Create an extractor that never attempts OCR.
    pub fn direct_only() -> Self {
        Self::new(None)
    }

    /// Build the extractor described by the configuration (Tesseract for OCR).
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let ocr: Option<Box<dyn OcrBackend>> = if config.ocr {
            Some(Box::new(TesseractBackend::with_config(OcrConfig {
                language: config.ocr_language.clone(),
                dpi: config.dpi,
            })))
        } else {
            None
        };
        Self::new(ocr).with_min_chars(config.min_chars)
    }

    /// Set the minimum character threshold.
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    pub fn min_chars(&self) -> usize {
        self.min_chars
    }

    /// Whether the OCR fallback can run.
    pub fn ocr_enabled(&self) -> bool {
        self.ocr.is_some()
    }

    /// Extract text from a PDF and classify the outcome.
    pub fn extract(&self, path: &Path) -> Extraction {
        let direct = match direct_text(path) {
            Ok(direct) => {
                debug!(
                    "Direct pass on {}: {} chars over {} pages",
                    path.display(),
                    char_count(&direct.text),
                    direct.pages
                );
                Some(direct)
            }
            Err(e) => {
                debug!("Direct pass on {} failed: {}", path.display(), e);
                None
            }
        };

        let known_pages = match direct {
            Some(direct) if self.exceeds_threshold(&direct.text) => {
                return Extraction::direct(direct.text, direct.pages);
            }
            Some(direct) => Some(direct.pages),
            None => None,
        };

        let Some(backend) = self.ocr.as_deref() else {
            return Extraction::failed();
        };

        self.ocr_pass(backend, path, known_pages)
            .unwrap_or_else(Extraction::failed)
    }

    fn ocr_pass(
        &self,
        backend: &dyn OcrBackend,
        path: &Path,
        known_pages: Option<u32>,
    ) -> Option<Extraction> {
        let results = match backend.ocr_pdf(path, known_pages) {
            Ok(results) => results,
            Err(e) => {
                debug!("OCR pass on {} failed: {}", path.display(), e);
                return None;
            }
        };

        let pages = results.len() as u32;
        let mut text = String::new();
        let mut recognized = 0;

        for result in results {
            let page_text = result.text.trim();
            if page_text.is_empty() {
                continue;
            }
            recognized += char_count(page_text);

            if !text.is_empty() {
                text.push_str("\n\n");
            }
            text.push_str(&page_marker(result.page));
            text.push('\n');
            text.push_str(page_text);
        }

        debug!(
            "OCR pass on {} ({}): {} chars over {} pages",
            path.display(),
            backend.name(),
            recognized,
            pages
        );

        (recognized > self.min_chars).then(|| Extraction::ocr(text, pages))
    }

    fn exceeds_threshold(&self, text: &str) -> bool {
        char_count(text) > self.min_chars
    }
}

fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Read the embedded text layer, pages joined by newlines.
fn direct_text(path: &Path) -> Result<DirectText, DirectError> {
    // lopdf can panic on malformed cross-reference tables.
    panic::catch_unwind(AssertUnwindSafe(|| read_text_layer(path)))
        .unwrap_or(Err(DirectError::Panicked))
}

fn read_text_layer(path: &Path) -> Result<DirectText, DirectError> {
    let doc = Document::load(path).map_err(DirectError::Load)?;
    if doc.is_encrypted() {
        return Err(DirectError::Encrypted);
    }

    let pages = doc.get_pages();
    let mut page_texts = Vec::with_capacity(pages.len());
    for &page in pages.keys() {
        let text = doc
            .extract_text(&[page])
            .map_err(|source| DirectError::Page { page, source })?;
        page_texts.push(text);
    }

    Ok(DirectText {
        text: page_texts.join("\n").trim().to_string(),
        pages: pages.len() as u32,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;
    use crate::models::ExtractionStatus;
    use crate::ocr::{OcrError, OcrResult};

    /// Backend that reports itself unavailable and counts any use.
    struct OfflineBackend {
        calls: Arc<AtomicUsize>,
    }

    impl OcrBackend for OfflineBackend {
        fn name(&self) -> &'static str {
            "offline"
        }

        fn is_available(&self) -> bool {
            false
        }

        fn availability_hint(&self) -> String {
            "not installed".to_string()
        }

        fn page_count(&self, _pdf_path: &Path) -> Result<u32, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(1)
        }

        fn ocr_pdf_page(&self, _pdf_path: &Path, page: u32) -> Result<OcrResult, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(OcrResult {
                page,
                text: "x".repeat(200),
                processing_time_ms: 0,
            })
        }
    }

    #[test]
    fn test_empty_file_fails_without_panicking() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.pdf");
        std::fs::write(&path, b"").unwrap();

        let result = TextExtractor::direct_only().extract(&path);
        assert_eq!(result.status, ExtractionStatus::Failed);
        assert!(result.text.is_empty());
    }

    #[test]
    fn test_garbage_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.pdf");
        std::fs::write(&path, b"%PDF-1.4\nthis is not really a pdf\n%%EOF").unwrap();

        let result = TextExtractor::direct_only().extract(&path);
        assert_eq!(result, Extraction::failed());
    }

    #[test]
    fn test_missing_file_fails() {
        let result = TextExtractor::direct_only().extract(Path::new("/nonexistent/doc.pdf"));
        assert_eq!(result.status, ExtractionStatus::Failed);
    }

    #[test]
    fn test_unavailable_backend_is_never_called() {
        let calls = Arc::new(AtomicUsize::new(0));
        let extractor = TextExtractor::new(Some(Box::new(OfflineBackend {
            calls: calls.clone(),
        })));
        assert!(!extractor.ocr_enabled());

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();

        assert_eq!(extractor.extract(&path).status, ExtractionStatus::Failed);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_page_marker_format() {
        assert_eq!(page_marker(3), "--- Página 3 ---");
    }

    #[test]
    fn test_from_config_respects_ocr_switch() {
        let config = ExtractionConfig {
            ocr: false,
            min_chars: 10,
            ..ExtractionConfig::default()
        };
        let extractor = TextExtractor::from_config(&config);
        assert!(!extractor.ocr_enabled());
        assert_eq!(extractor.min_chars(), 10);
    }
}
