//! Text extraction from PDF documents.
//!
//! Extraction runs in two passes:
//! - the embedded text layer, read in-process with lopdf
//! - OCR of rendered pages, through an [`OcrBackend`] (Tesseract by default)
//!
//! [`TextExtractor`] combines both and classifies every file as
//! `direct_success`, `ocr_success` or `failed`.

mod backend;
mod extractor;
mod tesseract;
mod tools;

pub use backend::{OcrBackend, OcrConfig, OcrError, OcrResult};
pub use extractor::{page_marker, TextExtractor, DEFAULT_MIN_CHARS};
pub use tesseract::TesseractBackend;
pub use tools::{check_binary, check_tools};
