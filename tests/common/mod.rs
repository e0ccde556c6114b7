//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use julius::ocr::{OcrBackend, OcrError, OcrResult};

/// Text long enough to clear the default direct threshold on its own.
pub const BODY_TEXT: &str =
    "Edital de licitacao numero 12 de 2024 para aquisicao de material escolar da rede municipal";

/// Write a PDF with one page per entry. `Some(text)` pages carry a text layer,
/// `None` pages have an empty content stream, like a scan without OCR.
pub fn write_pdf(path: &Path, pages: &[Option<&str>]) {
    save(build_pdf(pages), path);
}

/// Like [`write_pdf`], with a Standard security handler in the trailer.
/// The content streams stay readable; only the trailer marks the file encrypted.
pub fn write_encrypted_pdf(path: &Path, pages: &[Option<&str>]) {
    let mut doc = build_pdf(pages);
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "Length" => 40,
        "O" => Object::string_literal(vec![0x11u8; 32]),
        "U" => Object::string_literal(vec![0x22u8; 32]),
        "P" => -44,
    });
    doc.trailer.set("Encrypt", encrypt_id);
    doc.trailer.set(
        "ID",
        vec![
            Object::string_literal(vec![0x33u8; 16]),
            Object::string_literal(vec![0x33u8; 16]),
        ],
    );
    save(doc, path);
}

fn build_pdf(pages: &[Option<&str>]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let operations = match page {
            Some(text) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
            None => Vec::new(),
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("content encodes"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn save(mut doc: Document, path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    doc.save(path).expect("pdf saves");
}

/// OCR backend returning canned text, counting page calls.
pub struct StubOcr {
    /// Text recognized on every page, suffixed with the page number.
    /// Empty means every page comes back blank.
    pub page_text: String,
    /// Page count reported for files the renderer can "open" (non-empty ones).
    pub fallback_pages: u32,
    pub calls: Arc<AtomicUsize>,
    pub available: bool,
}

impl StubOcr {
    pub fn new(page_text: &str) -> Self {
        Self {
            page_text: page_text.to_string(),
            fallback_pages: 1,
            calls: Arc::new(AtomicUsize::new(0)),
            available: true,
        }
    }

    pub fn with_fallback_pages(mut self, pages: u32) -> Self {
        self.fallback_pages = pages;
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl OcrBackend for StubOcr {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn availability_hint(&self) -> String {
        "stub backend switched off".to_string()
    }

    fn page_count(&self, pdf_path: &Path) -> Result<u32, OcrError> {
        let len = std::fs::metadata(pdf_path)?.len();
        if len == 0 {
            return Err(OcrError::OcrFailed("cannot render an empty file".to_string()));
        }
        Ok(self.fallback_pages)
    }

    fn ocr_pdf_page(&self, _pdf_path: &Path, page: u32) -> Result<OcrResult, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = if self.page_text.is_empty() {
            String::new()
        } else {
            format!("{} {}", self.page_text, page)
        };
        Ok(OcrResult {
            page,
            text,
            processing_time_ms: 0,
        })
    }
}

pub fn call_count(calls: &Arc<AtomicUsize>) -> usize {
    calls.load(Ordering::SeqCst)
}
