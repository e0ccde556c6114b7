//! Tesseract OCR backend.
//!
//! Counts pages with `pdfinfo`, renders each page with `pdftoppm` (Poppler)
//! and recognizes it with the `tesseract` command-line tool.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::Instant;

use tempfile::TempDir;

use super::backend::{OcrBackend, OcrConfig, OcrError, OcrResult};
use super::tools::check_binary;

/// Prefix handed to pdftoppm; it appends `-<page>.png`.
const IMAGE_PREFIX: &str = "page";

/// Map a finished command to its stdout, or to the matching error.
fn handle_cmd_output(
    result: std::io::Result<Output>,
    tool_hint: &str,
    error_prefix: &str,
) -> Result<String, OcrError> {
    match result {
        Ok(output) if output.status.success() => {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(OcrError::OcrFailed(format!(
                "{}: {}",
                error_prefix,
                stderr.trim()
            )))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(OcrError::BackendNotAvailable(tool_hint.to_string()))
        }
        Err(e) => Err(OcrError::Io(e)),
    }
}

/// Tesseract OCR backend.
pub struct TesseractBackend {
    config: OcrConfig,
}

impl TesseractBackend {
    /// Create a new Tesseract backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: OcrConfig::default(),
        }
    }

    /// Create a new Tesseract backend with custom configuration.
    pub fn with_config(config: OcrConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    fn run_tesseract(&self, image_path: &Path) -> Result<String, OcrError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.config.language])
            .output();

        handle_cmd_output(
            output,
            "tesseract not found (install tesseract-ocr)",
            "tesseract failed",
        )
    }

    /// Render one page of a PDF to a PNG file in `output_dir`.
    fn render_page(&self, pdf_path: &Path, page: u32, output_dir: &Path) -> Result<(), OcrError> {
        let dpi = self.config.dpi.to_string();
        let page = page.to_string();
        let output = Command::new("pdftoppm")
            .args(["-png", "-r", &dpi, "-f", &page, "-l", &page])
            .arg(pdf_path)
            .arg(output_dir.join(IMAGE_PREFIX))
            .output();

        handle_cmd_output(
            output,
            "pdftoppm not found (install poppler-utils)",
            "pdftoppm failed to convert PDF",
        )
        .map(|_| ())
    }

    /// List rendered page images in page order.
    fn rendered_pages(&self, output_dir: &Path) -> Result<Vec<(u32, PathBuf)>, OcrError> {
        let mut pages: Vec<(u32, PathBuf)> = std::fs::read_dir(output_dir)?
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let path = e.path();
                let page = page_number_from_image(&path)?;
                Some((page, path))
            })
            .collect();
        pages.sort_by_key(|(page, _)| *page);
        Ok(pages)
    }
}

/// Parse the page number out of a pdftoppm file name (`page-7.png`, `page-007.png`).
fn page_number_from_image(path: &Path) -> Option<u32> {
    if path.extension()? != "png" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let number = stem.strip_prefix(IMAGE_PREFIX)?.strip_prefix('-')?;
    number.parse().ok()
}

/// Read the `Pages:` line of `pdfinfo` output.
fn parse_page_count(pdfinfo_output: &str) -> Option<u32> {
    pdfinfo_output
        .lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|count| count.trim().parse().ok())
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for TesseractBackend {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        check_binary("tesseract") && check_binary("pdftoppm") && check_binary("pdfinfo")
    }

    fn availability_hint(&self) -> String {
        if !check_binary("tesseract") {
            "Tesseract not installed. Install with: apt install tesseract-ocr".to_string()
        } else if !check_binary("pdftoppm") || !check_binary("pdfinfo") {
            "pdftoppm/pdfinfo not installed. Install with: apt install poppler-utils".to_string()
        } else {
            "Tesseract is available".to_string()
        }
    }

    fn page_count(&self, pdf_path: &Path) -> Result<u32, OcrError> {
        let output = Command::new("pdfinfo").arg(pdf_path).output();
        let stdout = handle_cmd_output(
            output,
            "pdfinfo not found (install poppler-utils)",
            "pdfinfo failed",
        )?;

        parse_page_count(&stdout)
            .ok_or_else(|| OcrError::OcrFailed("pdfinfo reported no page count".to_string()))
    }

    fn ocr_pdf_page(&self, pdf_path: &Path, page: u32) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let temp_dir = TempDir::new()?;
        self.render_page(pdf_path, page, temp_dir.path())?;

        let image_path = self
            .rendered_pages(temp_dir.path())?
            .into_iter()
            .find(|(rendered, _)| *rendered == page)
            .map(|(_, path)| path)
            .ok_or_else(|| OcrError::OcrFailed(format!("No image generated for page {}", page)))?;

        let text = self.run_tesseract(&image_path)?;
        Ok(OcrResult {
            page,
            text,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}
