//! OCR tool availability check.

use console::style;

use julius::config::Settings;
use julius::ocr::{check_tools, OcrBackend, OcrConfig, TesseractBackend};

/// Report which external OCR tools are installed.
pub fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    println!("\n{}", style("OCR Tool Status").bold());
    println!("{}", "-".repeat(50));

    println!("\n{}", style("Tools:").cyan());
    let mut all_found = true;
    for (tool, available) in check_tools() {
        let status = if available {
            style("✓ found").green()
        } else {
            all_found = false;
            style("✗ not found").red()
        };
        println!("  {:<15} {}", tool, status);
    }

    println!("\n{}", style("Backend:").cyan());
    let tesseract = TesseractBackend::with_config(OcrConfig {
        language: settings.extraction.ocr_language.clone(),
        dpi: settings.extraction.dpi,
    });
    let status = if tesseract.is_available() {
        style("✓ available").green()
    } else {
        style("✗ not available").red()
    };
    println!("  {:<15} {}", "Tesseract", status);
    println!(
        "  {:<15} {} at {} dpi",
        "",
        style(&tesseract.config().language).dim(),
        tesseract.config().dpi
    );
    if !settings.extraction.ocr {
        println!("  {}", style("OCR fallback is disabled in config").yellow());
    }

    println!();
    if all_found {
        println!("{} OCR fallback is available", style("✓").green());
    } else {
        println!(
            "{} Some tools are missing. Scanned PDFs will be marked failed until they are installed:",
            style("!").yellow()
        );
        println!("  - pdftoppm, pdfinfo: poppler-utils package");
        println!("  - tesseract: tesseract-ocr package (with por and eng language data)");
    }

    Ok(())
}
