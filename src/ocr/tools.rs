//! External tool discovery.

/// Command-line tools the OCR pass shells out to.
const OCR_TOOLS: [&str; 3] = ["pdftoppm", "pdfinfo", "tesseract"];

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Report availability of every tool the OCR pass needs.
pub fn check_tools() -> Vec<(String, bool)> {
    OCR_TOOLS
        .iter()
        .map(|tool| (tool.to_string(), check_binary(tool)))
        .collect()
}
