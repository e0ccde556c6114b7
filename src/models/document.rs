//! Document and extraction outcome models.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of a text extraction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// Text was read from the PDF's embedded text layer.
    DirectSuccess,
    /// Text was recognized from rendered page images.
    OcrSuccess,
    /// Neither pass produced usable text.
    Failed,
}

impl ExtractionStatus {
    pub const ALL: [ExtractionStatus; 3] = [
        ExtractionStatus::DirectSuccess,
        ExtractionStatus::OcrSuccess,
        ExtractionStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectSuccess => "direct_success",
            Self::OcrSuccess => "ocr_success",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "direct_success" => Some(Self::DirectSuccess),
            "ocr_success" => Some(Self::OcrSuccess),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed)
    }
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of running the extraction engine on one file.
///
/// `text` is empty exactly when `status` is [`ExtractionStatus::Failed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub status: ExtractionStatus,
    pub text: String,
    /// Pages seen by the pass that produced the text (0 on failure).
    pub pages: u32,
}

impl Extraction {
    pub fn direct(text: String, pages: u32) -> Self {
        Self {
            status: ExtractionStatus::DirectSuccess,
            text,
            pages,
        }
    }

    pub fn ocr(text: String, pages: u32) -> Self {
        Self {
            status: ExtractionStatus::OcrSuccess,
            text,
            pages,
        }
    }

    pub fn failed() -> Self {
        Self {
            status: ExtractionStatus::Failed,
            text: String::new(),
            pages: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// A PDF waiting in a category's pending folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDocument {
    /// Stable key, the file name as written by the scraper.
    pub identifier: String,
    /// Category key the file was found under.
    pub category: String,
    pub path: PathBuf,
}

impl PendingDocument {
    /// Build from a path inside a pending folder. Returns `None` for paths
    /// without a file name.
    pub fn from_path(path: &Path, category: &str) -> Option<Self> {
        let identifier = path.file_name()?.to_string_lossy().into_owned();
        Some(Self {
            identifier,
            category: category.to_string(),
            path: path.to_path_buf(),
        })
    }
}

/// A row read back from the extraction store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub identifier: String,
    pub category: Option<String>,
    pub extracted_text: Option<String>,
    pub status: ExtractionStatus,
    pub extracted_at: DateTime<Utc>,
}
