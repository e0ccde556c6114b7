//! Batch extraction over the category folder tree.
//!
//! For each pending PDF: extract, persist, and on success move the file to
//! the category's processed folder. The database row is the source of
//! truth; the move only happens after the row is written.

use std::fs;
use std::io;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use tracing::{debug, error, info, warn};

use crate::models::{Category, ExtractionStatus, PendingDocument};
use crate::ocr::TextExtractor;
use crate::repository::ExtractionRepository;

/// Counters for one category run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryStats {
    pub attempted: usize,
    /// Documents with persisted text, OCR-assisted ones included.
    pub succeeded: usize,
    pub failed: usize,
    /// Documents whose text came from OCR.
    pub ocr_count: usize,
}

impl CategoryStats {
    fn record(&mut self, status: ExtractionStatus) {
        self.attempted += 1;
        match status {
            ExtractionStatus::DirectSuccess => self.succeeded += 1,
            ExtractionStatus::OcrSuccess => {
                self.succeeded += 1;
                self.ocr_count += 1;
            }
            ExtractionStatus::Failed => self.failed += 1,
        }
    }
}

impl AddAssign for CategoryStats {
    fn add_assign(&mut self, other: Self) {
        self.attempted += other.attempted;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.ocr_count += other.ocr_count;
    }
}

/// List category folders under the documents root, sorted by key.
/// Processed folders and plain files are skipped.
pub fn discover_categories(root: &Path) -> io::Result<Vec<Category>> {
    let mut categories: Vec<Category> = fs::read_dir(root)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| !Category::is_processed_folder(name))
        .map(Category::new)
        .collect();
    categories.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(categories)
}

/// List the PDFs waiting in `dir`, in file name order.
/// A missing folder has nothing pending.
pub fn pending_pdfs(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Move a file into `dest_dir`, keeping its name. Falls back to copy and
/// remove only when the rename crosses filesystems.
fn relocate(src: &Path, dest_dir: &Path) -> io::Result<PathBuf> {
    let file_name = src.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "source path has no file name")
    })?;
    fs::create_dir_all(dest_dir)?;
    let dest = dest_dir.join(file_name);

    match fs::rename(src, &dest) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(
                "{} and {} are on different devices, copying",
                src.display(),
                dest.display()
            );
            fs::copy(src, &dest)?;
            fs::remove_file(src)?;
        }
        Err(e) => return Err(e),
    }
    Ok(dest)
}

/// Applies the extractor to every pending document of a category.
///
/// Borrows its extractor and repository; the caller owns both for the
/// duration of the batch.
pub struct BatchProcessor<'a> {
    extractor: &'a TextExtractor,
    repo: &'a ExtractionRepository,
    root: PathBuf,
    progress: Option<ProgressBar>,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(extractor: &'a TextExtractor, repo: &'a ExtractionRepository, root: &Path) -> Self {
        Self {
            extractor,
            repo,
            root: root.to_path_buf(),
            progress: None,
        }
    }

    /// Report per-document progress on a progress bar.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Documents currently pending for a category.
    pub fn pending_documents(&self, category: &Category) -> io::Result<Vec<PendingDocument>> {
        Ok(pending_pdfs(&category.pending_dir(&self.root))?
            .iter()
            .filter_map(|path| PendingDocument::from_path(path, &category.key))
            .collect())
    }

    /// Process every pending document of a category.
    ///
    /// Only an unreadable pending folder is an error; per-document
    /// failures are counted and logged.
    pub fn process_category(&self, category: &Category) -> io::Result<CategoryStats> {
        let documents = self.pending_documents(category)?;
        let processed_dir = category.processed_dir(&self.root);
        info!("Processing {}: {} pending documents", category, documents.len());

        if let Some(ref pb) = self.progress {
            pb.set_length(documents.len() as u64);
            pb.set_position(0);
        }

        let mut stats = CategoryStats::default();
        for doc in &documents {
            if let Some(ref pb) = self.progress {
                pb.set_message(doc.identifier.clone());
            }

            let status = self.process_document(doc, &processed_dir);
            stats.record(status);

            if let Some(ref pb) = self.progress {
                pb.inc(1);
            }
        }

        info!(
            "Finished {}: {} attempted, {} succeeded ({} via OCR), {} failed",
            category.key, stats.attempted, stats.succeeded, stats.ocr_count, stats.failed
        );
        Ok(stats)
    }

    /// Process categories in order, returning per-category stats and totals.
    /// A category whose folder cannot be read is logged and skipped.
    pub fn process_all(&self, categories: &[Category]) -> (Vec<(Category, CategoryStats)>, CategoryStats) {
        let mut per_category = Vec::with_capacity(categories.len());
        let mut totals = CategoryStats::default();

        for category in categories {
            match self.process_category(category) {
                Ok(stats) => {
                    totals += stats;
                    per_category.push((category.clone(), stats));
                }
                Err(e) => error!("Cannot read pending folder for {}: {}", category.key, e),
            }
        }
        (per_category, totals)
    }

    /// Extract, persist, relocate. Returns the status that was counted.
    fn process_document(&self, doc: &PendingDocument, processed_dir: &Path) -> ExtractionStatus {
        let extraction = self.extractor.extract(&doc.path);
        debug!(
            "{} -> {} ({} chars)",
            doc.identifier,
            extraction.status,
            extraction.text.chars().count()
        );

        if let Err(e) = self.repo.upsert_in_category(
            &doc.identifier,
            &doc.category,
            &extraction.text,
            extraction.status,
        ) {
            error!("Failed to save result for {}: {}", doc.identifier, e);
            return ExtractionStatus::Failed;
        }

        if extraction.is_success() {
            if let Err(e) = relocate(&doc.path, processed_dir) {
                warn!(
                    "Saved {} but could not move it to {}: {}",
                    doc.identifier,
                    processed_dir.display(),
                    e
                );
            }
        }

        extraction.status
    }
}
