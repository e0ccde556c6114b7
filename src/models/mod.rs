//! Domain models.

mod category;
mod document;

pub use category::{catalog, catalog_name, Category, PROCESSED_SUFFIX};
pub use document::{Extraction, ExtractionRecord, ExtractionStatus, PendingDocument};
