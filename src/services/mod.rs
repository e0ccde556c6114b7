//! Service layer.

pub mod batch;

pub use batch::{discover_categories, BatchProcessor, CategoryStats};
