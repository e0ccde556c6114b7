//! julius - text extraction pipeline for a municipal transparency archive.
//!
//! Takes the PDF folder tree produced by the portal scraper, extracts text
//! from every pending document (embedded text first, OCR as fallback),
//! records the outcome in SQLite and moves finished files aside.

// Model types use `from_str` methods that return Option<Self>,
// not Result<Self, Error> as std::str::FromStr requires.
#![allow(clippy::should_implement_trait)]

pub mod config;
pub mod models;
pub mod ocr;
pub mod repository;
pub mod services;
