//! Shared helper functions for CLI commands.

use indicatif::ProgressStyle;

use julius::config::Settings;
use julius::repository::ExtractionRepository;

/// Open the result repository described by the settings.
pub fn open_repository(settings: &Settings) -> anyhow::Result<ExtractionRepository> {
    settings.ensure_directories()?;
    Ok(ExtractionRepository::open(
        &settings.database_path,
        &settings.table,
    )?)
}

/// Progress bar style shared by long-running commands.
pub fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░")
}

/// Truncate a string for display, appending "..." when cut.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
