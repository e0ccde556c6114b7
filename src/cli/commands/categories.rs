//! Category folder listing.

use console::style;

use julius::config::Settings;
use julius::services::batch::pending_pdfs;
use julius::services::discover_categories;

/// List category folders with their pending and processed document counts.
pub fn cmd_categories(settings: &Settings) -> anyhow::Result<()> {
    let root = &settings.documents_dir;
    if !root.is_dir() {
        println!(
            "{} Documents folder {} does not exist",
            style("!").yellow(),
            root.display()
        );
        return Ok(());
    }

    let categories = discover_categories(root)?;
    if categories.is_empty() {
        println!("No category folders in {}", root.display());
        return Ok(());
    }

    println!("\n{} {}", style("Categories in").bold(), root.display());
    println!("{}", "-".repeat(70));
    println!(
        "  {:<10} {:<40} {:>8} {:>9}",
        "Folder", "Name", "Pending", "Processed"
    );

    let mut total_pending = 0;
    for category in &categories {
        let pending = pending_pdfs(&category.pending_dir(root))?.len();
        let processed = pending_pdfs(&category.processed_dir(root))?.len();
        total_pending += pending;

        let pending_cell = if pending > 0 {
            style(pending.to_string()).yellow()
        } else {
            style(pending.to_string()).dim()
        };
        println!(
            "  {:<10} {:<40} {:>8} {:>9}",
            category.key,
            category.name().unwrap_or("-"),
            pending_cell,
            processed
        );
    }

    println!("{}", "-".repeat(70));
    println!("  {} documents pending", total_pending);
    Ok(())
}
