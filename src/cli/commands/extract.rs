//! Batch extraction command.

use anyhow::Context;
use console::style;
use indicatif::ProgressBar;

use julius::config::Settings;
use julius::models::Category;
use julius::ocr::TextExtractor;
use julius::services::{discover_categories, BatchProcessor, CategoryStats};

use super::helpers::{bar_style, open_repository, truncate};

/// Extract text from pending documents in the given categories (all when empty).
pub async fn cmd_extract(
    settings: &Settings,
    categories: &[String],
    show_progress: bool,
) -> anyhow::Result<()> {
    let settings = settings.clone();
    let requested = parse_categories(categories)?;

    // Extraction is CPU and subprocess bound; keep it off the async runtime.
    let (per_category, totals) =
        tokio::task::spawn_blocking(move || run_batch(&settings, requested, show_progress))
            .await??;

    if per_category.is_empty() {
        println!("{} No categories to process", style("!").yellow());
        return Ok(());
    }

    println!("\n{}", style("Extraction Summary").bold());
    println!("{}", "-".repeat(60));
    println!(
        "  {:<28} {:>7} {:>7} {:>5} {:>7}",
        "Category", "Total", "OK", "OCR", "Failed"
    );
    for (category, stats) in &per_category {
        print_row(&truncate(&category.to_string(), 28), stats);
    }
    println!("{}", "-".repeat(60));
    print_row("Total", &totals);

    println!();
    if totals.failed == 0 {
        println!(
            "{} {} documents extracted",
            style("✓").green(),
            totals.succeeded
        );
    } else {
        println!(
            "{} {} documents failed and were left in their folders",
            style("!").yellow(),
            totals.failed
        );
    }

    Ok(())
}

/// Parse category arguments, rejecting processed folders.
fn parse_categories(args: &[String]) -> anyhow::Result<Vec<Category>> {
    args.iter()
        .map(|arg| {
            Category::parse(arg).ok_or_else(|| {
                anyhow::anyhow!("{:?} is not a pending category folder", arg)
            })
        })
        .collect()
}

fn run_batch(
    settings: &Settings,
    requested: Vec<Category>,
    show_progress: bool,
) -> anyhow::Result<(Vec<(Category, CategoryStats)>, CategoryStats)> {
    let root = &settings.documents_dir;
    let categories = if requested.is_empty() {
        discover_categories(root)
            .with_context(|| format!("Cannot list category folders in {}", root.display()))?
    } else {
        requested
    };

    let extractor = TextExtractor::from_config(&settings.extraction);
    let repo = open_repository(settings)?;

    tracing::info!(
        "Extracting {} categories from {} into {} (OCR {})",
        categories.len(),
        root.display(),
        settings.database_path.display(),
        if extractor.ocr_enabled() { "on" } else { "off" }
    );

    let mut processor = BatchProcessor::new(&extractor, &repo, root);
    let progress = show_progress.then(|| {
        let pb = ProgressBar::new(0);
        pb.set_style(bar_style());
        pb
    });
    if let Some(ref pb) = progress {
        processor = processor.with_progress(pb.clone());
    }

    let result = processor.process_all(&categories);

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    Ok(result)
}

fn print_row(label: &str, stats: &CategoryStats) {
    let failed = if stats.failed > 0 {
        style(stats.failed.to_string()).red()
    } else {
        style(stats.failed.to_string()).dim()
    };
    println!(
        "  {:<28} {:>7} {:>7} {:>5} {:>7}",
        label,
        stats.attempted,
        style(stats.succeeded).green(),
        stats.ocr_count,
        failed
    );
}
