//! Result status summary.

use console::style;

use julius::config::Settings;

use super::helpers::open_repository;

/// Show how many stored results are in each status.
pub fn cmd_status(settings: &Settings) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let counts = repo.count_by_status()?;
    let total: u64 = counts.values().sum();

    println!(
        "\n{} {} ({})",
        style("Extraction results in").bold(),
        settings.database_path.display(),
        repo.table()
    );
    println!("{}", "-".repeat(50));
    for (status, count) in &counts {
        println!("  {:<18} {:>8}", status, count);
    }
    println!("{}", "-".repeat(50));
    println!("  {:<18} {:>8}", style("total").bold(), total);

    Ok(())
}
