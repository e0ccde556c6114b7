//! JSON export of stored results.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use console::style;

use julius::config::Settings;

use super::helpers::open_repository;

/// Write every stored record to `output` as `{"<table>": [records...]}`.
/// Nothing is written when the table is empty.
pub fn cmd_export(settings: &Settings, output: &Path) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let records = repo.all()?;

    if records.is_empty() {
        println!(
            "{} No records in {}, nothing exported",
            style("!").yellow(),
            repo.table()
        );
        return Ok(());
    }

    let mut document = BTreeMap::new();
    document.insert(repo.table().to_string(), &records);

    let writer = BufWriter::new(File::create(output)?);
    serde_json::to_writer_pretty(writer, &document)?;

    println!(
        "{} Exported {} records to {}",
        style("✓").green(),
        records.len(),
        output.display()
    );
    Ok(())
}
