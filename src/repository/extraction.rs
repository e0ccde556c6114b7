//! Extraction result repository.
//!
//! One row per document, keyed by its identifier. Writes are upserts, so
//! re-processing a document replaces its text, status and timestamp.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, Row};

use super::{connect, parse_datetime, to_option, validate_identifier, RepositoryError, Result};
use crate::models::{ExtractionRecord, ExtractionStatus};

/// Default table receiving extraction results.
pub const DEFAULT_TABLE: &str = "extracted_texts";

/// SQLite-backed store of extraction results.
///
/// Owns a single connection for its lifetime; dropping the repository
/// closes it.
pub struct ExtractionRepository {
    conn: Connection,
    table: String,
}

impl ExtractionRepository {
    /// Open (creating if needed) the store at `db_path`.
    pub fn open(db_path: &Path, table: &str) -> Result<Self> {
        let table = validate_identifier(table)?.to_string();
        let repo = Self {
            conn: connect(db_path)?,
            table,
        };
        repo.init_schema()?;
        Ok(repo)
    }

    /// Open a private in-memory store.
    pub fn open_in_memory(table: &str) -> Result<Self> {
        let table = validate_identifier(table)?.to_string();
        let repo = Self {
            conn: Connection::open_in_memory()?,
            table,
        };
        repo.init_schema()?;
        Ok(repo)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS "{table}" (
                identifier TEXT PRIMARY KEY,
                category TEXT,
                extracted_text TEXT,
                status TEXT NOT NULL,
                extracted_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS "idx_{table}_status" ON "{table}"(status);
            "#,
            table = self.table
        ))?;
        Ok(())
    }

    /// Insert or replace the result for `identifier`.
    pub fn upsert(&self, identifier: &str, text: &str, status: ExtractionStatus) -> Result<()> {
        self.write(identifier, None, text, status)
    }

    /// Like [`upsert`](Self::upsert), also recording the document's category.
    pub fn upsert_in_category(
        &self,
        identifier: &str,
        category: &str,
        text: &str,
        status: ExtractionStatus,
    ) -> Result<()> {
        self.write(identifier, Some(category), text, status)
    }

    fn write(
        &self,
        identifier: &str,
        category: Option<&str>,
        text: &str,
        status: ExtractionStatus,
    ) -> Result<()> {
        // Failed rows carry no text; successful rows must carry some.
        let text = match status {
            ExtractionStatus::Failed => None,
            _ if text.trim().is_empty() => {
                return Err(RepositoryError::MissingText {
                    identifier: identifier.to_string(),
                    status: status.to_string(),
                });
            }
            _ => Some(text),
        };

        self.conn.execute(
            &format!(
                r#"
                INSERT INTO "{table}" (identifier, category, extracted_text, status, extracted_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(identifier) DO UPDATE SET
                    category = COALESCE(excluded.category, "{table}".category),
                    extracted_text = excluded.extracted_text,
                    status = excluded.status,
                    extracted_at = excluded.extracted_at
                "#,
                table = self.table
            ),
            params![
                identifier,
                category,
                text,
                status.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get the record for an identifier.
    pub fn get(&self, identifier: &str) -> Result<Option<ExtractionRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT * FROM \"{}\" WHERE identifier = ?",
            self.table
        ))?;
        to_option(stmt.query_row(params![identifier], row_to_record))
    }

    /// Get all records ordered by identifier.
    pub fn all(&self) -> Result<Vec<ExtractionRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM \"{}\" ORDER BY identifier", self.table))?;
        let records = stmt
            .query_map([], row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// `(identifier, extracted_text)` of every successful record, ordered by
    /// identifier. This is what the embedding stage consumes.
    pub fn list_texts(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT identifier, extracted_text FROM \"{}\" \
             WHERE status != ?1 AND extracted_text IS NOT NULL \
             ORDER BY identifier",
            self.table
        ))?;
        let texts = stmt
            .query_map(params![ExtractionStatus::Failed.as_str()], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(texts)
    }

    /// Total number of records.
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM \"{}\"", self.table),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Record counts per status. Every status is present, possibly zero.
    pub fn count_by_status(&self) -> Result<BTreeMap<&'static str, u64>> {
        let mut counts: BTreeMap<&'static str, u64> = ExtractionStatus::ALL
            .iter()
            .map(|status| (status.as_str(), 0))
            .collect();

        let mut stmt = self.conn.prepare(&format!(
            "SELECT status, COUNT(*) FROM \"{}\" GROUP BY status",
            self.table
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        for row in rows {
            let (status, count) = row?;
            match ExtractionStatus::from_str(&status) {
                Some(status) => {
                    *counts.entry(status.as_str()).or_insert(0) += count as u64;
                }
                None => tracing::warn!("Ignoring unknown status {:?} in {}", status, self.table),
            }
        }
        Ok(counts)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<ExtractionRecord> {
    Ok(ExtractionRecord {
        identifier: row.get("identifier")?,
        category: row.get("category")?,
        extracted_text: row.get("extracted_text")?,
        status: ExtractionStatus::from_str(&row.get::<_, String>("status")?)
            .unwrap_or(ExtractionStatus::Failed),
        extracted_at: parse_datetime(&row.get::<_, String>("extracted_at")?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> ExtractionRepository {
        ExtractionRepository::open_in_memory(DEFAULT_TABLE).unwrap()
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let repo = repo();
        repo.upsert("edital_01.pdf", "first text", ExtractionStatus::DirectSuccess)
            .unwrap();
        repo.upsert("edital_01.pdf", "second text", ExtractionStatus::OcrSuccess)
            .unwrap();

        assert_eq!(repo.count().unwrap(), 1);
        let record = repo.get("edital_01.pdf").unwrap().unwrap();
        assert_eq!(record.extracted_text.as_deref(), Some("second text"));
        assert_eq!(record.status, ExtractionStatus::OcrSuccess);
    }

    #[test]
    fn test_upsert_refreshes_timestamp() {
        let repo = repo();
        repo.upsert("a.pdf", "text", ExtractionStatus::DirectSuccess).unwrap();
        let first = repo.get("a.pdf").unwrap().unwrap().extracted_at;
        repo.upsert("a.pdf", "text", ExtractionStatus::DirectSuccess).unwrap();
        let second = repo.get("a.pdf").unwrap().unwrap().extracted_at;
        assert!(second >= first);
        assert!(first > chrono::DateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_failed_rows_have_no_text() {
        let repo = repo();
        repo.upsert("scan.pdf", "leftover", ExtractionStatus::Failed).unwrap();
        let record = repo.get("scan.pdf").unwrap().unwrap();
        assert_eq!(record.status, ExtractionStatus::Failed);
        assert_eq!(record.extracted_text, None);
    }

    #[test]
    fn test_success_requires_text() {
        let repo = repo();
        let err = repo
            .upsert("blank.pdf", "  \n", ExtractionStatus::DirectSuccess)
            .unwrap_err();
        assert!(matches!(err, RepositoryError::MissingText { .. }));
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_failure_overwrites_previous_text() {
        let repo = repo();
        repo.upsert("a.pdf", "old text", ExtractionStatus::DirectSuccess).unwrap();
        repo.upsert("a.pdf", "", ExtractionStatus::Failed).unwrap();
        let record = repo.get("a.pdf").unwrap().unwrap();
        assert_eq!(record.extracted_text, None);
        assert_eq!(record.status, ExtractionStatus::Failed);
    }

    #[test]
    fn test_category_kept_when_upsert_omits_it() {
        let repo = repo();
        repo.upsert_in_category("a.pdf", "id_8", "text", ExtractionStatus::DirectSuccess)
            .unwrap();
        repo.upsert("a.pdf", "newer", ExtractionStatus::DirectSuccess).unwrap();
        let record = repo.get("a.pdf").unwrap().unwrap();
        assert_eq!(record.category.as_deref(), Some("id_8"));
        assert_eq!(record.extracted_text.as_deref(), Some("newer"));
    }

    #[test]
    fn test_get_missing() {
        assert!(repo().get("nope.pdf").unwrap().is_none());
    }

    #[test]
    fn test_list_texts_skips_failed_and_orders() {
        let repo = repo();
        repo.upsert("c.pdf", "gamma", ExtractionStatus::OcrSuccess).unwrap();
        repo.upsert("a.pdf", "alpha", ExtractionStatus::DirectSuccess).unwrap();
        repo.upsert("b.pdf", "", ExtractionStatus::Failed).unwrap();

        let texts = repo.list_texts().unwrap();
        assert_eq!(
            texts,
            vec![
                ("a.pdf".to_string(), "alpha".to_string()),
                ("c.pdf".to_string(), "gamma".to_string()),
            ]
        );
    }

    #[test]
    fn test_count_by_status() {
        let repo = repo();
        repo.upsert("a.pdf", "alpha", ExtractionStatus::DirectSuccess).unwrap();
        repo.upsert("b.pdf", "beta", ExtractionStatus::DirectSuccess).unwrap();
        repo.upsert("c.pdf", "", ExtractionStatus::Failed).unwrap();

        let counts = repo.count_by_status().unwrap();
        assert_eq!(counts["direct_success"], 2);
        assert_eq!(counts["ocr_success"], 0);
        assert_eq!(counts["failed"], 1);
    }

    #[test]
    fn test_invalid_table_rejected() {
        let result = ExtractionRepository::open_in_memory("texts; DROP TABLE x");
        assert!(matches!(result, Err(RepositoryError::InvalidIdentifier(_))));
    }

    #[test]
    fn test_keyword_table_names_work() {
        for table in ["order", "select", "group"] {
            let repo = ExtractionRepository::open_in_memory(table).unwrap();
            repo.upsert("a.pdf", "alpha", ExtractionStatus::DirectSuccess).unwrap();
            repo.upsert("a.pdf", "beta", ExtractionStatus::DirectSuccess).unwrap();
            assert_eq!(repo.count().unwrap(), 1);
            assert_eq!(repo.all().unwrap().len(), 1);
            assert_eq!(repo.list_texts().unwrap()[0].1, "beta");
            assert_eq!(repo.count_by_status().unwrap()["direct_success"], 1);
            assert!(repo.get("a.pdf").unwrap().is_some());
        }
    }

    #[test]
    fn test_reopen_keeps_rows() {
        let dir = tempfile::TempDir::new().unwrap();
        let db_path = dir.path().join("julius.db");
        {
            let repo = ExtractionRepository::open(&db_path, "textos").unwrap();
            repo.upsert("a.pdf", "alpha", ExtractionStatus::DirectSuccess).unwrap();
        }
        let repo = ExtractionRepository::open(&db_path, "textos").unwrap();
        assert_eq!(repo.table(), "textos");
        assert_eq!(repo.count().unwrap(), 1);
    }
}
