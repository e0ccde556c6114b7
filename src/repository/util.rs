//! Repository utilities.

use std::sync::LazyLock;

use regex::Regex;

use super::{RepositoryError, Result};

/// SQLite identifiers we are willing to splice into statements.
static IDENTIFIER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").unwrap());

/// Validate a table or column name before it is formatted into SQL.
///
/// Values are always bound as parameters; this guards the names SQLite
/// cannot bind. Callers still double-quote the name, since keywords pass.
pub fn validate_identifier(name: &str) -> Result<&str> {
    if IDENTIFIER_PATTERN.is_match(name) && !name.to_ascii_lowercase().starts_with("sqlite_") {
        Ok(name)
    } else {
        Err(RepositoryError::InvalidIdentifier(name.to_string()))
    }
}
