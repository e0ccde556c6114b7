//! Configuration management.
//!
//! Settings are resolved in order of precedence: command-line flags,
//! environment variables, config file, defaults. Config files are
//! discovered with the prefer crate and parsed with serde.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ocr::DEFAULT_MIN_CHARS;
use crate::repository::DEFAULT_TABLE;

/// Default database filename inside the data directory.
pub const DEFAULT_DATABASE_FILENAME: &str = "julius.db";

/// Default documents subdirectory name (the scraper's download root).
const DOCUMENTS_SUBDIR: &str = "documentos";

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Extraction engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Text must be longer than this many characters to count.
    pub min_chars: usize,
    /// Tesseract language profile.
    pub ocr_language: String,
    /// Page rendering resolution for OCR.
    pub dpi: u32,
    /// Enable the OCR fallback.
    pub ocr: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHARS,
            ocr_language: "por+eng".to_string(),
            dpi: 300,
            ocr: true,
        }
    }
}

/// Configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Root of the category folder tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents_dir: Option<String>,
    /// SQLite database file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Table receiving extraction results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Where this config was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration, auto-discovering julius config files in
    /// standard locations. Falls back to defaults.
    pub async fn load() -> Self {
        match prefer::load("julius").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("{}; using defaults", e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// The format follows the extension: TOML, YAML, or JSON otherwise.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::parse(&contents, path)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        match ext {
            "toml" => toml::from_str(contents).map_err(|e| parse_error(e.to_string())),
            "yaml" | "yml" => {
                serde_yaml::from_str(contents).map_err(|e| parse_error(e.to_string()))
            }
            _ => serde_json::from_str(contents).map_err(|e| parse_error(e.to_string())),
        }
    }

    /// Directory relative paths are resolved against.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref documents_dir) = self.documents_dir {
            settings.documents_dir = self.resolve_path(documents_dir, base_dir);
        }
        if let Some(ref database) = self.database {
            settings.database_path = self.resolve_path(database, base_dir);
        }
        if let Some(ref table) = self.table {
            settings.table = table.clone();
        }
        settings.extraction = self.extraction.clone();
    }
}

/// Resolved application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root of the category folder tree.
    pub documents_dir: PathBuf,
    /// SQLite database holding extraction results.
    pub database_path: PathBuf,
    /// Result table name (validated when the repository opens).
    pub table: String,
    pub extraction: ExtractionConfig,
}

impl Default for Settings {
    fn default() -> Self {
        // Documents dir -> Home dir -> Current dir
        let data_dir = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("julius");

        Self {
            documents_dir: data_dir.join(DOCUMENTS_SUBDIR),
            database_path: data_dir.join(DEFAULT_DATABASE_FILENAME),
            table: DEFAULT_TABLE.to_string(),
            extraction: ExtractionConfig::default(),
        }
    }
}

impl Settings {
    /// Apply `JULIUS_*` environment overrides.
    pub fn apply_env(&mut self) {
        if let Some(dir) = env_value("JULIUS_DOCUMENTS_DIR") {
            tracing::debug!("Using JULIUS_DOCUMENTS_DIR from environment: {}", dir);
            self.documents_dir = PathBuf::from(shellexpand::tilde(&dir).as_ref());
        }
        if let Some(db) = env_value("JULIUS_DATABASE") {
            tracing::debug!("Using JULIUS_DATABASE from environment: {}", db);
            self.database_path = PathBuf::from(shellexpand::tilde(&db).as_ref());
        }
        if let Some(lang) = env_value("JULIUS_OCR_LANG") {
            self.extraction.ocr_language = lang;
        }
    }

    /// Ensure the database directory exists.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        if let Some(parent) = self.database_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create database directory '{}': {}",
                        parent.display(),
                        e
                    ),
                )
            })?;
        }
        Ok(())
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

/// Options controlling settings resolution, usually from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file (skips discovery).
    pub config_path: Option<PathBuf>,
    pub documents_dir: Option<PathBuf>,
    pub database: Option<PathBuf>,
    /// Force-disable the OCR fallback.
    pub no_ocr: bool,
}

/// Load settings with explicit options.
pub async fn load_settings(options: &LoadOptions) -> Result<Settings, ConfigError> {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await?,
        None => Config::load().await,
    };

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let base_dir = config.base_dir().unwrap_or_else(|| cwd.clone());

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);
    settings.apply_env();

    if let Some(ref dir) = options.documents_dir {
        settings.documents_dir = cwd.join(dir);
    }
    if let Some(ref db) = options.database {
        settings.database_path = cwd.join(db);
    }
    if options.no_ocr {
        settings.extraction.ocr = false;
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml() {
        let contents = r#"
            documents_dir = "downloads"
            table = "textos"

            [extraction]
            min_chars = 80
            ocr_language = "por"
        "#;
        let config = Config::parse(contents, Path::new("julius.toml")).unwrap();
        assert_eq!(config.documents_dir.as_deref(), Some("downloads"));
        assert_eq!(config.table.as_deref(), Some("textos"));
        assert_eq!(config.extraction.min_chars, 80);
        assert_eq!(config.extraction.ocr_language, "por");
        // Unset keys keep their defaults
        assert_eq!(config.extraction.dpi, 300);
        assert!(config.extraction.ocr);
    }

    #[test]
    fn test_parse_json_and_yaml() {
        let json = Config::parse(
            r#"{"database": "bds/convenios.db", "extraction": {"ocr": false}}"#,
            Path::new("julius.json"),
        )
        .unwrap();
        assert_eq!(json.database.as_deref(), Some("bds/convenios.db"));
        assert!(!json.extraction.ocr);

        let yaml = Config::parse("table: documentos\n", Path::new("julius.yaml")).unwrap();
        assert_eq!(yaml.table.as_deref(), Some("documentos"));
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = Config::parse("documents_dir = ", Path::new("broken.toml")).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_relative_paths_resolve_against_base_dir() {
        let config = Config {
            documents_dir: Some("documentos_convenios".to_string()),
            database: Some("/var/lib/julius/julius.db".to_string()),
            ..Config::default()
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, Path::new("/srv/portal"));

        assert_eq!(
            settings.documents_dir,
            PathBuf::from("/srv/portal/documentos_convenios")
        );
        assert_eq!(settings.database_path, PathBuf::from("/var/lib/julius/julius.db"));
        assert_eq!(settings.table, DEFAULT_TABLE);
    }

    #[tokio::test]
    async fn test_load_from_path_records_source() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("julius.toml");
        std::fs::write(&path, "documents_dir = \"pdfs\"\n").unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.base_dir().as_deref(), Some(dir.path()));
    }

    #[tokio::test]
    async fn test_explicit_missing_config_is_an_error() {
        let options = LoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/julius.toml")),
            ..LoadOptions::default()
        };
        assert!(matches!(
            load_settings(&options).await,
            Err(ConfigError::Read { .. })
        ));
    }
}
