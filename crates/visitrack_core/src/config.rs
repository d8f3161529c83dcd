//! Application configuration.
//!
//! # Responsibility
//! - Describe where data lives, which storage backend to use and how to log.
//! - Load from an optional JSON file, falling back to defaults.
//!
//! # Invariants
//! - A missing config file is not an error; defaults apply.
//! - `log_level` is always one of `trace|debug|info|warn|error` after load.

use crate::logging::{default_log_level, normalize_level};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Default config file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "visitrack.json";

const DEFAULT_DATA_DIR: &str = "data";
const SQLITE_FILE_NAME: &str = "visitrack.sqlite3";
const LOG_DIR_NAME: &str = "logs";

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// One JSON file per collection under `data_dir`.
    #[default]
    Json,
    /// Single SQLite database under `data_dir`.
    Sqlite,
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot access config `{}`: {source}", path.display())
            }
            Self::Json(err) => write!(f, "invalid config file: {err}"),
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::InvalidLogLevel(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Runtime configuration for the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding JSON files or the SQLite database.
    pub data_dir: PathBuf,
    pub backend: StorageBackend,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Log directory; defaults to `<data_dir>/logs`.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            backend: StorageBackend::default(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_backend(mut self, backend: StorageBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Loads config from `path`; a missing file yields defaults.
    ///
    /// # Errors
    /// - `Io` when the file exists but cannot be read.
    /// - `Json` when the file is not a valid config document.
    /// - `InvalidLogLevel` when `log_level` is unsupported.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut config: Self = serde_json::from_str(&text)?;
        config.log_level = normalize_level(&config.log_level)
            .map_err(ConfigError::InvalidLogLevel)?
            .to_string();
        Ok(config)
    }

    /// Writes this config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join(SQLITE_FILE_NAME)
    }

    /// Absolute log directory, as required by `init_logging`.
    pub fn resolved_log_dir(&self) -> Result<PathBuf, ConfigError> {
        let dir = self
            .log_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join(LOG_DIR_NAME));
        std::path::absolute(&dir).map_err(|source| ConfigError::Io { path: dir, source })
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, StorageBackend};
    use std::path::PathBuf;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("visitrack.json");
        std::fs::write(&path, r#"{"backend": "sqlite", "log_level": "WARNING"}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.backend, StorageBackend::Sqlite);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn rejects_unknown_log_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("visitrack.json");
        std::fs::write(&path, r#"{"log_level": "loud"}"#).unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(_)));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("visitrack.json");
        let config = AppConfig::new()
            .with_data_dir(dir.path().join("store"))
            .with_backend(StorageBackend::Sqlite)
            .with_log_level("error");

        config.save(&path).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn resolved_log_dir_is_absolute() {
        let config = AppConfig::new().with_data_dir("relative/data");
        let dir = config.resolved_log_dir().unwrap();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("relative/data/logs"));
    }
}
