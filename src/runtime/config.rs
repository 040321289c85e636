//! Layered configuration.
//!
//! Values come from, lowest precedence first:
//!
//! 1. the defaults below,
//! 2. an optional TOML file (`library.toml` in the working directory by default),
//! 3. `LIBRARY_*` environment variables, with `__` between nested keys
//!    (e.g. `LIBRARY_DATA__CATALOG_PATH=/var/lib/library/books.json`).
//!
//! ```toml
//! [data]
//! catalog_path = "library_books.json"
//! journal_path = "library_transactions.txt"
//! autosave = true
//!
//! [journal]
//! buffer_size = 32
//!
//! [coordinator]
//! max_in_flight = 8
//!
//! [logging]
//! level = "info"
//! ```

use crate::coordinator::DEFAULT_MAX_IN_FLIGHT;
use crate::journal::DEFAULT_BUFFER_SIZE;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "library.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    pub catalog_path: PathBuf,
    pub journal_path: PathBuf,
    /// Save the catalog after every successful mutation.
    pub autosave: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("library_books.json"),
            journal_path: PathBuf::from("library_transactions.txt"),
            autosave: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct JournalConfig {
    pub buffer_size: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub max_in_flight: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct LibraryConfig {
    pub data: DataConfig,
    pub journal: JournalConfig,
    pub coordinator: CoordinatorConfig,
    pub logging: LoggingConfig,
}

impl LibraryConfig {
    /// Loads configuration from [`CONFIG_FILE`] (if present) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Loads configuration from `path` (if present) and the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix("LIBRARY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = LibraryConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, LibraryConfig::default());
        assert!(config.data.autosave);
        assert_eq!(config.journal.buffer_size, DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn file_overrides_selected_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.toml");
        std::fs::write(
            &path,
            "[data]\ncatalog_path = \"/tmp/books.json\"\nautosave = false\n\n[coordinator]\nmax_in_flight = 3\n",
        )
        .unwrap();

        let config = LibraryConfig::load_from(&path).unwrap();
        assert_eq!(config.data.catalog_path, PathBuf::from("/tmp/books.json"));
        assert!(!config.data.autosave);
        assert_eq!(config.data.journal_path, DataConfig::default().journal_path);
        assert_eq!(config.coordinator.max_in_flight, 3);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.toml");
        std::fs::write(&path, "[journal]\nbuffer_size = \"lots\"\n").unwrap();

        assert!(LibraryConfig::load_from(&path).is_err());
    }
}
