//! Configuration management.
//!
//! This module resolves where the database lives and loads the optional
//! user config file.
//!
//! # Layout
//!
//! Everything lives under `~/.mailtask/`:
//! - **Database**: `~/.mailtask/data/mailtask.db`
//! - **Test database**: `~/.mailtask/test/mailtask.db` (when `MAILTASK_TEST_DB` is set)
//! - **Config**: `~/.mailtask/config.json` (optional)

use crate::error::{Error, Result};
use crate::storage::handle::DEFAULT_BUSY_TIMEOUT_MS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default rows per page for listings.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Default number of senders reported by email stats.
pub const DEFAULT_TOP_SENDERS: u32 = 10;

/// Get the global mailtask directory location.
#[must_use]
pub fn global_mailtask_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".mailtask"))
}

/// Check if test mode is enabled.
///
/// Test mode is enabled by setting `MAILTASK_TEST_DB=1` (or any truthy value).
/// This redirects all database operations to an isolated test database.
#[must_use]
pub fn is_test_mode() -> bool {
    std::env::var("MAILTASK_TEST_DB").is_ok_and(|v| is_truthy(&v))
}

fn is_truthy(value: &str) -> bool {
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}

/// Get the test database path.
#[must_use]
pub fn test_db_path() -> Option<PathBuf> {
    global_mailtask_dir().map(|dir| dir.join("test").join("mailtask.db"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. If `explicit_path` is provided (`--db` or `MAILTASK_DB`), use it directly
/// 2. `MAILTASK_TEST_DB` environment variable → uses test database
/// 3. Global location: `~/.mailtask/data/mailtask.db`
///
/// # Returns
///
/// Returns the path to the database file, or `None` if no home directory
/// can be determined.
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if is_test_mode() {
        return test_db_path();
    }

    global_mailtask_dir().map(|dir| dir.join("data").join("mailtask.db"))
}

/// Default location of the user config file.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    global_mailtask_dir().map(|dir| dir.join("config.json"))
}

/// User-tunable settings from `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How long a writer waits on a locked database before failing
    pub busy_timeout_ms: u64,
    pub page_size: u32,
    pub top_senders: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            page_size: DEFAULT_PAGE_SIZE,
            top_senders: DEFAULT_TOP_SENDERS,
        }
    }
}

impl Config {
    /// Load from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the file cannot be read or is not valid JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(Error::Config(format!(
                    "cannot read {}: {e}",
                    path.display()
                )));
            }
        };

        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("invalid {}: {e}", path.display())))?;
        if config.page_size == 0 {
            return Err(Error::Config("page_size must be at least 1".to_string()));
        }

        debug!(path = %path.display(), ?config, "Loaded config");
        Ok(config)
    }

    /// Load from the default location.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the file exists but is unreadable or malformed.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_db_path_with_explicit() {
        let explicit = PathBuf::from("/custom/path/db.sqlite");
        let result = resolve_db_path(Some(&explicit));
        assert_eq!(result, Some(explicit));
    }

    #[test]
    fn test_resolve_db_path_default_name() {
        let path = resolve_db_path(None).unwrap();
        assert!(path.ends_with("mailtask.db"));
    }

    #[test]
    fn test_test_db_path_is_separate() {
        let global = global_mailtask_dir().unwrap();
        let test = test_db_path().unwrap();

        assert!(test.to_string_lossy().contains("test"));
        assert!(test.ends_with("mailtask.db"));
        assert_ne!(global.join("data").join("mailtask.db"), test);
    }

    #[test]
    fn test_truthy_parsing() {
        assert!(!is_truthy(""));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy("FALSE"));
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("yes"));
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.busy_timeout_ms, 5000);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"page_size": 50}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.top_senders, DEFAULT_TOP_SENDERS);
    }

    #[test]
    fn test_malformed_config_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"page_size": 0}"#).unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
