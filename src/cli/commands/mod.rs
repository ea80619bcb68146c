//! Command implementations.

pub mod email;
pub mod init;
pub mod task;
pub mod version;

use crate::config::{Config, resolve_db_path};
use crate::error::{Error, Result};
use crate::storage::{EmailStore, StorageHandle, TaskStore};
use chrono::{DateTime, NaiveDate, NaiveTime};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An initialised handle plus the stores built on it.
///
/// The handle is shut down when this is dropped.
pub(crate) struct Workspace {
    handle: Arc<StorageHandle>,
    pub config: Config,
    pub tasks: TaskStore,
    pub emails: EmailStore,
}

impl Workspace {
    /// Open an existing database.
    ///
    /// Fails with `NotInitialized` when the file does not exist yet, so a
    /// mistyped `--db` does not silently create an empty store.
    pub fn open(db_path: Option<&PathBuf>) -> Result<Self> {
        let path = database_path(db_path)?;
        if !path.exists() {
            return Err(Error::NotInitialized);
        }
        Self::open_at(&path)
    }

    /// Open the database at `path`, creating it if needed.
    pub fn open_at(path: &Path) -> Result<Self> {
        let config = Config::load()?;
        let handle = Arc::new(StorageHandle::with_busy_timeout(config.busy_timeout_ms));
        handle.initialize(path)?;

        Ok(Self {
            tasks: TaskStore::new(handle.clone()),
            emails: EmailStore::new(handle.clone()),
            handle,
            config,
        })
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.handle.shutdown();
    }
}

/// Resolve `--db` or the default location.
pub(crate) fn database_path(db_path: Option<&PathBuf>) -> Result<PathBuf> {
    resolve_db_path(db_path.map(PathBuf::as_path))
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))
}

/// Parse `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp into Unix ms.
pub(crate) fn parse_due(input: &str) -> Result<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.timestamp_millis());
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
        .map_err(|_| {
            Error::Validation(format!(
                "invalid due date '{input}' (expected YYYY-MM-DD or RFC 3339)"
            ))
        })
}

/// Render Unix ms as a short UTC timestamp.
pub(crate) fn format_ms(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map_or_else(|| ms.to_string(), |dt| dt.format("%Y-%m-%d %H:%M").to_string())
}
