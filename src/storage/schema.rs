//! Database schema definitions and bootstrap.
//!
//! Bootstrap is idempotent ("create if missing") and runs as a single
//! transaction: either every table, index and the default settings row
//! exists afterwards, or nothing changed.

use rusqlite::{Connection, Result};
use tracing::info;

/// Current schema version, recorded in `schema_version` at bootstrap.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the mailtask database.
///
/// Timestamps are stored as INTEGER (Unix milliseconds).
pub const SCHEMA_SQL: &str = r"
-- ====================
-- Schema Version Tracking
-- ====================

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at INTEGER NOT NULL
);

-- ====================
-- Tasks
-- ====================

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL DEFAULT 1,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    priority TEXT NOT NULL DEFAULT 'medium',
    category TEXT,
    email_id TEXT,
    one_line_summary TEXT,
    due_date INTEGER,
    created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s','now') AS INTEGER) * 1000),
    updated_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s','now') AS INTEGER) * 1000),
    completed_at INTEGER
);

CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id);
CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
CREATE INDEX IF NOT EXISTS idx_tasks_priority ON tasks(priority);
CREATE INDEX IF NOT EXISTS idx_tasks_category ON tasks(category);
CREATE INDEX IF NOT EXISTS idx_tasks_email ON tasks(email_id);
CREATE INDEX IF NOT EXISTS idx_tasks_created ON tasks(created_at DESC);

-- ====================
-- Emails
-- ====================

-- body/date/confidence are legacy columns kept for older databases.
CREATE TABLE IF NOT EXISTS emails (
    id TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL DEFAULT 1,
    subject TEXT,
    sender TEXT,
    recipient TEXT,
    content TEXT,
    body TEXT,
    date INTEGER,
    received_date INTEGER,
    category TEXT,
    ai_category TEXT,
    confidence REAL,
    ai_confidence REAL,
    ai_reasoning TEXT,
    one_line_summary TEXT,
    conversation_id TEXT,
    processed_at INTEGER DEFAULT (CAST(strftime('%s','now') AS INTEGER) * 1000),
    created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s','now') AS INTEGER) * 1000)
);

CREATE INDEX IF NOT EXISTS idx_emails_user ON emails(user_id);
CREATE INDEX IF NOT EXISTS idx_emails_category ON emails(category);
CREATE INDEX IF NOT EXISTS idx_emails_ai_category ON emails(ai_category);
CREATE INDEX IF NOT EXISTS idx_emails_conversation ON emails(conversation_id);
CREATE INDEX IF NOT EXISTS idx_emails_received ON emails(received_date DESC);
CREATE INDEX IF NOT EXISTS idx_emails_sender ON emails(sender);

-- ====================
-- User Settings
-- ====================

CREATE TABLE IF NOT EXISTS user_settings (
    user_id INTEGER PRIMARY KEY DEFAULT 1,
    auto_classify INTEGER NOT NULL DEFAULT 1,
    auto_create_tasks INTEGER NOT NULL DEFAULT 0,
    email_check_interval INTEGER NOT NULL DEFAULT 300,
    default_task_priority TEXT NOT NULL DEFAULT 'medium',
    updated_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s','now') AS INTEGER) * 1000)
);

INSERT OR IGNORE INTO user_settings (user_id) VALUES (1);
";

/// Set connection pragmas.
///
/// Must run outside a transaction (`journal_mode` cannot change inside one).
///
/// # Errors
///
/// Returns an error if a pragma cannot be applied.
pub fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    Ok(())
}

/// Apply the schema to the database in one transaction.
///
/// Idempotent because every statement uses `IF NOT EXISTS` / `OR IGNORE`.
/// Any failure rolls the whole bootstrap back.
///
/// # Errors
///
/// Returns an error if the SQL execution fails.
pub fn apply_schema(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;

    tx.execute_batch(SCHEMA_SQL)?;
    tx.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, ?2)",
        rusqlite::params![
            CURRENT_SCHEMA_VERSION,
            chrono::Utc::now().timestamp_millis()
        ],
    )?;

    tx.commit()?;
    info!(version = CURRENT_SCHEMA_VERSION, "Schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_apply_schema() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_schema(&mut conn).expect("Failed to apply schema");

        let tables = table_names(&conn);
        assert!(tables.contains(&"tasks".to_string()));
        assert!(tables.contains(&"emails".to_string()));
        assert!(tables.contains(&"user_settings".to_string()));
        assert!(tables.contains(&"schema_version".to_string()));
    }

    #[test]
    fn test_schema_is_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();

        apply_schema(&mut conn).expect("First apply failed");
        apply_schema(&mut conn).expect("Second apply failed");

        let settings: i64 = conn
            .query_row("SELECT COUNT(*) FROM user_settings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(settings, 1);
    }

    #[test]
    fn test_task_column_defaults() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_schema(&mut conn).unwrap();

        conn.execute("INSERT INTO tasks (title) VALUES ('bare')", [])
            .unwrap();
        let (status, priority, created_at): (String, String, i64) = conn
            .query_row(
                "SELECT status, priority, created_at FROM tasks",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(status, "pending");
        assert_eq!(priority, "medium");
        assert!(created_at > 0);
    }

    #[test]
    fn test_failed_bootstrap_leaves_no_partial_schema() {
        let mut conn = Connection::open_in_memory().unwrap();
        // A conflicting object named like an index makes the batch fail midway.
        conn.execute_batch("CREATE TABLE idx_emails_user (x INTEGER);")
            .unwrap();

        assert!(apply_schema(&mut conn).is_err());

        let tables = table_names(&conn);
        assert!(!tables.contains(&"tasks".to_string()));
        assert!(!tables.contains(&"emails".to_string()));
    }
}
