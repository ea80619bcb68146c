//! Initialize the mailtask database.
//!
//! Creates the parent directory, the SQLite file and the schema. Running it
//! again against an existing database is harmless: every schema statement is
//! "create if missing".

use super::{Workspace, database_path};
use crate::error::Result;
use crate::storage::schema::CURRENT_SCHEMA_VERSION;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct InitOutput {
    database: PathBuf,
    schema_version: i32,
    created: bool,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns a bootstrap error naming the phase that failed.
pub fn execute(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let path = database_path(db_path)?;
    let created = !path.exists();

    let workspace = Workspace::open_at(&path)?;
    drop(workspace);

    if json {
        let output = InitOutput {
            database: path,
            schema_version: CURRENT_SCHEMA_VERSION,
            created,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if created {
        println!("Initialized mailtask database");
        println!("  Database: {}", path.display());
    } else {
        println!("Database already initialized: {}", path.display());
    }

    Ok(())
}
