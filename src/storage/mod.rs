//! SQLite storage layer for mailtask.
//!
//! This module provides the persistence layer using SQLite with:
//! - A shared handle that bootstraps the database exactly once
//! - WAL mode and a busy timeout for concurrent access
//! - Immediate transactions for every write
//!
//! # Submodules
//!
//! - [`handle`] - Lifecycle of the shared connection
//! - [`schema`] - Database schema definitions
//! - [`tasks`] - Task persistence
//! - [`emails`] - Email persistence

pub mod emails;
pub mod handle;
pub mod query;
pub mod schema;
pub mod tasks;

pub use emails::EmailStore;
pub use handle::{ConnectionProvider, Database, HandleState, StorageHandle};
pub use tasks::TaskStore;
