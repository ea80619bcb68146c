//! Data models for mailtask.
//!
//! This module contains all domain models:
//! - Task
//! - Email

pub mod email;
pub mod task;

pub use email::{AccuracyStats, Email, EmailPage, EmailStats, SenderCount};
pub use task::{NewTask, Task, TaskPage, TaskPriority, TaskQuery, TaskStats, TaskStatus, TaskUpdate};

/// The single implicit user every record is scoped to.
pub const DEFAULT_USER_ID: i64 = 1;

pub(crate) const fn default_user_id() -> i64 {
    DEFAULT_USER_ID
}
