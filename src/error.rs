//! Error types for mailtask.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=store, 3=not_found, 4=validation, etc.)
//! - Retryability flags for callers that can correct their input
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::fmt;
use thiserror::Error;

/// Result type alias for mailtask operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Bootstrap Phase ───────────────────────────────────────────

/// Step of the one-time storage bootstrap that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapPhase {
    CreateDirectory,
    OpenConnection,
    LivenessProbe,
    Schema,
}

impl BootstrapPhase {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateDirectory => "create-directory",
            Self::OpenConnection => "open-connection",
            Self::LivenessProbe => "liveness-probe",
            Self::Schema => "schema",
        }
    }
}

impl fmt::Display for BootstrapPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Store (exit 2)
    NotInitialized,
    BootstrapFailed,
    ShutDown,
    DatabaseError,

    // Not Found (exit 3)
    TaskNotFound,
    EmailNotFound,

    // Validation (exit 4)
    ValidationError,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::BootstrapFailed => "BOOTSTRAP_FAILED",
            Self::ShutDown => "SHUT_DOWN",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::TaskNotFound => "TASK_NOT_FOUND",
            Self::EmailNotFound => "EMAIL_NOT_FOUND",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::NotInitialized | Self::BootstrapFailed | Self::ShutDown | Self::DatabaseError => {
                2
            }
            Self::TaskNotFound | Self::EmailNotFound => 3,
            Self::ValidationError => 4,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether a caller should retry with corrected input.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ValidationError | Self::DatabaseError)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in mailtask operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Store not initialized")]
    NotInitialized,

    #[error("Store bootstrap failed during {phase}: {message}")]
    Bootstrap {
        phase: BootstrapPhase,
        message: String,
    },

    #[error("Store has been shut down")]
    ShutDown,

    #[error("Task not found: {id}")]
    TaskNotFound { id: i64 },

    #[error("Email not found: {id}")]
    EmailNotFound { id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::Bootstrap { .. } => ErrorCode::BootstrapFailed,
            Self::ShutDown => ErrorCode::ShutDown,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::TaskNotFound { .. } => ErrorCode::TaskNotFound,
            Self::EmailNotFound { .. } => ErrorCode::EmailNotFound,
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => {
                Some("Run `mailtask init` to create the database".to_string())
            }

            Self::Bootstrap { phase, .. } => match phase {
                BootstrapPhase::CreateDirectory => Some(
                    "Check that the parent directory of --db is writable".to_string(),
                ),
                BootstrapPhase::OpenConnection | BootstrapPhase::LivenessProbe => Some(
                    "Check that the database file is a valid SQLite file and not locked".to_string(),
                ),
                BootstrapPhase::Schema => None,
            },

            Self::TaskNotFound { id } => Some(format!(
                "No task with ID {id}. Use `mailtask task list` to see available tasks."
            )),

            Self::EmailNotFound { id } => Some(format!(
                "No email with ID '{id}'. Use `mailtask email list` to see stored emails."
            )),

            Self::Validation(msg) => {
                if msg.contains("status") {
                    Some(
                        "Valid statuses: pending, in_progress, completed, cancelled. \
                         Synonyms: done→completed, wip→in_progress, todo→pending"
                            .to_string(),
                    )
                } else if msg.contains("priority") {
                    Some("Valid priorities: low, medium, high, urgent".to_string())
                } else {
                    None
                }
            }

            Self::ShutDown
            | Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
