//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// mailtask - tasks and classified email in one local store
#[derive(Parser, Debug)]
#[command(name = "mailtask", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.mailtask/data/mailtask.db)
    #[arg(long, global = true, env = "MAILTASK_DB")]
    pub db: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database and schema
    Init,

    /// Print version information
    Version,

    /// Task management
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Stored email and classification
    Email {
        #[command(subcommand)]
        command: EmailCommands,
    },
}

// ============================================================================
// Task Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a new task
    Create(TaskCreateArgs),

    /// Show task details
    Show {
        /// Task ID
        id: i64,
    },

    /// List tasks, newest first
    List(TaskListArgs),

    /// Update fields on a task
    Update {
        /// Task ID
        id: i64,

        #[command(flatten)]
        fields: TaskFieldArgs,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: i64,
    },

    /// Apply the same update to several tasks (all or nothing)
    BulkUpdate {
        /// Task IDs (one or more)
        #[arg(required = true)]
        ids: Vec<i64>,

        #[command(flatten)]
        fields: TaskFieldArgs,
    },

    /// Delete several tasks (all or nothing)
    BulkDelete {
        /// Task IDs (one or more)
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Counts by status, priority and category, plus overdue
    Stats,

    /// Tasks extracted from an email
    ByEmail {
        /// Email ID
        email_id: String,
    },

    /// Tasks in a category
    ByCategory {
        /// Category name
        category: String,
    },
}

#[derive(Args, Debug)]
pub struct TaskCreateArgs {
    /// Task title
    pub title: String,

    /// Task description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Status (pending, in_progress, completed, cancelled)
    #[arg(short, long)]
    pub status: Option<String>,

    /// Priority (low, medium, high, urgent)
    #[arg(short, long)]
    pub priority: Option<String>,

    /// Category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Source email ID
    #[arg(long)]
    pub email_id: Option<String>,

    /// One-line summary
    #[arg(long)]
    pub summary: Option<String>,

    /// Due date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct TaskListArgs {
    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Tasks per page (default from config, 20)
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Filter by status
    #[arg(short, long)]
    pub status: Option<String>,

    /// Filter by priority
    #[arg(short, long)]
    pub priority: Option<String>,

    /// Substring match on title or description
    #[arg(long)]
    pub search: Option<String>,
}

/// Fields shared by `update` and `bulk-update`. Only flags given are changed.
#[derive(Args, Debug, Default)]
pub struct TaskFieldArgs {
    /// New title
    #[arg(short, long)]
    pub title: Option<String>,

    /// New description
    #[arg(short, long)]
    pub description: Option<String>,

    /// New status
    #[arg(short, long)]
    pub status: Option<String>,

    /// New priority
    #[arg(short, long)]
    pub priority: Option<String>,

    /// New category
    #[arg(short, long)]
    pub category: Option<String>,

    /// New source email ID
    #[arg(long)]
    pub email_id: Option<String>,

    /// New one-line summary
    #[arg(long)]
    pub summary: Option<String>,

    /// New due date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub due: Option<String>,
}

// ============================================================================
// Email Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum EmailCommands {
    /// Save (insert or replace) emails from JSON
    Save {
        /// JSON file with one email object or an array; `-` reads stdin
        #[arg(short, long)]
        file: String,
    },

    /// Show an email
    Show {
        /// Email ID
        id: String,
    },

    /// List emails, most recently received first
    List {
        /// Maximum emails to return (default from config, 20)
        #[arg(short, long)]
        limit: Option<u32>,

        /// Emails to skip
        #[arg(long, default_value = "0")]
        offset: u32,

        /// Match on user or AI category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Search subject, sender and content
    Search {
        /// Text to find (matched literally)
        query: String,

        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Results per page (default from config, 20)
        #[arg(long)]
        per_page: Option<u32>,
    },

    /// Show a conversation thread, oldest first
    Thread {
        /// Conversation ID
        conversation_id: String,
    },

    /// Record the category the user chose
    Classify {
        /// Email ID
        id: String,

        /// Category
        category: String,
    },

    /// Counts by AI category and top senders
    Stats {
        /// Number of senders to report (default from config, 10)
        #[arg(long)]
        top: Option<u32>,
    },

    /// How often the classifier's category was kept
    Accuracy,
}
