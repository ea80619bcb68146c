//! Storage handle lifecycle.
//!
//! A [`StorageHandle`] owns the one SQLite connection the process uses and
//! gates it behind a one-time initialisation state machine:
//!
//! ```text
//! Uninitialized ──initialize──▶ Initializing ──▶ Ready ──shutdown──▶ Closed
//!                                     │
//!                                     └────────▶ Failed (cached, never retried)
//! ```
//!
//! Concurrent first callers race on the state lock; exactly one runs the
//! bootstrap while the rest wait on a condvar and receive the same outcome.

use crate::error::{BootstrapPhase, Error, Result};
use crate::storage::schema::{apply_pragmas, apply_schema};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default busy timeout applied to the connection.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Anything that can hand out the live database.
///
/// Stores depend on this rather than on [`StorageHandle`] directly so callers
/// can inject their own lifecycle.
pub trait ConnectionProvider: Send + Sync {
    /// Return the live database, or [`Error::NotInitialized`].
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` until initialisation has succeeded.
    fn acquire(&self) -> Result<Arc<Database>>;
}

/// The single open connection, serialised behind a mutex.
#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::Other(format!("Connection lock poisoned: {e}")))
    }

    /// Run a read (or single auto-committed write) against the connection.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or an error if the lock is poisoned.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Execute a mutation inside an IMMEDIATE transaction.
    ///
    /// Commits when `f` succeeds; the transaction is rolled back on drop if
    /// `f` (or the commit) fails, so partial effects are never visible.
    ///
    /// # Errors
    ///
    /// Returns the first error from `f`, or a database error from begin/commit.
    pub fn mutate<F, R>(&self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let result = match f(&tx) {
            Ok(r) => r,
            Err(e) => {
                debug!(op, error = %e, "Mutation rolled back");
                return Err(e);
            }
        };

        tx.commit()?;
        debug!(op, "Mutation committed");
        Ok(result)
    }
}

/// Where and how to open the database.
#[derive(Debug, Clone)]
enum Target {
    File { path: PathBuf, busy_timeout_ms: u64 },
    Memory,
}

/// Lifecycle state of a [`StorageHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
    Closed,
}

#[derive(Debug)]
enum State {
    Uninitialized,
    Initializing,
    Ready(Arc<Database>),
    Failed { phase: BootstrapPhase, message: String },
    Closed,
}

impl State {
    fn kind(&self) -> HandleState {
        match self {
            Self::Uninitialized => HandleState::Uninitialized,
            Self::Initializing => HandleState::Initializing,
            Self::Ready(_) => HandleState::Ready,
            Self::Failed { .. } => HandleState::Failed,
            Self::Closed => HandleState::Closed,
        }
    }

    /// The cached outcome of a finished initialisation, if any.
    fn settled(&self) -> Option<Result<()>> {
        match self {
            Self::Ready(_) => Some(Ok(())),
            Self::Failed { phase, message } => Some(Err(Error::Bootstrap {
                phase: *phase,
                message: message.clone(),
            })),
            Self::Closed => Some(Err(Error::ShutDown)),
            Self::Uninitialized | Self::Initializing => None,
        }
    }
}

/// Owner of the process's single database connection.
#[derive(Debug)]
pub struct StorageHandle {
    state: Mutex<State>,
    settled: Condvar,
    bootstrap_runs: AtomicUsize,
    busy_timeout_ms: u64,
}

impl Default for StorageHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageHandle {
    /// Create an uninitialised handle.
    #[must_use]
    pub fn new() -> Self {
        Self::with_busy_timeout(DEFAULT_BUSY_TIMEOUT_MS)
    }

    /// Create an uninitialised handle with a custom busy timeout.
    #[must_use]
    pub fn with_busy_timeout(busy_timeout_ms: u64) -> Self {
        Self {
            state: Mutex::new(State::Uninitialized),
            settled: Condvar::new(),
            bootstrap_runs: AtomicUsize::new(0),
            busy_timeout_ms,
        }
    }

    /// Create a handle already initialised against an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns a bootstrap error if the schema cannot be applied.
    pub fn open_in_memory() -> Result<Self> {
        let handle = Self::new();
        handle.initialize_target(&Target::Memory)?;
        Ok(handle)
    }

    /// Initialise the handle against the database file at `path`.
    ///
    /// Runs directory creation, connection open, liveness probe and schema
    /// bootstrap exactly once per handle. Every caller, concurrent or later,
    /// receives the outcome of that first attempt; a failure is cached and
    /// never retried, even if a later call passes a different path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bootstrap`] naming the failed phase, or
    /// [`Error::ShutDown`] after [`shutdown`](Self::shutdown).
    pub fn initialize(&self, path: &Path) -> Result<()> {
        self.initialize_target(&Target::File {
            path: path.to_path_buf(),
            busy_timeout_ms: self.busy_timeout_ms,
        })
    }

    fn initialize_target(&self, target: &Target) -> Result<()> {
        let mut state = self.lock_state()?;

        loop {
            if let Some(outcome) = state.settled() {
                return outcome;
            }
            if matches!(*state, State::Uninitialized) {
                break;
            }
            state = self
                .settled
                .wait(state)
                .map_err(|e| Error::Other(format!("Storage state lock poisoned: {e}")))?;
        }

        *state = State::Initializing;
        drop(state);

        self.bootstrap_runs.fetch_add(1, Ordering::SeqCst);
        let outcome = bootstrap(target);

        let mut state = self.lock_state()?;
        let result = match outcome {
            // shut down while bootstrapping
            Ok(_) if matches!(*state, State::Closed) => Err(Error::ShutDown),
            Ok(db) => {
                *state = State::Ready(Arc::new(db));
                Ok(())
            }
            Err((phase, message)) => {
                warn!(%phase, %message, "Storage bootstrap failed");
                if !matches!(*state, State::Closed) {
                    *state = State::Failed {
                        phase,
                        message: message.clone(),
                    };
                }
                Err(Error::Bootstrap { phase, message })
            }
        };
        self.settled.notify_all();
        result
    }

    /// Release the connection.
    ///
    /// Safe to call repeatedly. Operations already holding the database
    /// finish first; the connection closes when the last holder drops it.
    pub fn shutdown(&self) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if matches!(*state, State::Ready(_)) {
            info!("Storage shut down");
        }
        if !matches!(*state, State::Closed) {
            *state = State::Closed;
            self.settled.notify_all();
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> HandleState {
        self.state
            .lock()
            .map_or(HandleState::Failed, |s| s.kind())
    }

    /// How many times the bootstrap sequence has run (0 or 1).
    #[must_use]
    pub fn bootstrap_runs(&self) -> usize {
        self.bootstrap_runs.load(Ordering::SeqCst)
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|e| Error::Other(format!("Storage state lock poisoned: {e}")))
    }
}

impl ConnectionProvider for StorageHandle {
    fn acquire(&self) -> Result<Arc<Database>> {
        match &*self.lock_state()? {
            State::Ready(db) => Ok(Arc::clone(db)),
            _ => Err(Error::NotInitialized),
        }
    }
}

type BootstrapFailure = (BootstrapPhase, String);

fn failed(phase: BootstrapPhase, err: impl std::fmt::Display) -> BootstrapFailure {
    (phase, err.to_string())
}

fn bootstrap(target: &Target) -> std::result::Result<Database, BootstrapFailure> {
    let mut conn = match target {
        Target::File {
            path,
            busy_timeout_ms,
        } => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .map_err(|e| failed(BootstrapPhase::CreateDirectory, e))?;
            }

            let conn =
                Connection::open(path).map_err(|e| failed(BootstrapPhase::OpenConnection, e))?;
            conn.busy_timeout(Duration::from_millis(*busy_timeout_ms))
                .map_err(|e| failed(BootstrapPhase::OpenConnection, e))?;
            info!(path = %path.display(), "Opened database");
            conn
        }
        Target::Memory => Connection::open_in_memory()
            .map_err(|e| failed(BootstrapPhase::OpenConnection, e))?,
    };

    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        .map_err(|e| failed(BootstrapPhase::LivenessProbe, e))?;

    apply_pragmas(&conn).map_err(|e| failed(BootstrapPhase::Schema, e))?;
    apply_schema(&mut conn).map_err(|e| failed(BootstrapPhase::Schema, e))?;

    Ok(Database::new(conn))
}
