//! Connection management for the deckvault collection database.
//!
//! [`ConnectionManager`] owns the single live `rusqlite::Connection`. It opens
//! the connection through a [`Connector`] under a bounded [`RetryPolicy`], runs
//! schema migrations after every successful (re)connect, and checks liveness
//! before handing the connection to a caller.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use rusqlite::{Connection, ErrorCode};
use tracing::{debug, info, warn};

use super::functions;
use super::migrations::{self, Migrator};
use crate::types::errors::{ConnectionError, DatabaseError};
use crate::types::migration::SchemaMigration;
use crate::types::settings::{AppConfig, DatabaseSettings, RetrySettings};

/// Path value that selects an in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Opens raw connections to the backing store.
pub trait Connector {
    fn connect(&self) -> rusqlite::Result<Connection>;

    /// Human-readable target, used in log lines.
    fn describe(&self) -> String;

    /// Liveness check run before a live connection is handed out.
    ///
    /// The default reads the schema cookie from the database header, so an
    /// unreadable database file fails here rather than in the caller's statement.
    fn check_alive(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
            .map(|_| ())
    }
}

/// Opens a SQLite database file (or an in-memory database).
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteConnector {
    /// Connector for the SQLite file at `path` (created on first connect),
    /// with a 5 second busy timeout.
    ///
    /// # Arguments
    /// * `path` - Database file, or [`IN_MEMORY`] for a throwaway database.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// Each connect yields a fresh, empty database.
    pub fn in_memory() -> Self {
        Self::new(IN_MEMORY)
    }

    pub fn from_settings(settings: &DatabaseSettings) -> Self {
        Self::new(&settings.path).with_busy_timeout(Duration::from_millis(settings.busy_timeout_ms))
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == IN_MEMORY
    }
}

impl Connector for SqliteConnector {
    fn connect(&self) -> rusqlite::Result<Connection> {
        let conn = if self.is_in_memory() {
            Connection::open_in_memory()?
        } else {
            Connection::open(&self.path)?
        };
        conn.busy_timeout(self.busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(conn)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Bounded retry with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Retries without sleeping between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            delay: Duration::from_millis(settings.delay_ms),
        }
    }

    /// At least one attempt is always made.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Returns true for errors that mean the connection itself is unusable,
/// as opposed to a bad statement or a constraint violation.
pub fn is_connection_error(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => matches!(
            e.code,
            ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::SystemIoFailure
                | ErrorCode::PermissionDenied
        ),
        rusqlite::Error::InvalidPath(_) => true,
        _ => false,
    }
}

/// Owner of the single connection to the collection database.
///
/// Components borrow the connection through [`ConnectionManager::ensure_connection`]
/// for the duration of one operation; nothing else reconnects.
pub struct ConnectionManager {
    connector: Box<dyn Connector>,
    retry: RetryPolicy,
    migrator: Migrator,
    conn: Option<Connection>,
}

impl ConnectionManager {
    /// Creates an unconnected manager. Call [`connect`](Self::connect) or any
    /// operation that goes through [`ensure_connection`](Self::ensure_connection).
    ///
    /// # Arguments
    /// * `connector` - Opens and checks raw connections.
    /// * `retry` - Bounds the attempts made by each (re)connect.
    /// * `migrator` - Applied after every successful connect.
    pub fn new<C: Connector + 'static>(connector: C, retry: RetryPolicy, migrator: Migrator) -> Self {
        Self {
            connector: Box::new(connector),
            retry,
            migrator,
            conn: None,
        }
    }

    /// Connects through `connector` and applies pending migrations.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Connection`] once `retry` is exhausted, or
    /// [`DatabaseError::Migration`] if a migration fails.
    pub fn open<C: Connector + 'static>(connector: C, retry: RetryPolicy) -> Result<Self, DatabaseError> {
        let mut manager = Self::new(connector, retry, Migrator::default());
        manager.connect()?;
        Ok(manager)
    }

    /// Opens (or creates) a database file with the default retry policy and runs migrations.
    ///
    /// # Arguments
    /// * `path` - File system path of the SQLite database.
    ///
    /// # Errors
    /// Same as [`open`](Self::open).
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        Self::open(SqliteConnector::new(path), RetryPolicy::default())
    }

    /// Opens a throwaway in-memory database and runs migrations.
    ///
    /// Useful for testing. A reconnect starts over from an empty database.
    ///
    /// # Errors
    /// Same as [`open`](Self::open).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::open(SqliteConnector::in_memory(), RetryPolicy::immediate(1))
    }

    /// Opens the database described by the application config.
    pub fn from_config(config: &AppConfig) -> Result<Self, DatabaseError> {
        Self::open(
            SqliteConnector::from_settings(&config.database),
            RetryPolicy::from_settings(&config.retry),
        )
    }

    /// Establishes a fresh connection, replacing any existing one, and runs
    /// pending migrations on it.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Connection`] carrying the attempt count and the
    /// last driver error once the retry policy is exhausted, or
    /// [`DatabaseError::Migration`] if a migration fails. The manager is left
    /// unconnected in both cases.
    pub fn connect(&mut self) -> Result<&mut Connection, DatabaseError> {
        self.conn = None;
        let conn = self.establish()?;
        Ok(self.conn.insert(conn))
    }

    /// Returns a live connection, transparently reconnecting (and re-running
    /// migrations) if there is none or the liveness check reports a
    /// connection-level failure.
    ///
    /// # Errors
    /// Any error from [`connect`](Self::connect), or [`DatabaseError::Query`]
    /// when the check fails for another reason; the existing handle is kept
    /// in that case.
    pub fn ensure_connection(&mut self) -> Result<&mut Connection, DatabaseError> {
        let conn = match self.conn.take() {
            Some(conn) => match self.connector.check_alive(&conn) {
                Ok(()) => conn,
                Err(e) if is_connection_error(&e) => {
                    warn!(error = %e, "connection lost; reconnecting");
                    drop(conn);
                    self.establish()?
                }
                Err(e) => {
                    self.conn = Some(conn);
                    return Err(e.into());
                }
            },
            None => {
                debug!("no open connection; connecting");
                self.establish()?
            }
        };
        Ok(self.conn.insert(conn))
    }

    /// Drops the live connection. The next operation reconnects.
    pub fn disconnect(&mut self) {
        if self.conn.take().is_some() {
            info!(target_db = %self.connector.describe(), "disconnected");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn migrator(&self) -> &Migrator {
        &self.migrator
    }

    /// Highest completed schema version.
    pub fn schema_version(&mut self) -> Result<i64, DatabaseError> {
        let conn = self.ensure_connection()?;
        Ok(migrations::current_version(conn)?)
    }

    /// The `schema_migrations` audit trail in version order.
    pub fn migration_history(&mut self) -> Result<Vec<SchemaMigration>, DatabaseError> {
        let conn = self.ensure_connection()?;
        Ok(migrations::history(conn)?)
    }

    /// Runs the stored rollback statement for `version` and forgets the version.
    pub fn rollback_migration(&mut self, version: i64) -> Result<(), DatabaseError> {
        let conn = self.ensure_connection()?;
        Ok(migrations::rollback_migration(conn, version)?)
    }

    /// Retries the connector, registers SQL functions, then migrates the new connection.
    fn establish(&self) -> Result<Connection, DatabaseError> {
        let mut conn = self.connect_with_retry()?;
        functions::register(&conn)?;
        let applied = self.migrator.run_pending(&mut conn)?;
        if applied > 0 {
            info!(applied, "schema migrations applied");
        }
        Ok(conn)
    }

    fn connect_with_retry(&self) -> Result<Connection, ConnectionError> {
        let attempts = self.retry.attempts();
        let target = self.connector.describe();
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.connector.connect() {
                Ok(conn) => {
                    info!(target_db = %target, attempt, "connected");
                    return Ok(conn);
                }
                Err(e) if attempt < attempts => {
                    warn!(target_db = %target, attempt, max_attempts = attempts, error = %e, "connection attempt failed; retrying");
                    if !self.retry.delay.is_zero() {
                        thread::sleep(self.retry.delay);
                    }
                }
                Err(e) => {
                    warn!(target_db = %target, attempts, error = %e, "giving up on connection");
                    return Err(ConnectionError::RetriesExhausted { attempts, source: e });
                }
            }
        }
    }
}
