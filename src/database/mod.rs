//! deckvault database layer.
//!
//! Provides the connection manager, schema migrations, and the transaction
//! wrapper every write goes through.
//!
//! # Usage
//!
//! ```no_run
//! use deckvault::database::ConnectionManager;
//!
//! // Open a persistent database (migrations run on connect)
//! let mut db = ConnectionManager::open_path("collection.db").expect("failed to open database");
//!
//! // Or use an in-memory database for testing
//! let mut db = ConnectionManager::open_in_memory().expect("failed to open in-memory database");
//!
//! // Borrow a live connection for one operation
//! let conn = db.ensure_connection().expect("connection unavailable");
//! ```

pub mod connection;
pub mod functions;
pub mod migrations;
pub mod timestamps;

pub use connection::{ConnectionManager, Connector, RetryPolicy, SqliteConnector};
pub use migrations::{Migrator, MIGRATIONS};

use rusqlite::{Connection, Transaction};
use tracing::warn;

use crate::types::errors::DatabaseError;

/// Runs `body` in a transaction: commit on success, explicit rollback on error.
///
/// `op` names the operation in the rollback log line.
pub fn with_transaction<T, F>(conn: &mut Connection, op: &str, body: F) -> Result<T, DatabaseError>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, DatabaseError>,
{
    let tx = conn.transaction()?;
    match body(&tx) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!(op, error = %rollback_err, "rollback failed");
            }
            warn!(op, error = %e, "operation rolled back");
            Err(e)
        }
    }
}
