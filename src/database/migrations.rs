//! Schema migrations for the deckvault database.
//!
//! [`MIGRATIONS`] is an append-only registry: add a new entry with the next
//! version, never edit a released one. Every attempt is recorded in
//! `schema_migrations` as `pending` before the forward statement runs and is
//! flipped to `completed` or `failed` afterwards, so an interrupted startup
//! leaves an audit trail.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{error, info};

use super::timestamps;
use crate::types::errors::MigrationError;
use crate::types::migration::{Migration, MigrationStatus, SchemaMigration};

/// Registered migrations, in strictly increasing version order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_decks",
        up: "
        CREATE TABLE IF NOT EXISTS decks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            deck_name TEXT NOT NULL,
            manufacturer TEXT NOT NULL,
            release_year INTEGER,
            condition TEXT NOT NULL,
            purchase_date TEXT,
            purchase_price REAL NOT NULL DEFAULT 0 CHECK (purchase_price >= 0),
            notes TEXT NOT NULL DEFAULT '',
            image_data BLOB,
            created_at INTEGER NOT NULL
        );
        ",
        down: "DROP TABLE IF EXISTS decks;",
    },
    Migration {
        version: 2,
        name: "create_wishlist",
        up: "
        CREATE TABLE IF NOT EXISTS wishlist (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            deck_name TEXT NOT NULL,
            manufacturer TEXT NOT NULL,
            expected_price REAL NOT NULL DEFAULT 0,
            priority INTEGER NOT NULL DEFAULT 3 CHECK (priority BETWEEN 1 AND 5),
            notes TEXT NOT NULL DEFAULT '',
            created_at INTEGER NOT NULL
        );
        ",
        down: "DROP TABLE IF EXISTS wishlist;",
    },
    Migration {
        version: 3,
        name: "create_market_values",
        up: "
        CREATE TABLE IF NOT EXISTS market_values (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            deck_id INTEGER NOT NULL REFERENCES decks(id),
            market_price REAL NOT NULL CHECK (market_price >= 0),
            source TEXT NOT NULL,
            condition TEXT NOT NULL,
            updated_at INTEGER NOT NULL,
            notes TEXT NOT NULL DEFAULT '',
            UNIQUE (deck_id, source)
        );

        CREATE INDEX IF NOT EXISTS idx_market_values_updated_at ON market_values(updated_at);
        ",
        down: "
        DROP INDEX IF EXISTS idx_market_values_updated_at;
        DROP TABLE IF EXISTS market_values;
        ",
    },
    Migration {
        version: 4,
        name: "create_shared_collections",
        up: "
        CREATE TABLE IF NOT EXISTS shared_collections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            share_id TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            deck_ids TEXT NOT NULL DEFAULT '[]',
            created_at INTEGER NOT NULL,
            expires_at INTEGER,
            is_public INTEGER NOT NULL DEFAULT 0
        );
        ",
        down: "DROP TABLE IF EXISTS shared_collections;",
    },
    Migration {
        version: 5,
        name: "index_deck_listing",
        up: "
        CREATE INDEX IF NOT EXISTS idx_decks_created_at ON decks(created_at);
        CREATE INDEX IF NOT EXISTS idx_decks_manufacturer ON decks(manufacturer);
        CREATE INDEX IF NOT EXISTS idx_shared_collections_expires_at ON shared_collections(expires_at);
        ",
        down: "
        DROP INDEX IF EXISTS idx_decks_created_at;
        DROP INDEX IF EXISTS idx_decks_manufacturer;
        DROP INDEX IF EXISTS idx_shared_collections_expires_at;
        ",
    },
];

/// Applies a migration registry to a connection.
#[derive(Debug, Clone)]
pub struct Migrator {
    registry: &'static [Migration],
}

impl Default for Migrator {
    fn default() -> Self {
        Self { registry: MIGRATIONS }
    }
}

impl Migrator {
    /// Uses a custom registry; versions must be positive and strictly increasing.
    pub fn new(registry: &'static [Migration]) -> Result<Self, MigrationError> {
        let mut previous = 0;
        for m in registry {
            if m.version <= previous {
                return Err(MigrationError::InvalidRegistry(format!(
                    "version {} ({}) does not follow version {}",
                    m.version, m.name, previous
                )));
            }
            previous = m.version;
        }
        Ok(Self { registry })
    }

    pub fn registry(&self) -> &'static [Migration] {
        self.registry
    }

    /// Version the schema reaches once every registered migration is applied.
    pub fn latest_version(&self) -> i64 {
        self.registry.last().map_or(0, |m| m.version)
    }

    /// Applies every registered migration newer than the highest completed
    /// version, in order. Stops at the first failure. Returns how many ran.
    pub fn run_pending(&self, conn: &mut Connection) -> Result<usize, MigrationError> {
        ensure_bookkeeping(conn)?;
        let current = current_version(conn)?;

        let mut applied = 0;
        for migration in self.registry.iter().filter(|m| m.version > current) {
            record_pending(conn, migration)?;

            if let Err(source) = apply(conn, migration) {
                mark_failed(conn, migration.version)?;
                error!(version = migration.version, name = migration.name, error = %source, "migration failed");
                return Err(MigrationError::Failed {
                    version: migration.version,
                    name: migration.name.to_string(),
                    source,
                });
            }

            info!(version = migration.version, name = migration.name, "migration completed");
            applied += 1;
        }
        Ok(applied)
    }
}

/// Creates the bookkeeping table. Not versioned itself.
pub fn ensure_bookkeeping(conn: &Connection) -> Result<(), MigrationError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
             version INTEGER PRIMARY KEY,
             name TEXT NOT NULL,
             applied_at INTEGER NOT NULL,
             status TEXT NOT NULL DEFAULT 'pending'
                 CHECK (status IN ('pending', 'completed', 'failed')),
             rollback_sql TEXT NOT NULL DEFAULT ''
         );",
    )?;
    Ok(())
}

/// Highest version recorded as `completed` (0 when none).
pub fn current_version(conn: &Connection) -> Result<i64, MigrationError> {
    ensure_bookkeeping(conn)?;
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations WHERE status = 'completed'",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Every recorded attempt, in version order.
pub fn history(conn: &Connection) -> Result<Vec<SchemaMigration>, MigrationError> {
    ensure_bookkeeping(conn)?;
    let mut stmt = conn.prepare(
        "SELECT version, name, applied_at, status, rollback_sql
         FROM schema_migrations ORDER BY version",
    )?;
    let rows = stmt.query_map([], |row| {
        let status: String = row.get(3)?;
        Ok(SchemaMigration {
            version: row.get(0)?,
            name: row.get(1)?,
            applied_at: timestamps::column(row, 2)?,
            status: status.parse().map_err(|e: String| {
                rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
            })?,
            rollback_sql: row.get(4)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Runs the stored rollback statement for `version` and deletes its record,
/// atomically.
pub fn rollback_migration(conn: &mut Connection, version: i64) -> Result<(), MigrationError> {
    ensure_bookkeeping(conn)?;
    let rollback_sql: Option<String> = conn
        .query_row(
            "SELECT rollback_sql FROM schema_migrations WHERE version = ?1",
            params![version],
            |row| row.get(0),
        )
        .optional()?;
    let rollback_sql = rollback_sql.ok_or(MigrationError::NotFound(version))?;

    let tx = conn.transaction()?;
    tx.execute_batch(&rollback_sql)?;
    tx.execute("DELETE FROM schema_migrations WHERE version = ?1", params![version])?;
    tx.commit()?;

    info!(version, "migration rolled back");
    Ok(())
}

fn record_pending(conn: &Connection, migration: &Migration) -> Result<(), MigrationError> {
    conn.execute(
        "INSERT INTO schema_migrations (version, name, applied_at, status, rollback_sql)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(version) DO UPDATE SET
             name = excluded.name,
             applied_at = excluded.applied_at,
             status = excluded.status,
             rollback_sql = excluded.rollback_sql",
        params![
            migration.version,
            migration.name,
            timestamps::to_millis(timestamps::now()),
            MigrationStatus::Pending.as_str(),
            migration.down,
        ],
    )?;
    Ok(())
}

/// Forward statement plus the `completed` flip, in one transaction. An early
/// return drops the transaction, which rolls it back.
fn apply(conn: &mut Connection, migration: &Migration) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(migration.up)?;
    tx.execute(
        "UPDATE schema_migrations SET status = ?1, applied_at = ?2 WHERE version = ?3",
        params![
            MigrationStatus::Completed.as_str(),
            timestamps::to_millis(timestamps::now()),
            migration.version,
        ],
    )?;
    tx.commit()
}

fn mark_failed(conn: &Connection, version: i64) -> Result<(), MigrationError> {
    conn.execute(
        "UPDATE schema_migrations SET status = ?1, applied_at = ?2 WHERE version = ?3",
        params![
            MigrationStatus::Failed.as_str(),
            timestamps::to_millis(timestamps::now()),
            version,
        ],
    )?;
    Ok(())
}
