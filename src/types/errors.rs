use thiserror::Error;

// === ConnectionError ===

/// Errors raised while establishing a connection to the collection database.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Every attempt allowed by the retry policy failed.
    #[error("Failed to connect after {attempts} attempt(s): {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: rusqlite::Error,
    },
}

// === MigrationError ===

/// Errors related to schema migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// A forward statement failed; the version is recorded as `failed`.
    #[error("Migration {version} ({name}) failed: {source}")]
    Failed {
        version: i64,
        name: String,
        #[source]
        source: rusqlite::Error,
    },
    /// No migration record exists for the requested version.
    #[error("Migration version not found: {0}")]
    NotFound(i64),
    /// The migration registry is not strictly increasing by version.
    #[error("Invalid migration registry: {0}")]
    InvalidRegistry(String),
    /// Reading or writing the `schema_migrations` bookkeeping failed.
    #[error("Migration bookkeeping error: {0}")]
    Database(#[from] rusqlite::Error),
}

// === DatabaseError ===

/// Errors surfaced by record-store and share operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The connection could not be (re-)established.
    #[error("Database connection error: {0}")]
    Connection(#[from] ConnectionError),
    /// Migrations failed while recovering the connection.
    #[error("Database migration error: {0}")]
    Migration(#[from] MigrationError),
    /// A statement failed and its transaction was rolled back.
    #[error("Database error: {0}")]
    Query(#[from] rusqlite::Error),
    /// Input rejected before any statement was issued.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A stored value could not be decoded.
    #[error("Corrupt stored value: {0}")]
    Corrupt(String),
}

// === ConfigError ===

/// Errors related to loading the application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration file is not valid JSON for `AppConfig`.
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
