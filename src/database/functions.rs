//! Application SQL functions, registered on every connection the
//! [`ConnectionManager`](super::ConnectionManager) establishes.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

/// `fold(text)`: Unicode lowercase. SQLite's own `lower()` and `LIKE` fold ASCII only.
pub const FOLD: &str = "fold";

/// The folding applied by the `fold` SQL function.
pub fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// Registers the application functions on `conn`.
///
/// # Errors
/// Returns `rusqlite::Error` if SQLite rejects the registration.
pub fn register(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| fold(&s))),
    )
}
