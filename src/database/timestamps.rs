//! Timestamp columns are stored as integer milliseconds since the UNIX epoch.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

pub fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Reads a millisecond column as a UTC timestamp.
pub fn column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(idx)?;
    from_millis(millis).ok_or_else(|| out_of_range(idx, millis))
}

/// Reads a nullable millisecond column.
pub fn optional_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<i64>>(idx)? {
        Some(millis) => from_millis(millis).map(Some).ok_or_else(|| out_of_range(idx, millis)),
        None => Ok(None),
    }
}

fn out_of_range(idx: usize, millis: i64) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Integer,
        format!("timestamp out of range: {}", millis).into(),
    )
}
