// deckvault collection statistics
// Aggregates computed in SQL over the decks table.

use crate::database::ConnectionManager;
use crate::managers::deck_manager::parse_condition;
use crate::types::deck::Condition;
use crate::types::errors::DatabaseError;
use crate::types::statistics::CollectionStatistics;

/// Computes deck count, value totals, and per-manufacturer / per-condition breakdowns.
pub fn collection_statistics(db: &mut ConnectionManager) -> Result<CollectionStatistics, DatabaseError> {
    let conn = db.ensure_connection()?;

    let (total_decks, total_purchase_value, average_purchase_price): (i64, f64, Option<f64>) = conn
        .query_row(
            "SELECT COUNT(*), COALESCE(SUM(purchase_price), 0.0), AVG(purchase_price) FROM decks",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

    let mut stmt = conn.prepare(
        "SELECT manufacturer, SUM(purchase_price) AS value FROM decks \
         GROUP BY manufacturer ORDER BY value DESC, manufacturer",
    )?;
    let value_by_manufacturer = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare("SELECT condition, COUNT(*) FROM decks GROUP BY condition")?;
    let mut decks_by_condition = stmt
        .query_map([], |row| {
            let raw: String = row.get(0)?;
            Ok((parse_condition(0, &raw)?, row.get::<_, i64>(1)?))
        })?
        .collect::<Result<Vec<(Condition, i64)>, _>>()?;
    decks_by_condition.sort_by_key(|(condition, _)| *condition);

    Ok(CollectionStatistics {
        total_decks,
        total_purchase_value,
        average_purchase_price,
        value_by_manufacturer,
        decks_by_condition,
    })
}
