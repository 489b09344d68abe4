//! Market Value Manager for deckvault.
//!
//! Tracks what decks are worth per price source. A deck has at most one row
//! per source; recording a new observation overwrites it atomically.

use rusqlite::{params, Row};
use tracing::debug;

use super::deck_manager::parse_condition;
use super::validation;
use crate::database::{timestamps, with_transaction, ConnectionManager};
use crate::types::errors::DatabaseError;
use crate::types::market::{MarketValue, MarketValueUpdate, PortfolioSummary};

/// Trait defining market value operations.
pub trait MarketManagerTrait {
    /// Records the current value of a deck according to one price source.
    ///
    /// # Arguments
    /// * `deck_id` - Deck being priced; it must exist.
    /// * `update` - Price, source, condition and notes for the observation.
    ///
    /// # Errors
    /// Returns [`DatabaseError::InvalidInput`] for a blank source or a negative
    /// price, and [`DatabaseError::Query`] (after rollback) when `deck_id`
    /// names no deck.
    fn upsert_market_value(&mut self, deck_id: i64, update: &MarketValueUpdate) -> Result<i64, DatabaseError>;
    fn get_market_values(&mut self, deck_id: Option<i64>) -> Result<Vec<MarketValue>, DatabaseError>;
    fn portfolio_summary(&mut self) -> Result<PortfolioSummary, DatabaseError>;
}

/// Market value manager borrowing the application's connection manager.
pub struct MarketManager<'a> {
    db: &'a mut ConnectionManager,
}

impl<'a> MarketManager<'a> {
    pub fn new(db: &'a mut ConnectionManager) -> Self {
        Self { db }
    }

    fn row_to_value(row: &Row<'_>) -> rusqlite::Result<MarketValue> {
        let condition: String = row.get(7)?;
        Ok(MarketValue {
            id: row.get(0)?,
            deck_id: row.get(1)?,
            deck_name: row.get(2)?,
            manufacturer: row.get(3)?,
            purchase_price: row.get(4)?,
            market_price: row.get(5)?,
            source: row.get(6)?,
            condition: parse_condition(7, &condition)?,
            notes: row.get(8)?,
            updated_at: timestamps::column(row, 9)?,
        })
    }
}

impl<'a> MarketManagerTrait for MarketManager<'a> {
    /// Inserts or overwrites the value for `(deck_id, source)` in one statement.
    /// Returns the row id. The stored timestamp never moves backwards and a
    /// rewrite always advances it.
    fn upsert_market_value(&mut self, deck_id: i64, update: &MarketValueUpdate) -> Result<i64, DatabaseError> {
        validation::validate_market_value(update)?;
        let conn = self.db.ensure_connection()?;
        let now = timestamps::to_millis(timestamps::now());

        let id = with_transaction(conn, "upsert_market_value", |tx| {
            Ok(tx.query_row(
                "INSERT INTO market_values (deck_id, market_price, source, condition, updated_at, notes) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                 ON CONFLICT(deck_id, source) DO UPDATE SET \
                     market_price = excluded.market_price, \
                     condition = excluded.condition, \
                     notes = excluded.notes, \
                     updated_at = MAX(excluded.updated_at, market_values.updated_at + 1) \
                 RETURNING id",
                params![
                    deck_id,
                    update.market_price,
                    update.source,
                    update.condition.as_str(),
                    now,
                    update.notes,
                ],
                |row| row.get::<_, i64>(0),
            )?)
        })?;
        debug!(deck_id, source = %update.source, id, "market value recorded");
        Ok(id)
    }

    /// Values joined with their deck, most recently updated first.
    fn get_market_values(&mut self, deck_id: Option<i64>) -> Result<Vec<MarketValue>, DatabaseError> {
        let conn = self.db.ensure_connection()?;
        let mut stmt = conn.prepare(
            "SELECT mv.id, mv.deck_id, d.deck_name, d.manufacturer, d.purchase_price, \
                    mv.market_price, mv.source, mv.condition, mv.notes, mv.updated_at \
             FROM market_values mv \
             JOIN decks d ON d.id = mv.deck_id \
             WHERE ?1 IS NULL OR mv.deck_id = ?1 \
             ORDER BY mv.updated_at DESC, mv.id DESC",
        )?;
        let values = stmt
            .query_map(params![deck_id], Self::row_to_value)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }

    /// Totals over the latest value of each priced deck.
    fn portfolio_summary(&mut self) -> Result<PortfolioSummary, DatabaseError> {
        let conn = self.db.ensure_connection()?;
        let (priced, market, purchase): (i64, f64, f64) = conn.query_row(
            "WITH latest AS ( \
                 SELECT deck_id, market_price, \
                        ROW_NUMBER() OVER (PARTITION BY deck_id ORDER BY updated_at DESC, id DESC) AS rn \
                 FROM market_values \
             ) \
             SELECT COUNT(*), COALESCE(SUM(l.market_price), 0.0), COALESCE(SUM(d.purchase_price), 0.0) \
             FROM latest l JOIN decks d ON d.id = l.deck_id \
             WHERE l.rn = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        let value_change_pct = if purchase > 0.0 {
            Some((market - purchase) / purchase * 100.0)
        } else {
            None
        };

        Ok(PortfolioSummary {
            total_market_value: market,
            total_purchase_value: purchase,
            value_change_pct,
            priced_decks: priced as usize,
        })
    }
}
