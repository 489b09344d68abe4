//! Deck Manager for deckvault.
//!
//! Implements `DeckManagerTrait`: adding decks to the collection, listing,
//! filtering and searching them, and fetching stored images. Every call goes
//! through [`ConnectionManager::ensure_connection`].

use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::validation;
use crate::database::{functions, timestamps, with_transaction, ConnectionManager};
use crate::types::deck::{Condition, Deck, DeckFilter, NewDeck};
use crate::types::errors::DatabaseError;

/// Column list matching [`row_to_deck`].
pub(crate) const DECK_COLUMNS: &str = "id, deck_name, manufacturer, release_year, condition, \
     purchase_date, purchase_price, notes, image_data IS NOT NULL, created_at";

/// Trait defining deck collection operations.
///
/// Every method borrows a live connection through
/// [`ConnectionManager::ensure_connection`], so any of them may also fail with
/// [`DatabaseError::Connection`] or [`DatabaseError::Migration`] when the
/// connection has to be re-established.
pub trait DeckManagerTrait {
    /// Adds a deck to the collection and returns its id.
    ///
    /// # Arguments
    /// * `deck` - Fields stored exactly as given.
    /// * `image` - Optional cover image, stored as an opaque blob.
    ///
    /// # Errors
    /// Returns [`DatabaseError::InvalidInput`] before touching the database if
    /// the name or manufacturer is blank, the price is negative or not finite,
    /// or the release year lies in the future. A failed insert is rolled back
    /// and returned as [`DatabaseError::Query`].
    fn add_deck(&mut self, deck: &NewDeck, image: Option<&[u8]>) -> Result<i64, DatabaseError>;
    fn get_deck(&mut self, id: i64) -> Result<Option<Deck>, DatabaseError>;
    fn get_all_decks(&mut self) -> Result<Vec<Deck>, DatabaseError>;
    fn filter_decks(&mut self, filter: &DeckFilter) -> Result<Vec<Deck>, DatabaseError>;
    fn search_decks(&mut self, query: &str) -> Result<Vec<Deck>, DatabaseError>;
    fn get_deck_image(&mut self, id: i64) -> Result<Option<Vec<u8>>, DatabaseError>;
    fn manufacturers(&mut self) -> Result<Vec<String>, DatabaseError>;
}

/// Deck manager borrowing the application's connection manager.
pub struct DeckManager<'a> {
    db: &'a mut ConnectionManager,
}

impl<'a> DeckManager<'a> {
    /// Creates a manager that borrows `db` for its lifetime.
    pub fn new(db: &'a mut ConnectionManager) -> Self {
        Self { db }
    }
}

/// Reads a row selected with [`DECK_COLUMNS`].
pub(crate) fn row_to_deck(row: &Row<'_>) -> rusqlite::Result<Deck> {
    let condition: String = row.get(4)?;
    Ok(Deck {
        id: row.get(0)?,
        name: row.get(1)?,
        manufacturer: row.get(2)?,
        release_year: row.get(3)?,
        condition: parse_condition(4, &condition)?,
        purchase_date: row.get(5)?,
        purchase_price: row.get(6)?,
        notes: row.get(7)?,
        has_image: row.get(8)?,
        created_at: timestamps::column(row, 9)?,
    })
}

pub(crate) fn parse_condition(idx: usize, raw: &str) -> rusqlite::Result<Condition> {
    raw.parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

impl<'a> DeckManagerTrait for DeckManager<'a> {
    fn add_deck(&mut self, deck: &NewDeck, image: Option<&[u8]>) -> Result<i64, DatabaseError> {
        validation::validate_deck(deck)?;
        let conn = self.db.ensure_connection()?;
        let now = timestamps::to_millis(timestamps::now());

        with_transaction(conn, "add_deck", |tx| {
            tx.execute(
                "INSERT INTO decks (deck_name, manufacturer, release_year, condition, \
                 purchase_date, purchase_price, notes, image_data, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    deck.name,
                    deck.manufacturer,
                    deck.release_year,
                    deck.condition.as_str(),
                    deck.purchase_date,
                    deck.purchase_price,
                    deck.notes,
                    image,
                    now,
                ],
            )?;
            Ok(tx.last_insert_rowid())
        })
    }

    fn get_deck(&mut self, id: i64) -> Result<Option<Deck>, DatabaseError> {
        let conn = self.db.ensure_connection()?;
        let deck = conn
            .query_row(
                &format!("SELECT {} FROM decks WHERE id = ?1", DECK_COLUMNS),
                params![id],
                row_to_deck,
            )
            .optional()?;
        Ok(deck)
    }

    /// Lists the whole collection, newest first.
    fn get_all_decks(&mut self) -> Result<Vec<Deck>, DatabaseError> {
        let conn = self.db.ensure_connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM decks ORDER BY created_at DESC, id DESC",
            DECK_COLUMNS
        ))?;
        let decks = stmt
            .query_map([], row_to_deck)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = decks.len(), "listed decks");
        Ok(decks)
    }

    /// Lists decks matching the manufacturer and condition sets, newest first.
    fn filter_decks(&mut self, filter: &DeckFilter) -> Result<Vec<Deck>, DatabaseError> {
        let decks = self.get_all_decks()?;
        Ok(decks.into_iter().filter(|d| filter.matches(d)).collect())
    }

    /// Case-insensitive substring match on name, manufacturer or notes.
    ///
    /// Case folding follows Unicode (`"ORCHIDÉE"` finds `"Éclat Orchidée"`), and
    /// the query is matched as plain text, so `%` and `_` carry no special meaning.
    fn search_decks(&mut self, query: &str) -> Result<Vec<Deck>, DatabaseError> {
        let conn = self.db.ensure_connection()?;
        let needle = functions::fold(query);
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM decks \
             WHERE instr(fold(deck_name), ?1) > 0 \
                OR instr(fold(manufacturer), ?1) > 0 \
                OR instr(fold(notes), ?1) > 0 \
             ORDER BY created_at DESC, id DESC",
            DECK_COLUMNS
        ))?;
        let decks = stmt
            .query_map(params![needle], row_to_deck)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(query, count = decks.len(), "searched decks");
        Ok(decks)
    }

    /// Returns the stored image, or `None` if the deck has none or does not exist.
    fn get_deck_image(&mut self, id: i64) -> Result<Option<Vec<u8>>, DatabaseError> {
        let conn = self.db.ensure_connection()?;
        let image: Option<Option<Vec<u8>>> = conn
            .query_row(
                "SELECT image_data FROM decks WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(image.flatten())
    }

    /// Distinct manufacturers, sorted.
    fn manufacturers(&mut self) -> Result<Vec<String>, DatabaseError> {
        let conn = self.db.ensure_connection()?;
        let mut stmt =
            conn.prepare("SELECT DISTINCT manufacturer FROM decks ORDER BY manufacturer COLLATE NOCASE")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }
}
