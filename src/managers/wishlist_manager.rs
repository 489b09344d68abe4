//! Wishlist Manager for deckvault.
//!
//! Implements `WishlistManagerTrait`: adding, removing and listing decks the
//! collector wants to acquire.

use rusqlite::{params, Row};
use tracing::debug;

use super::validation;
use crate::database::{timestamps, with_transaction, ConnectionManager};
use crate::types::errors::DatabaseError;
use crate::types::wishlist::{NewWishlistItem, WishlistItem};

const WISHLIST_COLUMNS: &str =
    "id, deck_name, manufacturer, expected_price, priority, notes, created_at";

/// Trait defining wishlist operations.
pub trait WishlistManagerTrait {
    /// Adds an item and returns its id.
    ///
    /// # Errors
    /// [`DatabaseError::InvalidInput`] for a blank name or manufacturer, a
    /// negative expected price, or a priority outside 1..=5.
    fn add_wishlist_item(&mut self, item: &NewWishlistItem) -> Result<i64, DatabaseError>;
    /// Returns whether a row was removed; a missing id is not an error.
    fn remove_wishlist_item(&mut self, id: i64) -> Result<bool, DatabaseError>;
    fn get_wishlist(&mut self) -> Result<Vec<WishlistItem>, DatabaseError>;
    fn get_wishlist_by_priority(&mut self, priority: i32) -> Result<Vec<WishlistItem>, DatabaseError>;
}

/// Wishlist manager borrowing the application's connection manager.
pub struct WishlistManager<'a> {
    db: &'a mut ConnectionManager,
}

impl<'a> WishlistManager<'a> {
    pub fn new(db: &'a mut ConnectionManager) -> Self {
        Self { db }
    }

    fn row_to_item(row: &Row<'_>) -> rusqlite::Result<WishlistItem> {
        Ok(WishlistItem {
            id: row.get(0)?,
            name: row.get(1)?,
            manufacturer: row.get(2)?,
            expected_price: row.get(3)?,
            priority: row.get(4)?,
            notes: row.get(5)?,
            created_at: timestamps::column(row, 6)?,
        })
    }
}

impl<'a> WishlistManagerTrait for WishlistManager<'a> {
    fn add_wishlist_item(&mut self, item: &NewWishlistItem) -> Result<i64, DatabaseError> {
        validation::validate_wishlist_item(item)?;
        let conn = self.db.ensure_connection()?;
        let now = timestamps::to_millis(timestamps::now());

        with_transaction(conn, "add_wishlist_item", |tx| {
            tx.execute(
                "INSERT INTO wishlist (deck_name, manufacturer, expected_price, priority, notes, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    item.name,
                    item.manufacturer,
                    item.expected_price,
                    item.priority,
                    item.notes,
                    now,
                ],
            )?;
            Ok(tx.last_insert_rowid())
        })
    }

    fn remove_wishlist_item(&mut self, id: i64) -> Result<bool, DatabaseError> {
        let conn = self.db.ensure_connection()?;
        let removed = with_transaction(conn, "remove_wishlist_item", |tx| {
            Ok(tx.execute("DELETE FROM wishlist WHERE id = ?1", params![id])?)
        })?;
        debug!(id, removed, "wishlist removal");
        Ok(removed > 0)
    }

    /// Highest priority first, newest first within a priority.
    fn get_wishlist(&mut self) -> Result<Vec<WishlistItem>, DatabaseError> {
        let conn = self.db.ensure_connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM wishlist ORDER BY priority DESC, created_at DESC, id DESC",
            WISHLIST_COLUMNS
        ))?;
        let items = stmt
            .query_map([], Self::row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn get_wishlist_by_priority(&mut self, priority: i32) -> Result<Vec<WishlistItem>, DatabaseError> {
        let conn = self.db.ensure_connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM wishlist WHERE priority = ?1 ORDER BY created_at DESC, id DESC",
            WISHLIST_COLUMNS
        ))?;
        let items = stmt
            .query_map(params![priority], Self::row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }
}
