//! Share-link generation for deckvault.
//!
//! A shared collection is a persisted, optionally expiring view over a subset
//! of decks. It is addressed externally by an opaque UUID token (`share_id`),
//! never by its row id. Deck ids are stored as an ordered JSON array and are
//! not foreign keys: decks that no longer exist are skipped when the view is
//! read.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::{timestamps, with_transaction, ConnectionManager};
use crate::managers::deck_manager::{row_to_deck, DECK_COLUMNS};
use crate::managers::validation;
use crate::types::deck::Deck;
use crate::types::errors::DatabaseError;
use crate::types::share::{NewSharedCollection, SharedCollection, SharedCollectionView};

const SHARE_COLUMNS: &str =
    "id, share_id, name, description, deck_ids, created_at, expires_at, is_public";

/// Trait defining share-link operations.
pub trait ShareServiceTrait {
    /// Persists a shared view and returns its freshly generated token.
    ///
    /// # Arguments
    /// * `share` - Name, ordered deck ids, description, optional expiry and
    ///   visibility. Deck ids are not checked against the collection.
    ///
    /// # Errors
    /// Returns [`DatabaseError::InvalidInput`] if the name is blank or no deck
    /// ids are given, and [`DatabaseError::Query`] if the insert fails.
    fn create_shared_collection(&mut self, share: &NewSharedCollection) -> Result<String, DatabaseError>;
    /// `None` when the token is unknown or the share has expired.
    fn get_shared_collection(&mut self, token: &str) -> Result<Option<SharedCollectionView>, DatabaseError>;
    fn get_active_shared_collections(&mut self) -> Result<Vec<SharedCollection>, DatabaseError>;
}

/// Share service borrowing the application's connection manager.
pub struct ShareService<'a> {
    db: &'a mut ConnectionManager,
}

/// Path component of a share link.
pub fn share_path(token: &str) -> String {
    format!("/shared/{}", token)
}

/// Full share link under `base_url`; an empty base yields the bare path.
pub fn share_url(base_url: &str, token: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), share_path(token))
}

impl<'a> ShareService<'a> {
    /// Creates a service that borrows `db` for its lifetime.
    pub fn new(db: &'a mut ConnectionManager) -> Self {
        Self { db }
    }

    fn row_to_share(row: &Row<'_>) -> rusqlite::Result<SharedCollection> {
        let raw_ids: String = row.get(4)?;
        let deck_ids: Vec<i64> = serde_json::from_str(&raw_ids).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(SharedCollection {
            id: row.get(0)?,
            share_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            deck_ids,
            created_at: timestamps::column(row, 5)?,
            expires_at: timestamps::optional_column(row, 6)?,
            is_public: row.get(7)?,
        })
    }

    /// Loads the decks listed in the stored `deck_ids` array, in stored order,
    /// dropping ids with no row. A repeated id resolves once, at its first
    /// position. The array is expanded by `json_each` inside SQLite, so its
    /// length is not bounded by the bind-variable limit.
    fn resolve_decks(conn: &Connection, collection: &SharedCollection) -> Result<Vec<Deck>, DatabaseError> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM ( \
                 SELECT j.value AS deck_id, MIN(j.key) AS position \
                 FROM shared_collections s, json_each(s.deck_ids) j \
                 WHERE s.id = ?1 \
                 GROUP BY j.value \
             ) ids \
             JOIN decks ON decks.id = ids.deck_id \
             ORDER BY ids.position",
            DECK_COLUMNS
        ))?;
        let decks = stmt
            .query_map(params![collection.id], row_to_deck)?
            .collect::<Result<Vec<_>, _>>()?;
        if decks.len() < collection.deck_ids.len() {
            debug!(
                requested = collection.deck_ids.len(),
                resolved = decks.len(),
                "shared collection references missing or repeated decks"
            );
        }
        Ok(decks)
    }
}

impl<'a> ShareServiceTrait for ShareService<'a> {
    fn create_shared_collection(&mut self, share: &NewSharedCollection) -> Result<String, DatabaseError> {
        validation::require_text("share name", &share.name)?;
        if share.deck_ids.is_empty() {
            return Err(DatabaseError::InvalidInput(
                "a shared collection needs at least one deck".to_string(),
            ));
        }

        let token = Uuid::new_v4().to_string();
        let deck_ids = serde_json::to_string(&share.deck_ids)
            .map_err(|e| DatabaseError::InvalidInput(format!("deck ids: {}", e)))?;
        let now = timestamps::to_millis(timestamps::now());
        let expires_at = share.expires_at.map(timestamps::to_millis);

        let conn = self.db.ensure_connection()?;
        with_transaction(conn, "create_shared_collection", |tx| {
            tx.execute(
                "INSERT INTO shared_collections \
                 (share_id, name, description, deck_ids, created_at, expires_at, is_public) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    token,
                    share.name,
                    share.description,
                    deck_ids,
                    now,
                    expires_at,
                    share.is_public,
                ],
            )?;
            Ok(())
        })?;

        info!(share_id = %token, decks = share.deck_ids.len(), "shared collection created");
        Ok(token)
    }

    fn get_shared_collection(&mut self, token: &str) -> Result<Option<SharedCollectionView>, DatabaseError> {
        let conn = self.db.ensure_connection()?;
        let collection = conn
            .query_row(
                &format!("SELECT {} FROM shared_collections WHERE share_id = ?1", SHARE_COLUMNS),
                params![token],
                Self::row_to_share,
            )
            .optional()?;

        let collection = match collection {
            Some(c) if !c.is_expired_at(timestamps::now()) => c,
            Some(_) => {
                debug!(share_id = token, "shared collection expired");
                return Ok(None);
            }
            None => return Ok(None),
        };

        let decks = Self::resolve_decks(conn, &collection)?;
        Ok(Some(SharedCollectionView { collection, decks }))
    }

    /// Shares with no expiry or an expiry still ahead, newest first.
    fn get_active_shared_collections(&mut self) -> Result<Vec<SharedCollection>, DatabaseError> {
        let conn = self.db.ensure_connection()?;
        let now: DateTime<Utc> = timestamps::now();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM shared_collections \
             WHERE expires_at IS NULL OR expires_at > ?1 \
             ORDER BY created_at DESC, id DESC",
            SHARE_COLUMNS
        ))?;
        let shares = stmt
            .query_map(params![timestamps::to_millis(now)], Self::row_to_share)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(shares)
    }
}
