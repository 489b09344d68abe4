use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::deck::Deck;

/// Parameters for a new shared view of the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSharedCollection {
    pub name: String,
    pub deck_ids: Vec<i64>,
    pub description: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_public: bool,
}

/// Stored metadata for a shared view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedCollection {
    pub id: i64,
    /// Opaque external token, distinct from `id`.
    pub share_id: String,
    pub name: String,
    pub description: String,
    pub deck_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_public: bool,
}

impl SharedCollection {
    /// True when an expiry is set and `now` has reached it.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

/// A shared view as read through its token: metadata plus resolved decks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedCollectionView {
    pub collection: SharedCollection,
    /// Decks in stored order; ids that no longer resolve are omitted.
    pub decks: Vec<Deck>,
}
