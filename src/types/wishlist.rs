use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest and highest wishlist priority.
pub const MIN_PRIORITY: i32 = 1;
pub const MAX_PRIORITY: i32 = 5;

/// Field values for a deck the collector would like to acquire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWishlistItem {
    pub name: String,
    pub manufacturer: String,
    pub expected_price: f64,
    /// 1 = lowest, 5 = highest.
    pub priority: i32,
    pub notes: String,
}

/// A stored wishlist entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: i64,
    pub name: String,
    pub manufacturer: String,
    pub expected_price: f64,
    pub priority: i32,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}
