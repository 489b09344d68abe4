use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Physical condition grade of a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Condition {
    Mint,
    NearMint,
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Condition {
    /// All grades, best first.
    pub const ALL: [Condition; 6] = [
        Condition::Mint,
        Condition::NearMint,
        Condition::Excellent,
        Condition::Good,
        Condition::Fair,
        Condition::Poor,
    ];

    /// Label stored in the database and shown to users.
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Mint => "Mint",
            Condition::NearMint => "Near Mint",
            Condition::Excellent => "Excellent",
            Condition::Good => "Good",
            Condition::Fair => "Fair",
            Condition::Poor => "Poor",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown condition: {}", s))
    }
}

/// Field values for a deck about to be added to the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDeck {
    pub name: String,
    pub manufacturer: String,
    pub release_year: Option<i32>,
    pub condition: Condition,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: f64,
    pub notes: String,
}

/// A deck stored in the collection.
///
/// The image blob is not carried here; fetch it with `get_deck_image`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: i64,
    pub name: String,
    pub manufacturer: String,
    pub release_year: Option<i32>,
    pub condition: Condition,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: f64,
    pub notes: String,
    pub has_image: bool,
    pub created_at: DateTime<Utc>,
}

/// Restricts a deck listing. Empty sets match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeckFilter {
    pub manufacturers: Vec<String>,
    pub conditions: Vec<Condition>,
}

impl DeckFilter {
    pub fn matches(&self, deck: &Deck) -> bool {
        (self.manufacturers.is_empty() || self.manufacturers.iter().any(|m| m == &deck.manufacturer))
            && (self.conditions.is_empty() || self.conditions.contains(&deck.condition))
    }
}
