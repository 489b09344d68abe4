use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::deck::Condition;

/// A market price observation for one deck from one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketValueUpdate {
    pub market_price: f64,
    /// e.g. "eBay", "CardMarket", "Portfolio52".
    pub source: String,
    pub condition: Condition,
    pub notes: String,
}

/// A market value row joined with the deck it prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketValue {
    pub id: i64,
    pub deck_id: i64,
    pub deck_name: String,
    pub manufacturer: String,
    pub purchase_price: f64,
    pub market_price: f64,
    pub source: String,
    pub condition: Condition,
    pub notes: String,
    pub updated_at: DateTime<Utc>,
}

/// Collection-wide market metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Sum of the most recent market price of every priced deck.
    pub total_market_value: f64,
    /// Sum of the purchase prices of the same decks.
    pub total_purchase_value: f64,
    /// Percentage change from purchase to market value; `None` when nothing was paid.
    pub value_change_pct: Option<f64>,
    pub priced_decks: usize,
}
