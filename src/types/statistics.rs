use serde::{Deserialize, Serialize};

use super::deck::Condition;

/// Aggregate figures over the whole collection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollectionStatistics {
    pub total_decks: i64,
    pub total_purchase_value: f64,
    /// `None` for an empty collection.
    pub average_purchase_price: Option<f64>,
    /// (manufacturer, summed purchase price), highest value first.
    pub value_by_manufacturer: Vec<(String, f64)>,
    /// (condition, deck count), best grade first.
    pub decks_by_condition: Vec<(Condition, i64)>,
}
