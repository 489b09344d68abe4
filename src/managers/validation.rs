// Input checks shared by the record-store managers.
// They run before any statement is issued, so a rejected write touches nothing.

use chrono::{Datelike, Utc};

use crate::types::deck::NewDeck;
use crate::types::errors::DatabaseError;
use crate::types::market::MarketValueUpdate;
use crate::types::wishlist::{NewWishlistItem, MAX_PRIORITY, MIN_PRIORITY};

fn invalid(msg: impl Into<String>) -> DatabaseError {
    DatabaseError::InvalidInput(msg.into())
}

pub fn require_text(field: &str, value: &str) -> Result<(), DatabaseError> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{} is required", field)));
    }
    Ok(())
}

pub fn require_price(field: &str, value: f64) -> Result<(), DatabaseError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(format!("{} must be a non-negative amount, got {}", field, value)));
    }
    Ok(())
}

pub fn validate_deck(deck: &NewDeck) -> Result<(), DatabaseError> {
    require_text("deck name", &deck.name)?;
    require_text("manufacturer", &deck.manufacturer)?;
    require_price("purchase price", deck.purchase_price)?;
    if let Some(year) = deck.release_year {
        let current = Utc::now().year();
        if year > current {
            return Err(invalid(format!(
                "release year {} is after the current year {}",
                year, current
            )));
        }
    }
    Ok(())
}

pub fn validate_wishlist_item(item: &NewWishlistItem) -> Result<(), DatabaseError> {
    require_text("deck name", &item.name)?;
    require_text("manufacturer", &item.manufacturer)?;
    require_price("expected price", item.expected_price)?;
    if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&item.priority) {
        return Err(invalid(format!(
            "priority must be between {} and {}, got {}",
            MIN_PRIORITY, MAX_PRIORITY, item.priority
        )));
    }
    Ok(())
}

pub fn validate_market_value(update: &MarketValueUpdate) -> Result<(), DatabaseError> {
    require_text("source", &update.source)?;
    require_price("market price", update.market_price)
}
