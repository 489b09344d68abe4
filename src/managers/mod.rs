// deckvault record-store managers
// Managers handle per-entity CRUD: decks, wishlist, market values.

pub mod deck_manager;
pub mod market_manager;
pub mod validation;
pub mod wishlist_manager;
