// deckvault shared type definitions
// Each submodule defines the records exchanged with the persistence layer.

pub mod deck;
pub mod errors;
pub mod market;
pub mod migration;
pub mod settings;
pub mod share;
pub mod statistics;
pub mod wishlist;
