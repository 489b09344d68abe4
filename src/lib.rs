//! deckvault: a playing-card deck collection manager.
//!
//! This library crate exposes the persistence core (connection management,
//! migrations, record store, share links) for the binary and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod services;
pub mod types;
