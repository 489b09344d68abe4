//! App Core for deckvault.
//!
//! Owns the connection manager and configuration, and hands out record-store
//! handles that borrow the connection for one logical operation at a time.

use std::fs;

use tracing::info;

use crate::database::ConnectionManager;
use crate::managers::deck_manager::DeckManager;
use crate::managers::market_manager::MarketManager;
use crate::managers::wishlist_manager::WishlistManager;
use crate::services::share_service::{self, ShareService};
use crate::services::statistics;
use crate::types::errors::DatabaseError;
use crate::types::settings::AppConfig;
use crate::types::statistics::CollectionStatistics;

/// Central application struct.
///
/// Managers are created on demand because they borrow the connection manager
/// mutably: `app.decks().add_deck(..)`.
pub struct App {
    db: ConnectionManager,
    config: AppConfig,
}

impl App {
    /// Startup: creates the database directory, connects with retry, and migrates.
    ///
    /// # Arguments
    /// * `config` - Loaded application config; `database` and `retry` drive the connection.
    ///
    /// # Errors
    /// Returns an error if the database directory cannot be created or the
    /// connection manager fails to open (see [`ConnectionManager::open`]).
    pub fn startup(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        if let Some(parent) = config.database.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let db = ConnectionManager::from_config(&config)?;
        info!(path = %config.database.path.display(), "collection database ready");
        Ok(Self { db, config })
    }

    /// Wraps an already opened connection manager.
    pub fn with_database(db: ConnectionManager, config: AppConfig) -> Self {
        Self { db, config }
    }

    /// Shutdown: releases the connection.
    pub fn shutdown(&mut self) {
        self.db.disconnect();
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn database(&mut self) -> &mut ConnectionManager {
        &mut self.db
    }

    pub fn decks(&mut self) -> DeckManager<'_> {
        DeckManager::new(&mut self.db)
    }

    pub fn wishlist(&mut self) -> WishlistManager<'_> {
        WishlistManager::new(&mut self.db)
    }

    pub fn market(&mut self) -> MarketManager<'_> {
        MarketManager::new(&mut self.db)
    }

    pub fn shares(&mut self) -> ShareService<'_> {
        ShareService::new(&mut self.db)
    }

    pub fn statistics(&mut self) -> Result<CollectionStatistics, DatabaseError> {
        statistics::collection_statistics(&mut self.db)
    }

    /// Share link for `token` under the configured base URL.
    pub fn share_url(&self, token: &str) -> String {
        share_service::share_url(&self.config.share.base_url, token)
    }
}
