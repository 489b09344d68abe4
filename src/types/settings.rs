use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::platform;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    pub retry: RetrySettings,
    pub share: ShareSettings,
}

/// Where the collection database lives and how connections are opened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Database file, or `:memory:` for a throwaway database.
    pub path: PathBuf,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: platform::get_data_dir().join("collection.db"),
            busy_timeout_ms: 5_000,
        }
    }
}

/// Connection retry behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 1_000,
        }
    }
}

/// Share-link rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShareSettings {
    /// Prefix for generated links, e.g. `https://cards.example.org`. Empty yields bare paths.
    pub base_url: String,
}
