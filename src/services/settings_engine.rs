// deckvault Settings Engine
// Loads and saves the application config as JSON at the platform config path,
// then applies environment overrides for the database location and share base URL.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::platform;
use crate::types::errors::ConfigError;
use crate::types::settings::AppConfig;

/// Overrides `database.path`.
pub const ENV_DATABASE: &str = "DECKVAULT_DATABASE";
/// Overrides `share.base_url`.
pub const ENV_SHARE_BASE_URL: &str = "DECKVAULT_SHARE_BASE_URL";

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<AppConfig, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn get_config(&self) -> &AppConfig;
    fn get_config_path(&self) -> &Path;
}

/// Settings engine persisting `AppConfig` as JSON on disk.
pub struct SettingsEngine {
    config_path: PathBuf,
    config: AppConfig,
}

impl SettingsEngine {
    /// Uses `path_override` if given, otherwise `config.json` in the platform config dir.
    pub fn new(path_override: Option<PathBuf>) -> Self {
        let config_path =
            path_override.unwrap_or_else(|| platform::get_config_dir().join("config.json"));
        Self {
            config_path,
            config: AppConfig::default(),
        }
    }

    /// Applies overrides from an environment lookup. Empty values are ignored.
    pub fn apply_overrides<F>(config: &mut AppConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DATABASE).filter(|v| !v.is_empty()) {
            debug!(path = %path, "database path overridden from environment");
            config.database.path = PathBuf::from(path);
        }
        if let Some(url) = lookup(ENV_SHARE_BASE_URL).filter(|v| !v.is_empty()) {
            config.share.base_url = url;
        }
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Reads the config file; a missing file yields defaults, a malformed one
    /// is an error. Environment overrides are applied last.
    fn load(&mut self) -> Result<AppConfig, ConfigError> {
        let mut config = if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path)?;
            serde_json::from_str(&content)?
        } else {
            debug!(path = %self.config_path.display(), "no config file; using defaults");
            AppConfig::default()
        };

        Self::apply_overrides(&mut config, |key| std::env::var(key).ok());
        self.config = config;
        Ok(self.config.clone())
    }

    /// Writes the current config, creating parent directories as needed.
    fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.config)?;
        fs::write(&self.config_path, json)?;
        Ok(())
    }

    fn get_config(&self) -> &AppConfig {
        &self.config
    }

    fn get_config_path(&self) -> &Path {
        &self.config_path
    }
}
