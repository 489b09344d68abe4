//! Unit tests for the Settings Engine: defaults, file loading, and
//! environment overrides.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use rstest::rstest;
use tempfile::TempDir;

use deckvault::services::settings_engine::{
    SettingsEngine, SettingsEngineTrait, ENV_DATABASE, ENV_SHARE_BASE_URL,
};
use deckvault::types::errors::ConfigError;
use deckvault::types::settings::AppConfig;

#[test]
fn test_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.retry.delay_ms, 1_000);
    assert_eq!(config.database.busy_timeout_ms, 5_000);
    assert!(config.database.path.ends_with("collection.db"));
    assert!(config.share.base_url.is_empty());
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let mut engine = SettingsEngine::new(Some(dir.path().join("config.json")));

    let config = engine.load().expect("missing file is not an error");
    assert_eq!(config.retry, AppConfig::default().retry);
    assert_eq!(config.database.busy_timeout_ms, 5_000);
}

#[test]
fn test_partial_file_fills_in_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "retry": { "max_attempts": 7 } }"#).unwrap();

    let mut engine = SettingsEngine::new(Some(path));
    let config = engine.load().unwrap();
    assert_eq!(config.retry.max_attempts, 7);
    assert_eq!(config.retry.delay_ms, 1_000);
    assert_eq!(engine.get_config(), &config);
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{ retry: ").unwrap();

    let mut engine = SettingsEngine::new(Some(path));
    assert!(matches!(engine.load(), Err(ConfigError::Parse(_))));
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let engine = SettingsEngine::new(Some(path.clone()));

    engine.save().unwrap();
    assert!(path.exists());
    assert_eq!(engine.get_config_path(), path.as_path());

    let saved: AppConfig = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved.retry, AppConfig::default().retry);
}

#[rstest]
#[case(ENV_DATABASE, "/srv/decks/collection.db")]
#[case(ENV_SHARE_BASE_URL, "https://decks.example.net")]
fn test_environment_overrides(#[case] key: &str, #[case] value: &str) {
    let env: HashMap<&str, &str> = [(key, value)].into_iter().collect();
    let mut config = AppConfig::default();
    SettingsEngine::apply_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

    if key == ENV_DATABASE {
        assert_eq!(config.database.path, PathBuf::from(value));
        assert!(config.share.base_url.is_empty());
    } else {
        assert_eq!(config.share.base_url, value);
        assert_eq!(config.database.path, AppConfig::default().database.path);
    }
}

#[test]
fn test_empty_override_is_ignored() {
    let mut config = AppConfig::default();
    SettingsEngine::apply_overrides(&mut config, |_| Some(String::new()));
    assert_eq!(config, AppConfig::default());
}
