//! Loading and reloading tooldeck.toml from disk.

use std::fs;
use tooldeck::utils::toml_config::{ConfigError, ConfigManager, ToolDeckConfig};

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let manager = ConfigManager::new(dir.path().join("tooldeck.toml")).unwrap();
    let config = manager.config();

    assert_eq!(config.server.port, 8501);
    assert_eq!(config.database.busy_timeout_ms, 5000);
    assert!(config.validate().is_ok());
    for name in &config.agent.servers {
        assert!(config.get_server(name).is_some(), "missing server {}", name);
    }
}

#[test]
fn test_default_servers_run_this_binary() {
    let config = ToolDeckConfig::default();
    let booking = config.get_server("booking").unwrap();
    assert_eq!(booking.args, vec!["serve", "booking"]);
    assert_eq!(config.servers.len(), 6);
}

#[test]
fn test_reload_picks_up_changes_and_keeps_old_on_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tooldeck.toml");
    fs::write(&path, "[server]\nport = 9100\n").unwrap();

    let manager = ConfigManager::new(&path).unwrap();
    assert_eq!(manager.config().server.port, 9100);

    fs::write(&path, "[server]\nport = 9200\n").unwrap();
    manager.reload().unwrap();
    assert_eq!(manager.config().server.port, 9200);

    fs::write(&path, "[booking]\nopen_hour = 23\nclose_hour = 6\n").unwrap();
    assert!(matches!(
        manager.reload(),
        Err(ConfigError::ValidationError(_))
    ));
    assert_eq!(manager.config().server.port, 9200);
}

#[test]
fn test_full_config_serializes_back() {
    let config = ToolDeckConfig::default();
    let text = toml::to_string_pretty(&config).unwrap();
    let parsed = ToolDeckConfig::from_toml(&text).unwrap();

    assert_eq!(parsed.llm.model, config.llm.model);
    assert_eq!(parsed.agent.servers, config.agent.servers);
    assert_eq!(parsed.servers.len(), config.servers.len());
}

#[test]
fn test_malformed_toml() {
    let result = ToolDeckConfig::from_toml("[server\nport = 1");
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}
