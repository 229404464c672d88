//! Configuration and process-level helpers.

/// Logging setup shared by the servers, the dashboard and the CLI.
pub mod logging;
/// TOML configuration (`tooldeck.toml`).
pub mod toml_config;

pub use toml_config::{ConfigError, ConfigManager, ToolDeckConfig};
