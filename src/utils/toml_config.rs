//! TOML-based configuration for Tooldeck
//!
//! Every section of `tooldeck.toml` is optional; missing values fall back to
//! the defaults below. Secrets are never stored in the file itself. Instead
//! the file names the environment variable that holds them (`api_key_env`),
//! and `.env` is loaded with dotenvy before resolution.
//!
//! Use [`ConfigManager`] for shared access to the current configuration.

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Root configuration structure loaded from tooldeck.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDeckConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub booking: BookingConfig,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub pdf: PdfConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub agent: AgentConfig,

    /// Named MCP servers the clients and the agent can spawn
    #[serde(default = "default_servers")]
    pub servers: HashMap<String, McpServerConfig>,
}

impl Default for ToolDeckConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            booking: BookingConfig::default(),
            weather: WeatherConfig::default(),
            pdf: PdfConfig::default(),
            llm: LlmConfig::default(),
            agent: AgentConfig::default(),
            servers: default_servers(),
        }
    }
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

// ============= Database Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Local database path, or `:memory:`
    #[serde(default = "default_database_url")]
    pub url: String,

    /// How long a write waits for another process's lock, in milliseconds
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

fn default_database_url() -> String {
    "./data/turf_booking.db".to_string()
}

fn default_busy_timeout() -> u64 {
    5000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

// ============= Booking Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// First bookable hour of the day
    #[serde(default = "default_open_hour")]
    pub open_hour: u32,

    /// Hour the last slot ends
    #[serde(default = "default_close_hour")]
    pub close_hour: u32,

    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_open_hour() -> u32 {
    6
}

fn default_close_hour() -> u32 {
    23
}

fn default_currency() -> String {
    "₹".to_string()
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            open_hour: default_open_hour(),
            close_hour: default_close_hour(),
            currency: default_currency(),
        }
    }
}

// ============= Weather Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_base")]
    pub base_url: String,

    /// Environment variable containing the WeatherAPI key
    #[serde(default = "default_weather_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_weather_timeout")]
    pub timeout_secs: u64,
}

fn default_weather_base() -> String {
    "http://api.weatherapi.com/v1".to_string()
}

fn default_weather_key_env() -> String {
    "WEATHER_API_KEY".to_string()
}

fn default_weather_timeout() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base(),
            api_key_env: default_weather_key_env(),
            timeout_secs: default_weather_timeout(),
        }
    }
}

// ============= PDF Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Maximum number of documents kept in the text cache
    #[serde(default = "default_pdf_entries")]
    pub max_entries: usize,

    /// Maximum total size of cached text in bytes
    #[serde(default = "default_pdf_bytes")]
    pub max_bytes: u64,

    /// Optional JSON file the cache is persisted to
    #[serde(default = "default_pdf_cache_file")]
    pub cache_file: Option<PathBuf>,
}

fn default_pdf_entries() -> usize {
    16
}

fn default_pdf_bytes() -> u64 {
    32 * 1024 * 1024
}

fn default_pdf_cache_file() -> Option<PathBuf> {
    Some(PathBuf::from("pdf_cache.json"))
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_entries: default_pdf_entries(),
            max_bytes: default_pdf_bytes(),
            cache_file: default_pdf_cache_file(),
        }
    }
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible API base (Groq by default)
    #[serde(default = "default_llm_base")]
    pub base_url: String,

    /// Environment variable containing the API key
    #[serde(default = "default_llm_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: usize,

    /// Overrides the built-in system prompt
    pub system_prompt: Option<String>,
}

fn default_llm_base() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_llm_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_llm_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_temperature() -> f32 {
    0.0
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_max_tool_iterations() -> usize {
    8
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base(),
            api_key_env: default_llm_key_env(),
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_tool_iterations: default_max_tool_iterations(),
            system_prompt: None,
        }
    }
}

// ============= Agent Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// How long to wait for the worker thread to come up
    #[serde(default = "default_start_timeout")]
    pub start_timeout_secs: u64,

    #[serde(default = "default_setup_timeout")]
    pub setup_timeout_secs: u64,

    #[serde(default = "default_message_timeout")]
    pub message_timeout_secs: u64,

    /// Names from `[servers]` whose tools the agent may call
    #[serde(default = "default_agent_servers")]
    pub servers: Vec<String>,
}

fn default_start_timeout() -> u64 {
    10
}

fn default_setup_timeout() -> u64 {
    30
}

fn default_message_timeout() -> u64 {
    120
}

fn default_agent_servers() -> Vec<String> {
    vec!["booking".to_string()]
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            start_timeout_secs: default_start_timeout(),
            setup_timeout_secs: default_setup_timeout(),
            message_timeout_secs: default_message_timeout(),
            servers: default_agent_servers(),
        }
    }
}

// ============= MCP Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServerConfig {
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Extra environment for the child process
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl McpServerConfig {
    /// Runs `tooldeck serve <kind>` using the current executable.
    pub fn builtin(kind: &str) -> Self {
        let command = std::env::current_exe()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "tooldeck".to_string());
        Self {
            command,
            args: vec!["serve".to_string(), kind.to_string()],
            env: HashMap::new(),
        }
    }
}

fn default_servers() -> HashMap<String, McpServerConfig> {
    ["calculator", "weather", "pdf", "booking", "prompts", "demo"]
        .into_iter()
        .map(|kind| (kind.to_string(), McpServerConfig::builtin(kind)))
        .collect()
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Server '{0}' referenced by the agent does not exist")]
    MissingServer(String),
}

impl ToolDeckConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load from a file when it exists, otherwise use the defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            info!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ToolDeckConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate internal consistency. Env vars are checked lazily, when the
    /// component that needs them starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let booking = &self.booking;
        if booking.open_hour >= booking.close_hour || booking.close_hour > 24 {
            return Err(ConfigError::ValidationError(format!(
                "booking hours must satisfy open < close <= 24 (got {}..{})",
                booking.open_hour, booking.close_hour
            )));
        }

        if self.pdf.max_entries == 0 {
            return Err(ConfigError::ValidationError(
                "pdf.max_entries must be at least 1".to_string(),
            ));
        }

        if self.llm.max_tool_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "llm.max_tool_iterations must be at least 1".to_string(),
            ));
        }

        for name in &self.agent.servers {
            if !self.servers.contains_key(name) {
                return Err(ConfigError::MissingServer(name.clone()));
            }
        }

        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok().filter(|v| !v.is_empty())
    }

    /// Get the LLM API key from the environment
    pub fn llm_api_key(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.llm.api_key_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.llm.api_key_env.clone()))
    }

    /// Get the weather API key from the environment
    pub fn weather_api_key(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.weather.api_key_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.weather.api_key_env.clone()))
    }

    pub fn get_server(&self, name: &str) -> Option<&McpServerConfig> {
        self.servers.get(name)
    }
}

// ============= Configuration Manager =============

/// Thread-safe configuration holder with manual reload
pub struct ConfigManager {
    config: Arc<ArcSwap<ToolDeckConfig>>,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load from `path`, falling back to defaults when the file is absent
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = ToolDeckConfig::load_or_default(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: Some(path),
        })
    }

    /// Create a config manager directly from a config (useful for testing)
    pub fn from_config(config: ToolDeckConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: None,
        }
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<ToolDeckConfig> {
        self.config.load_full()
    }

    /// Re-read the configuration from disk. A failed reload keeps the
    /// previous configuration.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let Some(path) = &self.config_path else {
            return Ok(());
        };
        info!("Reloading configuration from {:?}", path);

        let new_config = ToolDeckConfig::load(path)?;
        self.config.store(Arc::new(new_config));

        info!("Configuration reloaded successfully");
        Ok(())
    }
}

impl Clone for ConfigManager {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            config_path: self.config_path.clone(),
        }
    }
}
