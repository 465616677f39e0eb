//! Server configuration management
//!
//! Handles loading configuration from environment variables, TOML files, and CLI arguments.

use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid port number: {0}. Must be between 1 and 65535")]
    InvalidPort(u16),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid environment: {0}. Must be one of: development, staging, production")]
    InvalidEnvironment(String),

    #[error("Invalid timeout for {0}: must be at least 1 second")]
    InvalidTimeout(&'static str),

    #[error("API key authentication is required but no API keys are configured")]
    MissingApiKeys,

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),
}

/// Log levels supported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable multi-line output
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

/// Environment types for configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidEnvironment(s.to_string())),
        }
    }
}

impl Environment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Server configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Log level
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    /// Log output format
    #[serde(deserialize_with = "deserialize_log_format")]
    pub log_format: LogFormat,
    /// Whether API key authentication is required for market endpoints
    pub api_key_required: bool,
    /// List of valid API keys
    #[serde(default)]
    pub api_keys: Vec<String>,
    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
    /// Shutdown timeout in seconds
    pub shutdown_timeout_secs: u64,
    /// Environment (development, staging, production)
    #[serde(deserialize_with = "deserialize_environment")]
    pub environment: Environment,
    /// FRED API key for rate observations
    pub fred_api_key: Option<String>,
    /// FRED observations endpoint
    pub fred_base_url: String,
    /// Yahoo Finance options endpoint
    pub yahoo_base_url: String,
    /// CSV file with `Date,Ticker,Close` rows
    pub history_csv: Option<PathBuf>,
    /// Timeout for upstream data requests in seconds
    pub upstream_timeout_secs: u64,
    /// External pricing engine base URL; pricing is disabled when unset
    pub pricing_engine_url: Option<String>,
    /// Pricing call timeout in seconds
    pub pricing_timeout_secs: u64,
    /// Port for the Prometheus scrape endpoint; disabled when unset
    pub metrics_port: Option<u16>,
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s).map_err(serde::de::Error::custom)
}

fn deserialize_log_format<'de, D>(deserializer: D) -> Result<LogFormat, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogFormat::from_str(&s).map_err(serde::de::Error::custom)
}

fn deserialize_environment<'de, D>(deserializer: D) -> Result<Environment, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Environment::from_str(&s).map_err(serde::de::Error::custom)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: LogLevel::Info,
            log_format: LogFormat::Json,
            api_key_required: false,
            api_keys: Vec::new(),
            cors_origins: vec!["*".to_string()],
            shutdown_timeout_secs: 30,
            environment: Environment::Development,
            fred_api_key: None,
            fred_base_url: "https://api.stlouisfed.org/fred/series/observations".to_string(),
            yahoo_base_url: "https://query2.finance.yahoo.com/v7/finance/options".to_string(),
            history_csv: None,
            upstream_timeout_secs: 8,
            pricing_engine_url: None,
            pricing_timeout_secs: 20,
            metrics_port: None,
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    env_var(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::EnvError(format!("{name}={raw}")))
        })
        .transpose()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl ServerConfig {
    /// Create a new ServerConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `MARKET_*` environment variables on top of `self`
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(host) = env_var("MARKET_SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = parse_env::<u16>("MARKET_SERVER_PORT")? {
            self.port = port;
        }
        if let Some(level) = env_var("MARKET_LOG_LEVEL") {
            self.log_level = LogLevel::from_str(&level)?;
        }
        if let Some(format) = env_var("MARKET_LOG_FORMAT") {
            self.log_format = LogFormat::from_str(&format)?;
        }
        if let Some(required) = env_var("MARKET_API_KEY_REQUIRED") {
            self.api_key_required = required.eq_ignore_ascii_case("true") || required == "1";
        }
        if let Some(keys) = env_var("MARKET_API_KEYS") {
            self.api_keys = split_list(&keys);
        }
        if let Some(origins) = env_var("MARKET_CORS_ORIGINS") {
            self.cors_origins = split_list(&origins);
        }
        if let Some(env) = env_var("MARKET_ENV") {
            self.environment = Environment::from_str(&env)?;
        }
        if let Some(key) = env_var("MARKET_FRED_API_KEY") {
            self.fred_api_key = Some(key);
        }
        if let Some(path) = env_var("MARKET_HISTORY_CSV") {
            self.history_csv = Some(PathBuf::from(path));
        }
        if let Some(url) = env_var("MARKET_PRICING_ENGINE_URL") {
            self.pricing_engine_url = Some(url);
        }
        if let Some(secs) = parse_env::<u64>("MARKET_PRICING_TIMEOUT_SECS")? {
            self.pricing_timeout_secs = secs;
        }
        if let Some(secs) = parse_env::<u64>("MARKET_UPSTREAM_TIMEOUT_SECS")? {
            self.upstream_timeout_secs = secs;
        }
        if let Some(port) = parse_env::<u16>("MARKET_METRICS_PORT")? {
            self.metrics_port = Some(port);
        }
        Ok(())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;

        let config: ServerConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }
        if self.pricing_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("pricing"));
        }
        if self.upstream_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("upstream"));
        }
        if self.api_key_required && self.api_keys.is_empty() {
            return Err(ConfigError::MissingApiKeys);
        }

        Ok(())
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) {
        if let Some(host) = &cli.host {
            self.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(log_level) = &cli.log_level {
            if let Ok(level) = LogLevel::from_str(log_level) {
                self.log_level = level;
            }
        }
        if let Some(log_format) = &cli.log_format {
            if let Ok(format) = LogFormat::from_str(log_format) {
                self.log_format = format;
            }
        }
        if let Some(path) = &cli.history_csv {
            self.history_csv = Some(path.clone());
        }
    }
}

/// CLI arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Host address override
    pub host: Option<String>,
    /// Port override
    pub port: Option<u16>,
    /// Log level override
    pub log_level: Option<String>,
    /// Log format override
    pub log_format: Option<String>,
    /// Price history CSV override
    pub history_csv: Option<PathBuf>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<ServerConfig, ConfigError> {
    let mut config = if let Some(config_path) = &cli.config_file {
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;
        toml::from_str(&content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?
    } else {
        ServerConfig::default()
    };

    config.apply_env()?;
    config.merge_with_cli(cli);

    // Final validation
    config.validate()?;

    Ok(config)
}
