//! Configuration module for loading TOML files and environment overrides.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an optional TOML configuration file.
pub const CONFIG_PATH_ENV: &str = "TRADES_CONFIG";

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse TOML configuration.
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Invalid configuration value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development: debug logging, binds all interfaces.
    #[default]
    Development,
    /// Production: quieter logging, binds loopback unless told otherwise.
    Production,
}

impl Environment {
    /// Parses an environment name. Unknown names fall back to development.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    /// Whether debug behaviour is enabled.
    #[must_use]
    pub fn is_debug(self) -> bool {
        matches!(self, Self::Development)
    }

    /// Default bind address for this environment.
    #[must_use]
    pub fn default_host(self) -> &'static str {
        match self {
            Self::Development => "0.0.0.0",
            Self::Production => "127.0.0.1",
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Deployment environment.
    pub environment: Environment,
    /// Server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Request validation configuration.
    pub validation: ValidationConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to. Defaults per environment when unset.
    pub host: Option<String>,
    /// Port number to listen on.
    pub port: u16,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: 5000,
            request_timeout_secs: 30,
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one JSON file per trade.
    pub trades_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            trades_dir: PathBuf::from("trades"),
        }
    }
}

/// Request validation configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Fields that must be present when creating a trade.
    pub required_fields: Vec<String>,
    /// Accepted values for `side`.
    pub valid_sides: Vec<String>,
    /// Reject creates whose `side` is not in `valid_sides`.
    pub enforce_side: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            required_fields: ["symbol", "quantity", "price", "side"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            valid_sides: vec!["BUY".to_string(), "SELL".to_string()],
            enforce_side: false,
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file.
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Arguments
    /// * `content` - TOML content as string.
    ///
    /// # Errors
    /// Returns error if content cannot be parsed.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds configuration from the process environment.
    ///
    /// Starts from the file named by `TRADES_CONFIG` if set, otherwise from
    /// defaults, then applies environment overrides.
    ///
    /// # Errors
    /// Returns error if the file cannot be loaded or a variable is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns error if the file cannot be loaded or a variable is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_PATH_ENV) {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(env) = lookup("APP_ENV").or_else(|| lookup("FLASK_ENV")) {
            config.environment = Environment::from_name(&env);
        }
        if let Some(host) = lookup("HOST") {
            config.server.host = Some(host);
        }
        if let Some(port) = lookup("PORT") {
            config.server.port = parse_port(&port)?;
        }
        if let Some(secs) = lookup("REQUEST_TIMEOUT_SECS") {
            config.server.request_timeout_secs = secs.trim().parse().map_err(|_| {
                ConfigError::InvalidValue(format!("REQUEST_TIMEOUT_SECS {secs} is not a number"))
            })?;
        }
        if let Some(dir) = lookup("TRADES_DIR") {
            config.storage.trades_dir = PathBuf::from(dir);
        }
        if let Some(fields) = lookup("REQUIRED_FIELDS") {
            config.validation.required_fields = split_list(&fields);
        }
        if let Some(sides) = lookup("VALID_SIDES") {
            config.validation.valid_sides = split_list(&sides);
        }
        if let Some(flag) = lookup("ENFORCE_SIDE") {
            config.validation.enforce_side = parse_flag(&flag);
        }

        config.validate()?;
        Ok(config)
    }

    /// Host to bind, falling back to the environment's default.
    #[must_use]
    pub fn host(&self) -> &str {
        self.server
            .host
            .as_deref()
            .unwrap_or_else(|| self.environment.default_host())
    }

    /// Address to bind, as `host:port`.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host(), self.server.port)
    }

    /// Per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Validates the configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue(
                "port must be between 1 and 65535".to_string(),
            ));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.storage.trades_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue(
                "trades_dir cannot be empty".to_string(),
            ));
        }
        if self.validation.required_fields.is_empty() {
            return Err(ConfigError::InvalidValue(
                "at least one required field must be configured".to_string(),
            ));
        }
        if self.validation.enforce_side && self.validation.valid_sides.is_empty() {
            return Err(ConfigError::InvalidValue(
                "enforce_side requires at least one valid side".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parses a port number, accepting only 1-65535.
///
/// # Errors
/// Returns [`ConfigError::InvalidValue`] for non-numeric or out-of-range input.
pub fn parse_port(value: &str) -> Result<u16, ConfigError> {
    let port: u32 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(format!("port {value} is not a number")))?;

    match u16::try_from(port) {
        Ok(port) if port >= 1 => Ok(port),
        _ => Err(ConfigError::InvalidValue(format!(
            "port {value} is not in valid range 1-65535"
        ))),
    }
}

/// Splits a comma separated list, dropping empty items.
#[must_use]
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
