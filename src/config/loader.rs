use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/newsdesk/config.toml` on Unix/macOS, or the
    /// equivalent from `dirs::config_dir()` elsewhere. Falls back to the
    /// current directory if no config dir is available.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("newsdesk").join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - Otherwise parses it as TOML and validates it.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - At least one relay is configured and relay names are unique
    /// - Page size is within 1..=100
    /// - Timeouts are non-zero and the per-attempt timeout fits under the ceiling
    /// - The gateway bind address parses
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relays.is_empty() {
            return Err(invalid("At least one relay must be configured"));
        }

        for (i, relay) in self.relays.iter().enumerate() {
            if self.relays[..i].iter().any(|r| r.name == relay.name) {
                return Err(invalid(format!("Duplicate relay name '{}'", relay.name)));
            }
        }

        let news = &self.news;
        if news.page_size == 0 || news.page_size > 100 {
            return Err(invalid(format!(
                "news.page_size must be between 1 and 100, got {}",
                news.page_size
            )));
        }

        if news.attempt_timeout_seconds == 0 || news.hard_timeout_seconds == 0 {
            return Err(invalid("news timeouts must be greater than zero"));
        }

        if news.attempt_timeout_seconds > news.hard_timeout_seconds {
            return Err(invalid(format!(
                "news.attempt_timeout_seconds ({}) exceeds news.hard_timeout_seconds ({})",
                news.attempt_timeout_seconds, news.hard_timeout_seconds
            )));
        }

        if self.gateway.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(invalid(format!(
                "Invalid gateway.bind_addr '{}'",
                self.gateway.bind_addr
            )));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        message: message.into(),
    }
}
