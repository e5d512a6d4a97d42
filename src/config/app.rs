//! Main application configuration
//!
//! This module defines the primary configuration structures for the
//! table-matcher service, including file and environment variable loading
//! and validation.

use crate::config::{RatingConfig, SessionConfig};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub roster: RosterSettings,
    pub rating: RatingConfig,
    pub session: SessionConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and health responses
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Interface the HTTP API binds to
    pub http_host: String,
    /// Port for the HTTP API
    pub http_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

/// Roster persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterSettings {
    /// Path of the CSV roster file
    pub csv_path: PathBuf,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "table-matcher".to_string(),
            log_level: "info".to_string(),
            http_host: "127.0.0.1".to_string(),
            http_port: 5001,
            shutdown_timeout_seconds: 10,
        }
    }
}

impl Default for RosterSettings {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("players.csv"),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("Invalid {} value: {}", key, value)),
        Err(_) => Ok(None),
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }
        if let Ok(host) = env::var("HTTP_HOST") {
            self.service.http_host = host;
        }
        if let Some(port) = parse_env("HTTP_PORT")? {
            self.service.http_port = port;
        }
        if let Some(timeout) = parse_env("SHUTDOWN_TIMEOUT_SECONDS")? {
            self.service.shutdown_timeout_seconds = timeout;
        }

        // Roster settings
        if let Ok(path) = env::var("ROSTER_CSV_PATH") {
            self.roster.csv_path = PathBuf::from(path);
        }

        // Rating settings
        if let Some(starting) = parse_env("STARTING_RATING")? {
            self.rating.starting_rating = starting;
        }
        if let Some(k) = parse_env("RATING_K_FACTOR")? {
            self.rating.k_factor = k;
        }
        if let Some(multiplier) = parse_env("RATING_SHUTOUT_MULTIPLIER")? {
            self.rating.shutout_multiplier = multiplier;
        }

        // Session settings
        if let Some(tables) = parse_env("DEFAULT_TABLE_COUNT")? {
            self.session.default_table_count = tables;
        }

        Ok(())
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Socket address string for the HTTP listener
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.service.http_host, self.service.http_port)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.http_port == 0 {
        return Err(anyhow!("HTTP port cannot be 0"));
    }
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }

    if config.roster.csv_path.as_os_str().is_empty() {
        return Err(anyhow!("Roster CSV path cannot be empty"));
    }

    if config.rating.k_factor <= 0.0 {
        return Err(anyhow!("K-factor must be positive"));
    }
    if config.rating.shutout_multiplier < 1.0 {
        return Err(anyhow!("Shutout multiplier must be at least 1.0"));
    }

    if config.session.default_table_count == 0 {
        return Err(anyhow!("Default table count must be greater than 0"));
    }

    Ok(())
}
