//! Configuration management for sqlkit
//!
//! This module handles loading, parsing, and validation of configuration files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_SLOW_THRESHOLD_MS, DEFAULT_TRACE_NAME};
use crate::logger;
use crate::service::{Client, ConnectConfig, ServiceConfig};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub database: ConnectConfig,
    pub service: ServiceSettings,
    pub logging: LoggingConfig,
}

/// Service behaviour, converted into a [`ServiceConfig`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Log SQL statements through the ORM
    pub logging: bool,
    /// Slow statement threshold in milliseconds
    pub slow_threshold_ms: u64,
    /// Prefix for service log lines
    pub trace_name: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable logging
    pub enabled: bool,
    /// Maximum level: "error", "warn", "info", "debug" or "trace"
    pub level: String,
    /// Also append log lines to this file
    pub file: Option<PathBuf>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            logging: true,
            slow_threshold_ms: DEFAULT_SLOW_THRESHOLD_MS,
            trace_name: DEFAULT_TRACE_NAME.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file();

        if let Some(path) = config_path {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Option<PathBuf> {
        // 1. Check current directory
        let current_dir_config = PathBuf::from(CONFIG_FILE_NAME);
        if current_dir_config.exists() {
            return Some(current_dir_config);
        }

        // 2. Check XDG config directory
        let xdg_config = dirs::config_dir()?.join(CONFIG_DIR_NAME).join("config.toml");
        xdg_config.exists().then_some(xdg_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let client = self.database.client().context("Invalid database.client")?;

        if client != Client::Sqlite && self.database.host.trim().is_empty() {
            anyhow::bail!("database.host is required for {} connections", client);
        }

        logger::parse_level(&self.logging.level)?;

        Ok(())
    }

    /// Settings for [`Service::new`](crate::Service::new)
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            logging: self.service.logging,
            slow_threshold: Duration::from_millis(self.service.slow_threshold_ms),
            trace_name: self.service.trace_name.clone(),
        }
    }
}
