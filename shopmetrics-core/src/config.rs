//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/shopmetrics/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/shopmetrics/` (~/.config/shopmetrics/)
//! - Data: `$XDG_DATA_HOME/shopmetrics/` (~/.local/share/shopmetrics/)
//! - State/Logs: `$XDG_STATE_HOME/shopmetrics/` (~/.local/state/shopmetrics/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Reporting configuration
    #[serde(default)]
    pub reporting: ReportingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Workshop backend configuration (optional)
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Reporting configuration
#[derive(Debug, Deserialize)]
pub struct ReportingConfig {
    /// Default date-range preset when the CLI is run without one
    #[serde(default = "default_preset")]
    pub default_preset: String,

    /// Currency symbol used when rendering money
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            default_preset: default_preset(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

fn default_preset() -> String {
    "last-30-days".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

/// Workshop backend configuration
///
/// When enabled, `shopmetrics-sync` pulls customer, booking, job, invoice,
/// and inventory records from the hosted backend into the local store.
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Enable/disable backend sync
    #[serde(default)]
    pub enabled: bool,

    /// Backend base URL (e.g. `https://api.workshop.example.com`)
    pub base_url: Option<String>,

    /// API key (format: "sm_live_xxxx")
    pub api_key: Option<String>,

    /// Records per page when fetching (max 1000, default 200)
    #[serde(default = "default_backend_page_size")]
    pub page_size: usize,

    /// HTTP request timeout in seconds
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,

    /// Max retry attempts for transient failures
    #[serde(default = "default_backend_max_retries")]
    pub max_retries: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: None,
            api_key: None,
            page_size: default_backend_page_size(),
            timeout_secs: default_backend_timeout(),
            max_retries: default_backend_max_retries(),
        }
    }
}

impl BackendConfig {
    /// Check if the backend is properly configured and enabled
    pub fn is_ready(&self) -> bool {
        self.enabled && self.base_url.is_some() && self.api_key.is_some()
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        if self.base_url.is_none() {
            return Err(Error::Config(
                "backend.base_url is required when backend sync is enabled".to_string(),
            ));
        }
        if self.api_key.is_none() {
            return Err(Error::Config(
                "backend.api_key is required when backend sync is enabled".to_string(),
            ));
        }
        if self.page_size == 0 || self.page_size > 1000 {
            return Err(Error::Config(
                "backend.page_size must be between 1 and 1000".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_backend_page_size() -> usize {
    200
}

fn default_backend_timeout() -> u64 {
    30
}

fn default_backend_max_retries() -> usize {
    3
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/shopmetrics/config.toml` (~/.config/shopmetrics/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("shopmetrics").join("config.toml")
    }

    /// Returns the data directory path (for the SQLite store)
    ///
    /// `$XDG_DATA_HOME/shopmetrics/` (~/.local/share/shopmetrics/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("shopmetrics")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/shopmetrics/` (~/.local/state/shopmetrics/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("shopmetrics")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/shopmetrics/data.db` (~/.local/share/shopmetrics/data.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/shopmetrics/shopmetrics.log`
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("shopmetrics.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path
    /// behavior before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_DATA_HOME").is_err() {
            std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
        }

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
