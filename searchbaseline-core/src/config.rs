//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/searchbaseline/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/searchbaseline/` (~/.config/searchbaseline/)
//! - Data: `$XDG_DATA_HOME/searchbaseline/` (~/.local/share/searchbaseline/)
//! - State/Logs: `$XDG_STATE_HOME/searchbaseline/` (~/.local/state/searchbaseline/)

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
    /// Baseline computation parameters
    #[serde(default)]
    pub baseline: BaselineConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Baseline computation parameters.
///
/// The automation threshold is an empirically chosen cutoff inherited from
/// prior work; it is configurable rather than hardcoded and should not be
/// assumed to generalize to other datasets.
#[derive(Debug, Clone, Deserialize)]
pub struct BaselineConfig {
    /// Wiki to report on
    #[serde(default = "default_wiki")]
    pub wiki: String,

    /// Event schema revision to scope queries to (None accepts all)
    #[serde(default)]
    pub schema_revision: Option<i64>,

    /// Trailing window length in complete days
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    /// Sessions with this many searches or more are presumed automation
    /// and excluded from all session-level statistics
    #[serde(default = "default_automation_threshold")]
    pub automation_threshold: i64,

    /// Positions at or above the maximum possible result count are invalid
    #[serde(default = "default_max_result_position")]
    pub max_result_position: i64,

    /// Minimum dwell, in seconds, for a visit to count as a success
    #[serde(default = "default_success_dwell_secs")]
    pub success_dwell_secs: i64,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            wiki: default_wiki(),
            schema_revision: None,
            window_days: default_window_days(),
            automation_threshold: default_automation_threshold(),
            max_result_position: default_max_result_position(),
            success_dwell_secs: default_success_dwell_secs(),
        }
    }
}

impl BaselineConfig {
    /// Validate parameters, returning an error message if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.wiki.is_empty() {
            return Err(Error::Config("baseline.wiki must not be empty".to_string()));
        }
        if self.window_days == 0 {
            return Err(Error::Config(
                "baseline.window_days must be at least 1".to_string(),
            ));
        }
        if self.automation_threshold < 1 {
            return Err(Error::Config(
                "baseline.automation_threshold must be at least 1".to_string(),
            ));
        }
        if self.max_result_position < 1 {
            return Err(Error::Config(
                "baseline.max_result_position must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_wiki() -> String {
    "enwiki".to_string()
}

fn default_window_days() -> u32 {
    7
}

fn default_automation_threshold() -> i64 {
    50
}

fn default_max_result_position() -> i64 {
    500
}

fn default_success_dwell_secs() -> i64 {
    10
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
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

        config.baseline.validate()?;
        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/searchbaseline/config.toml`
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("searchbaseline").join("config.toml")
    }

    /// Returns the data directory path (for the local event store)
    ///
    /// `$XDG_DATA_HOME/searchbaseline/`
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("searchbaseline")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/searchbaseline/`
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("searchbaseline")
    }

    /// Returns the event store file path
    ///
    /// `$XDG_DATA_HOME/searchbaseline/events.db`
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("events.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/searchbaseline/searchbaseline.log`
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("searchbaseline.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.baseline.wiki, "enwiki");
        assert_eq!(config.baseline.window_days, 7);
        assert_eq!(config.baseline.automation_threshold, 50);
        assert_eq!(config.baseline.max_result_position, 500);
        assert_eq!(config.baseline.success_dwell_secs, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[baseline]
wiki = "dewiki"
window_days = 14
automation_threshold = 100
schema_revision = 12057828

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.baseline.wiki, "dewiki");
        assert_eq!(config.baseline.window_days, 14);
        assert_eq!(config.baseline.automation_threshold, 100);
        assert_eq!(config.baseline.schema_revision, Some(12057828));
        // Unspecified keys keep their defaults
        assert_eq!(config.baseline.max_result_position, 500);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_validation_rejects_degenerate_parameters() {
        let config = BaselineConfig {
            window_days: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = BaselineConfig {
            automation_threshold: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = BaselineConfig {
            wiki: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        assert!(BaselineConfig::default().validate().is_ok());
    }
}
