//! Configuration loader for memscan
//!
//! Reads TOML files; any section or field left out falls back to its default.

use super::defaults::default_config;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// File read by [`load_config`]
pub const DEFAULT_CONFIG_FILE: &str = "memscan.toml";

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_scanner")]
    pub scanner: ScannerConfig,

    #[serde(default = "default_monitor")]
    pub monitor: MonitorConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

/// Scanner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Slots reserved up front in a fresh candidate buffer
    #[serde(default = "default_candidate_capacity")]
    pub candidate_capacity: usize,
}

/// Monitor loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_min_addresses_to_exit")]
    pub min_addresses_to_exit: usize,
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Loads configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads configuration, or defaults when the file doesn't exist.
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(&self) -> Result<Config, ConfigError> {
        match self.load() {
            Err(ConfigError::FileNotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Saves configuration to file
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Loads configuration from `memscan.toml` in the working directory
pub fn load_config() -> Result<Config, ConfigError> {
    ConfigLoader::new(DEFAULT_CONFIG_FILE).load_or_default()
}

// Default functions for serde
fn default_scanner() -> ScannerConfig {
    ScannerConfig {
        candidate_capacity: default_candidate_capacity(),
    }
}

fn default_monitor() -> MonitorConfig {
    let defaults = default_config().monitor;
    MonitorConfig {
        interval_ms: defaults.interval_ms,
        min_addresses_to_exit: defaults.min_addresses_to_exit,
    }
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
    }
}

fn default_candidate_capacity() -> usize {
    default_config().scanner.candidate_capacity
}

fn default_interval_ms() -> u64 {
    default_config().monitor.interval_ms
}

fn default_min_addresses_to_exit() -> usize {
    default_config().monitor.min_addresses_to_exit
}

fn default_log_level() -> String {
    default_config().logging.level
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scanner: default_scanner(),
            monitor: default_monitor(),
            logging: default_logging(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        default_monitor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scanner.candidate_capacity, 1024);
        assert_eq!(config.monitor.interval(), Duration::from_secs(10));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_missing_file() {
        let loader = ConfigLoader::new("nonexistent.toml");
        let result = loader.load();
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_or_default() {
        let loader = ConfigLoader::new("nonexistent.toml");
        let config = loader.load_or_default().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_reports_parse_errors() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "[monitor\ninterval_ms = ").unwrap();

        let result = ConfigLoader::new(&config_path).load_or_default();
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("memscan.toml");

        let mut config = Config::default();
        config.monitor.interval_ms = 250;
        let loader = ConfigLoader::new(&config_path);

        loader.save(&config).unwrap();
        assert!(config_path.exists());

        let loaded = loader.load().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
            [monitor]
            min_addresses_to_exit = 3
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.monitor.min_addresses_to_exit, 3);
        // Check defaults are applied
        assert_eq!(config.monitor.interval_ms, 10_000);
        assert_eq!(config.scanner.candidate_capacity, 1024);
    }
}
