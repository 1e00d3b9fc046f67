//! Configuration validator for memscan
//!
//! Validates configuration values to ensure they are within acceptable ranges.

use super::loader::{Config, ConfigError, LoggingConfig, MonitorConfig, ScannerConfig};

/// Recognised `logging.level` values
pub const VALID_LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_scanner(&config.scanner)?;
        Self::validate_monitor(&config.monitor)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    fn validate_scanner(scanner: &ScannerConfig) -> Result<(), ConfigError> {
        if scanner.candidate_capacity == 0 {
            return Err(ConfigError::Invalid(
                "Candidate capacity must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_monitor(monitor: &MonitorConfig) -> Result<(), ConfigError> {
        // A zero interval turns the poll loop into a busy wait
        if monitor.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "Monitor interval must be greater than 0".to_string(),
            ));
        }

        if monitor.min_addresses_to_exit == 0 {
            return Err(ConfigError::Invalid(
                "Monitor exit threshold must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, VALID_LOG_LEVELS
            )));
        }

        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}
