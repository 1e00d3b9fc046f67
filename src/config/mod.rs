//! Configuration module for memscan
//!
//! Provides configuration loading, validation, and default settings
//! for the scanner, the monitor loop and logging.

mod defaults;
mod loader;
mod validator;

pub use defaults::{default_config, ConfigDefaults};
pub use loader::{load_config, ConfigLoader, DEFAULT_CONFIG_FILE};
pub use validator::{validate_config, ConfigValidator, VALID_LOG_LEVELS};

// Re-export the configuration structures
pub use loader::{Config, LoggingConfig, MonitorConfig, ScannerConfig};

// Configuration-related error type
pub use loader::ConfigError;
