//! Default configuration values for memscan

use serde::{Deserialize, Serialize};

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub scanner: ScannerDefaults,
    pub monitor: MonitorDefaults,
    pub logging: LoggingDefaults,
}

/// Default scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerDefaults {
    pub candidate_capacity: usize,
}

/// Default monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorDefaults {
    pub interval_ms: u64,
    pub min_addresses_to_exit: usize,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
}

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        scanner: ScannerDefaults {
            candidate_capacity: 1024,
        },
        monitor: MonitorDefaults {
            interval_ms: 10_000, // 10s
            min_addresses_to_exit: 10,
        },
        logging: LoggingDefaults {
            level: "info".to_string(),
        },
    }
}
