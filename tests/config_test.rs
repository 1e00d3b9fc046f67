//! Integration tests for configuration files

use memscan::config::{validate_config, Config, ConfigError, ConfigLoader};
use memscan::MonitorOptions;
use pretty_assertions::assert_eq;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_file_drives_monitor_options() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("memscan.toml");
    fs::write(
        &path,
        r#"
            [monitor]
            interval_ms = 500
            min_addresses_to_exit = 4

            [logging]
            level = "debug"
        "#,
    )
    .unwrap();

    let config = ConfigLoader::new(&path).load().unwrap();
    assert!(validate_config(&config).is_ok());
    assert_eq!(config.scanner, Config::default().scanner);

    let options = MonitorOptions::from(&config.monitor);
    assert_eq!(
        options,
        MonitorOptions {
            min_addresses_to_exit: 4,
            interval: Duration::from_millis(500),
        }
    );
}

#[test]
fn test_invalid_file_is_rejected_by_validator() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("memscan.toml");
    fs::write(&path, "[monitor]\ninterval_ms = 0\n").unwrap();

    let config = ConfigLoader::new(&path).load().unwrap();
    assert!(matches!(validate_config(&config), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_wrong_field_type_is_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("memscan.toml");
    fs::write(&path, "[scanner]\ncandidate_capacity = \"lots\"\n").unwrap();

    let result = ConfigLoader::new(&path).load();
    assert!(matches!(result, Err(ConfigError::TomlParse(_))));
}

#[test]
fn test_save_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::new(temp_dir.path().join("saved.toml"));

    let mut config = Config::default();
    config.scanner.candidate_capacity = 4096;
    config.logging.level = "warn".to_string();
    loader.save(&config).unwrap();

    assert_eq!(loader.load().unwrap(), config);
}
