//! Tests for reading and writing configuration files

use laserkit_settings::{Config, ConfigError, SettingsError};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_partial_toml_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[connection]\nport = \"COM4\"\n\n[lasers]\ncount = 5\n",
    )
    .unwrap();

    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.connection.port, "COM4");
    assert_eq!(config.connection.baud_rate, 9600);
    assert_eq!(config.lasers.count, 5);
    assert!(config.lasers.auto_connect);
    assert_eq!(config.patterns.sequence_cycles, 1);
}

#[test]
fn test_save_then_load_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.connection.port = "/dev/ttyACM0".to_string();
    config.lasers.auto_connect = false;
    config.patterns.flash_count = 7;
    config.save_to_file(&path).unwrap();

    assert_eq!(Config::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_json_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "lasers": { "count": 8 } }"#).unwrap();

    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.lasers.count, 8);
    assert_eq!(config.connection.port, "/dev/ttyUSB0");
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[lasers]\ncount = 0\n").unwrap();

    match Config::load_from_file(&path) {
        Err(SettingsError::Config(ConfigError::ValueOutOfRange { key, .. })) => {
            assert_eq!(key, "lasers.count");
        }
        other => panic!("expected ValueOutOfRange, got {:?}", other),
    }

    fs::write(&path, "[lasers\ncount = 3\n").unwrap();
    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::TomlError(_))
    ));
}

#[test]
fn test_save_refuses_invalid_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    let mut config = Config::default();
    config.connection.baud_rate = 0;

    assert!(config.save_to_file(&path).is_err());
    assert!(!path.exists());
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    assert!(matches!(
        Config::default().save_to_file(&path),
        Err(SettingsError::Config(ConfigError::UnsupportedFormat(_)))
    ));
}

#[test]
fn test_load_or_default() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");
    assert_eq!(Config::load_or_default(&missing).unwrap(), Config::default());

    let path = dir.path().join("config.toml");
    fs::write(&path, "[connection]\nbaud_rate = 115200\n").unwrap();
    assert_eq!(
        Config::load_or_default(&path).unwrap().connection.baud_rate,
        115200
    );
}
