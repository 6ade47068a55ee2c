//! Error types for the settings crate.
//!
//! Structured errors for reading, writing and validating the configuration
//! file.

use std::io;
use thiserror::Error;

/// Errors that can occur during settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The configuration directory could not be determined.
    #[error("Config directory error: {0}")]
    ConfigDirectory(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML parse error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML write error: {0}")]
    TomlWriteError(#[from] toml::ser::Error),

    /// The configuration is invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors related to configuration validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required value is empty.
    #[error("Missing configuration key: {0}")]
    MissingKey(String),

    /// The configuration file format is not supported.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// A configuration value is out of valid range.
    #[error("Value out of range for '{key}': {value}")]
    ValueOutOfRange { key: String, value: String },
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingKey("connection.port".to_string());
        assert_eq!(
            err.to_string(),
            "Missing configuration key: connection.port"
        );

        let err = ConfigError::ValueOutOfRange {
            key: "lasers.count".to_string(),
            value: "0".to_string(),
        };
        assert_eq!(err.to_string(), "Value out of range for 'lasers.count': 0");
    }

    #[test]
    fn test_error_conversion() {
        let settings_err: SettingsError = ConfigError::UnsupportedFormat("yaml".into()).into();
        assert!(matches!(settings_err, SettingsError::Config(_)));
        assert_eq!(
            settings_err.to_string(),
            "Config error: Unsupported config format: yaml"
        );

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let settings_err: SettingsError = io_err.into();
        assert!(matches!(settings_err, SettingsError::IoError(_)));
    }
}
