//! Configuration file model
//!
//! One file holds the serial link, the laser bank and the pattern defaults
//! used by the command line front-end. Files are TOML or JSON, chosen by
//! extension. Missing sections and keys fall back to the defaults.

use crate::error::{ConfigError, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper bound on the number of lasers a configuration may declare
pub const MAX_LASER_COUNT: usize = 64;

/// Serial link settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Port name (e.g. "/dev/ttyUSB0", "COM3")
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Write timeout in milliseconds
    pub timeout_ms: u64,
    /// Pause after opening while the board resets, in milliseconds
    pub settle_ms: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
            timeout_ms: 2000,
            settle_ms: 2000,
        }
    }
}

/// Laser bank settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserSettings {
    /// Number of lasers wired to the board
    pub count: usize,
    /// Connect as soon as the controller is created
    pub auto_connect: bool,
}

impl Default for LaserSettings {
    fn default() -> Self {
        Self {
            count: 3,
            auto_connect: true,
        }
    }
}

/// Defaults for flash and sequential patterns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSettings {
    pub flash_count: usize,
    pub flash_interval_ms: u64,
    pub sequence_delay_ms: u64,
    pub sequence_cycles: usize,
    /// Pause between the all-off and the next laser in a sequence
    pub sequence_settle_ms: u64,
}

impl Default for PatternSettings {
    fn default() -> Self {
        Self {
            flash_count: 3,
            flash_interval_ms: 500,
            sequence_delay_ms: 1000,
            sequence_cycles: 1,
            sequence_settle_ms: 100,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial link
    pub connection: ConnectionSettings,
    /// Laser bank
    pub lasers: LaserSettings,
    /// Pattern defaults
    pub patterns: PatternSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

impl Config {
    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML), creating parent directories
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let format = Format::from_path(path)?;

        let content = match format {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;

        tracing::info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Load `path` if it exists, otherwise return the defaults
    ///
    /// A file that exists but cannot be parsed or validated is an error.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!(
                "No configuration at {}, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connection.port.trim().is_empty() {
            return Err(ConfigError::MissingKey("connection.port".to_string()));
        }

        if self.connection.baud_rate == 0 {
            return Err(out_of_range("connection.baud_rate", 0));
        }

        if self.connection.timeout_ms == 0 {
            return Err(out_of_range("connection.timeout_ms", 0));
        }

        if self.lasers.count == 0 || self.lasers.count > MAX_LASER_COUNT {
            return Err(out_of_range("lasers.count", self.lasers.count));
        }

        Ok(())
    }
}

fn out_of_range(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Default configuration file location
///
/// `<config dir>/laserkit/config.toml`, e.g. `~/.config/laserkit/config.toml`
/// on Linux.
pub fn default_config_path() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("laserkit").join("config.toml"))
        .ok_or_else(|| {
            SettingsError::ConfigDirectory("no configuration directory on this platform".into())
        })
}
