//! LaserKit Settings Crate
//!
//! Loads, validates and saves the LaserKit configuration file.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, Config, ConnectionSettings, LaserSettings, PatternSettings,
    MAX_LASER_COUNT,
};
pub use error::{ConfigError, SettingsError, SettingsResult};
