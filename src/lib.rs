//! # LaserKit
//!
//! Drives a bank of lasers wired to an Arduino-class microcontroller over a
//! serial link. The board accepts one text command per line: a laser number
//! toggles that laser, `all_on` and `all_off` switch the whole bank.
//!
//! ## Architecture
//!
//! 1. **laserkit-core** - Laser state model, errors, controller events
//! 2. **laserkit-communication** - Serial and simulated transports, the controller, patterns
//! 3. **laserkit-settings** - Configuration file handling
//! 4. **laserkit** - Command line front-end that ties the crates together

use laserkit_communication::{ConnectionParams, ControllerConfig};
use std::time::Duration;

pub use laserkit_core::{
    ConnectionState, ControllerError, ControllerEvent, ControllerListener,
    ControllerListenerHandle, Error, LaserId, LaserState, LaserStates, Result, TransportError,
};

pub use laserkit_communication::{
    list_ports, ControllerSession, LaserController, SerialPortInfo, SerialTransport,
    SimulatedPeer, SimulatedTransport, Transport,
};

pub use laserkit_settings::{
    default_config_path, Config, ConnectionSettings, LaserSettings, PatternSettings,
    SettingsError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Translate a loaded configuration into controller construction parameters
pub fn controller_config(config: &Config) -> ControllerConfig {
    let connection = ConnectionParams::new(config.connection.port.clone())
        .with_baud_rate(config.connection.baud_rate)
        .with_timeout(Duration::from_millis(config.connection.timeout_ms))
        .with_settle_delay(Duration::from_millis(config.connection.settle_ms));

    ControllerConfig::new(config.connection.port.clone())
        .with_connection(connection)
        .with_laser_count(config.lasers.count)
        .with_auto_connect(config.lasers.auto_connect)
        .with_pattern_settle(Duration::from_millis(config.patterns.sequence_settle_ms))
}

/// Log level selected by the number of `-v` flags
pub fn verbosity_level(verbosity: u8) -> tracing::Level {
    match verbosity {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

/// Initialize logging
///
/// Sets up structured logging with:
/// - Output on stderr, leaving stdout to command results
/// - RUST_LOG environment variable support
/// - A default level of INFO, raised by `verbosity`
pub fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_level(verbosity).as_str()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity > 0)
        .with_level(true)
        .with_line_number(verbosity > 1);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
