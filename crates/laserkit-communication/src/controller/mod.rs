//! Laser state controller
//!
//! Keeps the authoritative ON/OFF state of every laser and mirrors it onto
//! the microcontroller through a [`Transport`]. The firmware only understands
//! three commands and never answers, so the cache is updated strictly after a
//! write succeeds and is never touched when one fails.
//!
//! | Command  | Effect                 |
//! |----------|------------------------|
//! | `<n>`    | toggle laser `n`       |
//! | `all_on` | drive every laser on   |
//! | `all_off`| drive every laser off  |

pub mod patterns;
pub mod session;

use crate::communication::{serial::SerialTransport, ConnectionParams, Transport};
use laserkit_core::{
    ConnectionState, ControllerError, ControllerEvent, ControllerListener,
    ControllerListenerHandle, LaserId, LaserState, LaserStates,
};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Bulk command turning every laser on
pub const ALL_ON_COMMAND: &str = "all_on";

/// Bulk command turning every laser off
pub const ALL_OFF_COMMAND: &str = "all_off";

/// Number of lasers wired to the stock firmware
pub const DEFAULT_LASER_COUNT: usize = 3;

/// Pause between the all-off and the next laser in a sequential pattern
pub const DEFAULT_PATTERN_SETTLE: Duration = Duration::from_millis(100);

/// Construction parameters for a [`LaserController`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Link parameters
    pub connection: ConnectionParams,
    /// Number of lasers (N); ids run from 1 to N
    pub laser_count: usize,
    /// Connect while constructing
    pub auto_connect: bool,
    /// Settle pause used by [`LaserController::sequential_pattern`]
    pub pattern_settle: Duration,
}

impl ControllerConfig {
    /// Defaults for `port`: 9600 baud, 3 lasers, auto-connect
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            connection: ConnectionParams::new(port),
            laser_count: DEFAULT_LASER_COUNT,
            auto_connect: true,
            pattern_settle: DEFAULT_PATTERN_SETTLE,
        }
    }

    /// Set the number of lasers
    pub fn with_laser_count(mut self, laser_count: usize) -> Self {
        self.laser_count = laser_count;
        self
    }

    /// Enable or disable connecting on construction
    pub fn with_auto_connect(mut self, auto_connect: bool) -> Self {
        self.auto_connect = auto_connect;
        self
    }

    /// Replace the link parameters
    pub fn with_connection(mut self, connection: ConnectionParams) -> Self {
        self.connection = connection;
        self
    }

    /// Set the sequential pattern settle pause
    pub fn with_pattern_settle(mut self, pattern_settle: Duration) -> Self {
        self.pattern_settle = pattern_settle;
        self
    }
}

/// Controller for N lasers behind a microcontroller
///
/// Every mutating operation takes `&mut self`; share a controller between
/// threads behind a single lock so at most one operation is in flight.
/// Dropping a connected controller turns every laser off and closes the link.
pub struct LaserController {
    config: ControllerConfig,
    transport: Box<dyn Transport>,
    states: LaserStates,
    connection: ConnectionState,
    listeners: Vec<(ControllerListenerHandle, Arc<dyn ControllerListener>)>,
}

impl LaserController {
    /// Create a controller on a serial port
    pub fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        Self::with_transport(config, Box::new(SerialTransport::new()))
    }

    /// Create a controller on any transport
    ///
    /// Connects before returning when `config.auto_connect` is set.
    pub fn with_transport(
        config: ControllerConfig,
        transport: Box<dyn Transport>,
    ) -> Result<Self, ControllerError> {
        if config.laser_count == 0 {
            return Err(ControllerError::InvalidConfig {
                reason: "laser count must be at least 1".to_string(),
            });
        }

        let mut controller = Self {
            states: LaserStates::new(config.laser_count),
            config,
            transport,
            connection: ConnectionState::Disconnected,
            listeners: Vec::new(),
        };

        if controller.config.auto_connect {
            controller.connect()?;
        }
        Ok(controller)
    }

    /// Open the link and force every laser off
    ///
    /// The cache starts out all-off, which only matches the hardware once an
    /// `all_off` has gone through; if it cannot be sent the link is closed
    /// again and the controller stays disconnected.
    pub fn connect(&mut self) -> Result<(), ControllerError> {
        if self.is_connected() {
            return Err(ControllerError::AlreadyConnected);
        }

        if let Err(e) = self.transport.open(&self.config.connection) {
            tracing::error!("Serial connection failed: {}", e);
            return Err(e.into());
        }
        self.connection = ConnectionState::Connected;

        if let Err(e) = self.all_off() {
            tracing::error!(
                "Could not force lasers off on {}, closing: {}",
                self.config.connection.port,
                e
            );
            self.transport.close();
            self.connection = ConnectionState::Disconnected;
            return Err(e);
        }

        tracing::info!(
            "Connected to laser controller on {}",
            self.config.connection.port
        );
        self.emit(ControllerEvent::Connected {
            port: self.config.connection.port.clone(),
        });
        Ok(())
    }

    /// Turn every laser off (best-effort) and close the link
    ///
    /// Always ends disconnected; calling it while disconnected does nothing.
    pub fn disconnect(&mut self) {
        if self.is_connected() {
            if let Err(e) = self.all_off() {
                tracing::warn!("Ignoring all-off failure during disconnect: {}", e);
            }
        }

        self.transport.close();
        if self.connection == ConnectionState::Connected {
            self.connection = ConnectionState::Disconnected;
            tracing::info!("Disconnected from laser controller");
            self.emit(ControllerEvent::Disconnected {
                port: self.config.connection.port.clone(),
            });
        }
    }

    /// Toggle laser `id`, returning its new state
    pub fn toggle(&mut self, id: LaserId) -> Result<LaserState, ControllerError> {
        self.check_id(id)?;
        self.send(&id.to_string())?;

        let state = self.states.toggle(id);
        tracing::info!("Laser {} toggled to {}", id, state);
        self.emit(ControllerEvent::LaserChanged { id, state });
        Ok(state)
    }

    /// Drive laser `id` to `desired`
    ///
    /// Sends nothing when the cache already holds `desired`: the firmware has
    /// no set command, and a toggle would flip the laser the wrong way.
    pub fn set(&mut self, id: LaserId, desired: LaserState) -> Result<(), ControllerError> {
        if self.get_state(id)? == desired {
            return Ok(());
        }
        self.toggle(id).map(|_| ())
    }

    /// Turn laser `id` on
    pub fn turn_on(&mut self, id: LaserId) -> Result<(), ControllerError> {
        self.set(id, LaserState::On)
    }

    /// Turn laser `id` off
    pub fn turn_off(&mut self, id: LaserId) -> Result<(), ControllerError> {
        self.set(id, LaserState::Off)
    }

    /// Turn every laser on with one command
    pub fn all_on(&mut self) -> Result<(), ControllerError> {
        self.send_bulk(LaserState::On)
    }

    /// Turn every laser off with one command
    pub fn all_off(&mut self) -> Result<(), ControllerError> {
        self.send_bulk(LaserState::Off)
    }

    /// Turn every laser off, reporting rather than escalating failures
    ///
    /// Safe to call in any state. A failure (including being disconnected) is
    /// logged, published as an event and returned; it never panics.
    pub fn emergency_stop(&mut self) -> Result<(), ControllerError> {
        match self.all_off() {
            Ok(()) => {
                tracing::warn!("Emergency stop activated - all lasers off");
                self.emit(ControllerEvent::EmergencyStop { succeeded: true });
                Ok(())
            }
            Err(e) => {
                tracing::error!("Emergency stop failed: {}", e);
                self.emit(ControllerEvent::EmergencyStop { succeeded: false });
                Err(e)
            }
        }
    }

    /// Emergency stop followed by disconnect, ignoring every failure
    pub fn shutdown(&mut self) {
        if self.is_connected() {
            let _ = self.emergency_stop();
        }
        self.disconnect();
    }

    /// Cached state of laser `id`
    pub fn get_state(&self, id: LaserId) -> Result<LaserState, ControllerError> {
        self.states.get(id).ok_or(ControllerError::InvalidLaserId {
            id,
            count: self.states.len(),
        })
    }

    /// Snapshot of every cached laser state
    pub fn get_all_states(&self) -> LaserStates {
        self.states.clone()
    }

    /// Number of lasers
    pub fn laser_count(&self) -> usize {
        self.states.len()
    }

    /// Check if the link is open
    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Connected
    }

    /// Current connection state
    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    /// Configured port name
    pub fn port(&self) -> &str {
        &self.config.connection.port
    }

    /// Construction parameters
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Register a listener for controller events
    pub fn add_listener(
        &mut self,
        listener: Arc<dyn ControllerListener>,
    ) -> ControllerListenerHandle {
        let handle = ControllerListenerHandle::new();
        self.listeners.push((handle.clone(), listener));
        handle
    }

    /// Unregister a listener; returns whether it was registered
    pub fn remove_listener(&mut self, handle: &ControllerListenerHandle) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(h, _)| h != handle);
        self.listeners.len() != before
    }

    fn emit(&self, event: ControllerEvent) {
        for (_, listener) in &self.listeners {
            listener.on_event(&event);
        }
    }

    fn check_id(&self, id: LaserId) -> Result<(), ControllerError> {
        if self.states.contains(id) {
            Ok(())
        } else {
            Err(ControllerError::InvalidLaserId {
                id,
                count: self.states.len(),
            })
        }
    }

    fn send(&mut self, command: &str) -> Result<(), ControllerError> {
        if !self.is_connected() {
            return Err(ControllerError::NotConnected);
        }

        self.transport.send(command).map_err(|source| {
            tracing::error!("Communication error: {}", source);
            self.emit(ControllerEvent::CommandFailed {
                command: command.to_string(),
                reason: source.to_string(),
            });
            ControllerError::CommunicationFailed {
                port: self.config.connection.port.clone(),
                command: command.to_string(),
                source,
            }
        })
    }

    fn send_bulk(&mut self, state: LaserState) -> Result<(), ControllerError> {
        let command = match state {
            LaserState::On => ALL_ON_COMMAND,
            LaserState::Off => ALL_OFF_COMMAND,
        };
        self.send(command)?;

        self.states.fill(state);
        tracing::info!("All lasers turned {}", state);
        self.emit(ControllerEvent::AllChanged { state });
        Ok(())
    }
}

impl fmt::Debug for LaserController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaserController")
            .field("port", &self.config.connection.port)
            .field("states", &self.states)
            .field("connection", &self.connection)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl fmt::Display for LaserController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LaserController(port='{}', lasers={}, status='{}')",
            self.config.connection.port,
            self.states.len(),
            self.connection
        )
    }
}

impl Drop for LaserController {
    fn drop(&mut self) {
        if self.is_connected() {
            tracing::debug!("Controller dropped while connected, turning lasers off");
            self.disconnect();
        }
    }
}
