//! Error handling for LaserKit
//!
//! Provides error types for the two layers of the laser controller:
//! - Transport errors (serial link lifecycle and command writes)
//! - Controller errors (validation, connection state, failed commands)
//!
//! All error types use `thiserror` for ergonomic error handling.

use crate::data::LaserId;
use thiserror::Error;

/// Transport error type
///
/// Represents byte-level failures on the link to the laser microcontroller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The OS could not open the device
    #[error("Port {port} unavailable: {reason}")]
    PortUnavailable {
        /// The name of the port that could not be opened.
        port: String,
        /// The reason reported by the OS.
        reason: String,
    },

    /// The device did not respond within the configured timeout
    #[error("Port {port} timed out after {timeout_ms}ms")]
    Timeout {
        /// The name of the port that timed out.
        port: String,
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// A command could not be written completely
    #[error("Write to {port} failed: {reason}")]
    WriteFailed {
        /// The name of the port the write was addressed to.
        port: String,
        /// The reason the write failed.
        reason: String,
    },

    /// The link is closed
    #[error("Transport not connected")]
    NotConnected,
}

/// Controller error type
///
/// Represents errors raised by laser controller operations,
/// including input validation, connection state violations and failed commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// Laser id outside `1..=count`
    #[error("Invalid laser id {id}: must be between 1 and {count}")]
    InvalidLaserId {
        /// The rejected laser id.
        id: LaserId,
        /// The number of lasers managed by the controller.
        count: usize,
    },

    /// Controller is not connected
    #[error("Laser controller not connected")]
    NotConnected,

    /// Controller is already connected
    #[error("Laser controller already connected")]
    AlreadyConnected,

    /// A command was attempted but the transport rejected it
    #[error("Command '{command}' on {port} failed: {source}")]
    CommunicationFailed {
        /// The port the command was sent to.
        port: String,
        /// The wire command that failed.
        command: String,
        /// The underlying transport fault.
        #[source]
        source: TransportError,
    },

    /// The link could not be established
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Construction parameters are unusable
    #[error("Invalid controller configuration: {reason}")]
    InvalidConfig {
        /// The reason the configuration was rejected.
        reason: String,
    },
}

impl ControllerError {
    /// Returns the transport fault behind this error, if any
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            ControllerError::CommunicationFailed { source, .. } => Some(source),
            ControllerError::Transport(source) => Some(source),
            _ => None,
        }
    }
}

/// Main error type for LaserKit
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Controller error
    #[error(transparent)]
    Controller(#[from] ControllerError),

    /// Transport error
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        let transport = match self {
            Error::Transport(e) => Some(e),
            Error::Controller(e) => e.transport_error(),
            _ => None,
        };
        matches!(transport, Some(TransportError::Timeout { .. }))
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        match self {
            Error::Transport(_) => true,
            Error::Controller(e) => {
                matches!(e, ControllerError::NotConnected) || e.transport_error().is_some()
            }
            _ => false,
        }
    }

    /// Check if this is a controller error
    pub fn is_controller_error(&self) -> bool {
        matches!(self, Error::Controller(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::PortUnavailable {
            port: "/dev/ttyUSB0".to_string(),
            reason: "No such file or directory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Port /dev/ttyUSB0 unavailable: No such file or directory"
        );

        let err = TransportError::Timeout {
            port: "COM3".to_string(),
            timeout_ms: 2000,
        };
        assert_eq!(err.to_string(), "Port COM3 timed out after 2000ms");
    }

    #[test]
    fn test_controller_error_display() {
        let err = ControllerError::InvalidLaserId { id: 4, count: 3 };
        assert_eq!(
            err.to_string(),
            "Invalid laser id 4: must be between 1 and 3"
        );

        let err = ControllerError::CommunicationFailed {
            port: "COM3".to_string(),
            command: "2".to_string(),
            source: TransportError::WriteFailed {
                port: "COM3".to_string(),
                reason: "broken pipe".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "Command '2' on COM3 failed: Write to COM3 failed: broken pipe"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_classification() {
        let err: Error = ControllerError::CommunicationFailed {
            port: "COM3".to_string(),
            command: "all_off".to_string(),
            source: TransportError::Timeout {
                port: "COM3".to_string(),
                timeout_ms: 100,
            },
        }
        .into();
        assert!(err.is_timeout());
        assert!(err.is_connection_error());
        assert!(err.is_controller_error());

        let err: Error = ControllerError::InvalidLaserId { id: 0, count: 3 }.into();
        assert!(!err.is_timeout());
        assert!(!err.is_connection_error());

        let err: Error = TransportError::NotConnected.into();
        assert!(err.is_connection_error());
        assert!(!err.is_controller_error());
    }
}
