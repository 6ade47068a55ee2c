//! Event types for laser controller activity
//!
//! Events are emitted after the controller's cached state has been updated,
//! so a listener always observes state that matches a completed write.

use crate::data::{LaserId, LaserState};

/// Controller event types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// Link opened and every laser forced off
    Connected {
        /// Port the controller connected to
        port: String,
    },
    /// Link closed
    Disconnected {
        /// Port the controller was connected to
        port: String,
    },
    /// A single laser changed state
    LaserChanged {
        /// Laser that changed
        id: LaserId,
        /// Its new state
        state: LaserState,
    },
    /// A bulk command set every laser to the same state
    AllChanged {
        /// State of every laser
        state: LaserState,
    },
    /// Emergency stop was requested
    EmergencyStop {
        /// Whether the all-off command reached the hardware
        succeeded: bool,
    },
    /// A command could not be delivered
    CommandFailed {
        /// The wire command
        command: String,
        /// Why it failed
        reason: String,
    },
}

impl std::fmt::Display for ControllerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerEvent::Connected { port } => write!(f, "Connected to {}", port),
            ControllerEvent::Disconnected { port } => write!(f, "Disconnected from {}", port),
            ControllerEvent::LaserChanged { id, state } => write!(f, "Laser {} {}", id, state),
            ControllerEvent::AllChanged { state } => write!(f, "All lasers {}", state),
            ControllerEvent::EmergencyStop { succeeded: true } => {
                write!(f, "Emergency stop: all lasers off")
            }
            ControllerEvent::EmergencyStop { succeeded: false } => {
                write!(f, "Emergency stop failed")
            }
            ControllerEvent::CommandFailed { command, reason } => {
                write!(f, "Command '{}' failed: {}", command, reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_display() {
        let event = ControllerEvent::LaserChanged {
            id: 2,
            state: LaserState::On,
        };
        assert_eq!(event.to_string(), "Laser 2 ON");

        let event = ControllerEvent::AllChanged {
            state: LaserState::Off,
        };
        assert_eq!(event.to_string(), "All lasers OFF");

        let event = ControllerEvent::EmergencyStop { succeeded: false };
        assert_eq!(event.to_string(), "Emergency stop failed");
    }
}
