//! Simulated laser microcontroller
//!
//! [`SimulatedPeer`] interprets the wire protocol the same way the firmware
//! does and keeps the physical laser state, so tests and the `--simulate`
//! CLI mode can check what the hardware would actually be doing.
//! [`SimulatedTransport`] is the [`Transport`] end of that peer.
//!
//! Faults can be injected to exercise error paths: an unavailable port, or
//! writes that start failing after a number of successful ones.

use crate::communication::{frame_command, ConnectionParams, Transport};
use laserkit_core::{LaserId, LaserState, LaserStates, TransportError};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug)]
struct PeerState {
    lasers: LaserStates,
    received: Vec<String>,
    available: bool,
    /// Remaining successful writes before every write fails
    sends_before_failure: Option<usize>,
    opens: usize,
}

/// Shared handle to a simulated microcontroller
///
/// Clones observe the same peer, so a test can keep one handle while the
/// controller owns the transport.
#[derive(Debug, Clone)]
pub struct SimulatedPeer {
    inner: Arc<Mutex<PeerState>>,
}

impl SimulatedPeer {
    /// A peer driving `laser_count` lasers, all off
    pub fn new(laser_count: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PeerState {
                lasers: LaserStates::new(laser_count),
                received: Vec::new(),
                available: true,
                sends_before_failure: None,
                opens: 0,
            })),
        }
    }

    /// A peer whose lasers were left in `states` by a previous session
    pub fn with_states(states: &[LaserState]) -> Self {
        let peer = Self::new(states.len());
        {
            let mut inner = peer.inner.lock();
            for (index, state) in states.iter().enumerate() {
                if state.is_on() {
                    inner.lasers.toggle(index + 1);
                }
            }
        }
        peer
    }

    /// Create a transport connected to this peer
    pub fn transport(&self, port_name: impl Into<String>) -> SimulatedTransport {
        SimulatedTransport {
            peer: self.clone(),
            port_name: port_name.into(),
            open: false,
        }
    }

    /// Physical state of every laser
    pub fn laser_states(&self) -> LaserStates {
        self.inner.lock().lasers.clone()
    }

    /// Physical state of laser `id`
    pub fn laser_state(&self, id: LaserId) -> Option<LaserState> {
        self.inner.lock().lasers.get(id)
    }

    /// Every command line received, in order, without terminators
    pub fn received(&self) -> Vec<String> {
        self.inner.lock().received.clone()
    }

    /// Number of commands received
    pub fn received_count(&self) -> usize {
        self.inner.lock().received.len()
    }

    /// Forget received commands
    pub fn clear_received(&self) {
        self.inner.lock().received.clear();
    }

    /// Number of times a transport opened this peer
    pub fn open_count(&self) -> usize {
        self.inner.lock().opens
    }

    /// Make the port (un)available to subsequent opens
    pub fn set_available(&self, available: bool) {
        self.inner.lock().available = available;
    }

    /// Let `count` more writes succeed, then fail every write
    pub fn fail_sends_after(&self, count: usize) {
        self.inner.lock().sends_before_failure = Some(count);
    }

    /// Fail every write from now on
    pub fn fail_all_sends(&self) {
        self.fail_sends_after(0);
    }

    /// Remove injected write faults
    pub fn clear_faults(&self) {
        self.inner.lock().sends_before_failure = None;
    }

    fn apply(lasers: &mut LaserStates, command: &str) {
        match command {
            "all_on" => lasers.fill(LaserState::On),
            "all_off" => lasers.fill(LaserState::Off),
            other => match other.parse::<LaserId>() {
                Ok(id) if lasers.contains(id) => {
                    lasers.toggle(id);
                }
                _ => tracing::debug!("Simulated peer ignoring unknown command {:?}", other),
            },
        }
    }
}

/// Transport end of a [`SimulatedPeer`]
#[derive(Debug)]
pub struct SimulatedTransport {
    peer: SimulatedPeer,
    port_name: String,
    open: bool,
}

impl SimulatedTransport {
    /// The peer this transport writes to
    pub fn peer(&self) -> &SimulatedPeer {
        &self.peer
    }
}

impl Transport for SimulatedTransport {
    fn open(&mut self, params: &ConnectionParams) -> Result<(), TransportError> {
        self.open = false;
        self.port_name = params.port.clone();

        let mut inner = self.peer.inner.lock();
        if !inner.available {
            return Err(TransportError::PortUnavailable {
                port: params.port.clone(),
                reason: "simulated port unavailable".to_string(),
            });
        }
        inner.opens += 1;
        drop(inner);

        tracing::debug!("Opened simulated port {}", params.port);
        self.open = true;
        Ok(())
    }

    fn send(&mut self, command: &str) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::NotConnected);
        }
        let line = frame_command(&self.port_name, command)?;

        let mut inner = self.peer.inner.lock();
        if let Some(remaining) = inner.sends_before_failure.as_mut() {
            if *remaining == 0 {
                return Err(TransportError::WriteFailed {
                    port: self.port_name.clone(),
                    reason: "simulated write failure".to_string(),
                });
            }
            *remaining -= 1;
        }

        let received = String::from_utf8_lossy(&line).trim_end().to_string();
        SimulatedPeer::apply(&mut inner.lasers, &received);
        inner.received.push(received);
        tracing::debug!("Sent command: {}", command);
        Ok(())
    }

    fn close(&mut self) {
        if self.open {
            tracing::debug!("Closed simulated port {}", self.port_name);
        }
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn port_name(&self) -> &str {
        &self.port_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(peer: &SimulatedPeer) -> SimulatedTransport {
        let mut transport = peer.transport("SIM0");
        transport.open(&ConnectionParams::new("SIM0")).unwrap();
        transport
    }

    #[test]
    fn test_peer_interprets_protocol() {
        let peer = SimulatedPeer::new(3);
        let mut transport = open(&peer);

        transport.send("2").unwrap();
        assert_eq!(peer.laser_state(2), Some(LaserState::On));

        transport.send("all_on").unwrap();
        assert!(peer.laser_states().all(LaserState::On));

        transport.send("2").unwrap();
        assert_eq!(peer.laser_state(2), Some(LaserState::Off));

        transport.send("all_off").unwrap();
        assert!(peer.laser_states().all(LaserState::Off));

        transport.send("9").unwrap();
        transport.send("bogus").unwrap();
        assert!(peer.laser_states().all(LaserState::Off));
        assert_eq!(peer.received_count(), 6);
    }

    #[test]
    fn test_send_requires_open() {
        let peer = SimulatedPeer::new(1);
        let mut transport = peer.transport("SIM0");
        assert_eq!(transport.send("1"), Err(TransportError::NotConnected));

        transport.open(&ConnectionParams::new("SIM0")).unwrap();
        transport.close();
        transport.close();
        assert_eq!(transport.send("1"), Err(TransportError::NotConnected));
        assert_eq!(peer.received_count(), 0);
    }

    #[test]
    fn test_fail_sends_after() {
        let peer = SimulatedPeer::new(2);
        let mut transport = open(&peer);
        peer.fail_sends_after(1);

        assert!(transport.send("1").is_ok());
        assert!(matches!(
            transport.send("2"),
            Err(TransportError::WriteFailed { .. })
        ));
        assert_eq!(peer.laser_state(2), Some(LaserState::Off));

        peer.clear_faults();
        assert!(transport.send("2").is_ok());
        assert_eq!(peer.received(), vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_unavailable_port() {
        let peer = SimulatedPeer::new(1);
        peer.set_available(false);
        let mut transport = peer.transport("SIM0");
        let err = transport.open(&ConnectionParams::new("SIM0")).unwrap_err();
        assert!(matches!(err, TransportError::PortUnavailable { .. }));
        assert!(!transport.is_open());
        assert_eq!(peer.open_count(), 0);
    }

    #[test]
    fn test_with_states() {
        let peer = SimulatedPeer::with_states(&[LaserState::On, LaserState::Off, LaserState::On]);
        assert_eq!(peer.laser_states().count_on(), 2);
        assert_eq!(peer.laser_state(3), Some(LaserState::On));
    }
}
