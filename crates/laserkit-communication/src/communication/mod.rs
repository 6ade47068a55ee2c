//! Transport layer for the laser microcontroller link
//!
//! A transport owns the connection lifecycle (open, flush, close) and frames
//! each command as a single `\n`-terminated line. Nothing is ever read back:
//! the firmware does not acknowledge commands.

pub mod serial;
pub mod simulated;

use laserkit_core::TransportError;
use std::time::Duration;

/// Default serial baud rate expected by the firmware
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default read/write timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Default pause after opening the port while the microcontroller resets
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Serial parity setting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SerialParity {
    /// No parity bit
    #[default]
    None,
    /// Even parity
    Even,
    /// Odd parity
    Odd,
}

/// Parameters used to open a link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Port name (e.g. "/dev/ttyUSB0", "COM3")
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Read/write timeout
    pub timeout: Duration,
    /// Pause after opening before the line is trusted
    pub settle_delay: Duration,
    /// Data bits (5-8)
    pub data_bits: u8,
    /// Stop bits (1 or 2)
    pub stop_bits: u8,
    /// Parity
    pub parity: SerialParity,
    /// Hardware flow control
    pub flow_control: bool,
}

impl ConnectionParams {
    /// Parameters for `port` with the firmware defaults (9600 8N1)
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
            data_bits: 8,
            stop_bits: 1,
            parity: SerialParity::None,
            flow_control: false,
        }
    }

    /// Set baud rate
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set read/write timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set settle delay
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }
}

/// Line-oriented link to the laser microcontroller
///
/// All calls block for at most the configured timeout.
pub trait Transport: Send {
    /// Open the link, wait for the device to settle, then discard buffered bytes
    ///
    /// Opening an already open transport replaces the previous handle.
    fn open(&mut self, params: &ConnectionParams) -> Result<(), TransportError>;

    /// Write `command` followed by `\n` and flush
    fn send(&mut self, command: &str) -> Result<(), TransportError>;

    /// Flush and release the link; idempotent and never fails
    fn close(&mut self);

    /// Check if the link is open
    fn is_open(&self) -> bool;

    /// Name of the port this transport is (or was last) bound to
    fn port_name(&self) -> &str;
}

/// Frame `command` as one wire line
///
/// Rejects commands that would split into several lines.
pub(crate) fn frame_command(port: &str, command: &str) -> Result<Vec<u8>, TransportError> {
    if command.contains(['\n', '\r']) {
        return Err(TransportError::WriteFailed {
            port: port.to_string(),
            reason: format!("command {:?} contains a line terminator", command),
        });
    }

    let mut line = Vec::with_capacity(command.len() + 1);
    line.extend_from_slice(command.as_bytes());
    line.push(b'\n');
    Ok(line)
}
