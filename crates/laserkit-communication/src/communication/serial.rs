//! Serial port transport
//!
//! Drives the laser microcontroller over USB serial using the blocking
//! `serialport` crate.
//!
//! Supports:
//! - Port enumeration for front-ends
//! - Baud rate, parity, stop bit and flow control configuration
//! - Settle delay and buffer flush after the board resets on open
//! - Line-framed blocking writes

use crate::communication::{frame_command, ConnectionParams, SerialParity, Transport};
use laserkit_core::{Error, Result, TransportError};
use serialport::{ClearBuffer, SerialPort};
use std::io::{self, Write};
use std::time::Duration;

/// Information about an available serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialPortInfo {
    /// Port name (e.g., "/dev/ttyACM0", "COM3")
    pub port_name: String,

    /// Port description (e.g., "USB Arduino Uno")
    pub description: String,

    /// USB vendor and product ID if applicable
    pub usb_ids: Option<(u16, u16)>,
}

/// List serial ports that can plausibly host the laser microcontroller
///
/// Keeps USB and numbered COM ports:
/// - Windows: COM* (e.g., COM1, COM3)
/// - Linux: /dev/ttyUSB*, /dev/ttyACM*
/// - macOS: /dev/cu.usbserial-*, /dev/cu.usbmodem*
pub fn list_ports() -> Result<Vec<SerialPortInfo>> {
    let ports = serialport::available_ports().map_err(|e| {
        tracing::error!("Failed to enumerate serial ports: {}", e);
        Error::other(format!("Failed to enumerate ports: {}", e))
    })?;

    Ok(ports
        .iter()
        .filter(|port| is_candidate_port(&port.port_name))
        .map(|port| {
            let usb_ids = match &port.port_type {
                serialport::SerialPortType::UsbPort(usb) => Some((usb.vid, usb.pid)),
                _ => None,
            };
            SerialPortInfo {
                port_name: port.port_name.clone(),
                description: describe_port(port),
                usb_ids,
            }
        })
        .collect())
}

fn is_candidate_port(port_name: &str) -> bool {
    if let Some(number) = port_name.strip_prefix("COM") {
        return !number.is_empty() && number.chars().all(|c| c.is_ascii_digit());
    }

    ["/dev/ttyUSB", "/dev/ttyACM", "/dev/cu.usbserial-", "/dev/cu.usbmodem"]
        .iter()
        .any(|prefix| port_name.starts_with(prefix))
}

fn describe_port(port: &serialport::SerialPortInfo) -> String {
    match &port.port_type {
        serialport::SerialPortType::UsbPort(usb) => format!(
            "USB {} {}",
            usb.manufacturer.as_deref().unwrap_or("Device"),
            usb.product.as_deref().unwrap_or("Serial Port")
        ),
        serialport::SerialPortType::BluetoothPort => "Bluetooth Serial".to_string(),
        serialport::SerialPortType::PciPort => "PCI Serial".to_string(),
        _ => "Serial Port".to_string(),
    }
}

fn to_serialport_parity(parity: SerialParity) -> serialport::Parity {
    match parity {
        SerialParity::None => serialport::Parity::None,
        SerialParity::Even => serialport::Parity::Even,
        SerialParity::Odd => serialport::Parity::Odd,
    }
}

fn timeout_ms(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

/// Classify a `serialport` failure raised while opening or flushing `params.port`
fn open_error(params: &ConnectionParams, err: serialport::Error) -> TransportError {
    match err.kind() {
        serialport::ErrorKind::Io(io::ErrorKind::TimedOut) => TransportError::Timeout {
            port: params.port.clone(),
            timeout_ms: timeout_ms(params.timeout),
        },
        _ => TransportError::PortUnavailable {
            port: params.port.clone(),
            reason: err.to_string(),
        },
    }
}

/// Serial transport backed by the `serialport` crate
pub struct SerialTransport {
    port_name: String,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    /// Create a closed transport
    pub fn new() -> Self {
        Self {
            port_name: String::new(),
            port: None,
        }
    }

    fn build(
        params: &ConnectionParams,
    ) -> std::result::Result<serialport::SerialPortBuilder, TransportError> {
        let invalid = |what: String| TransportError::PortUnavailable {
            port: params.port.clone(),
            reason: what,
        };

        let data_bits = match params.data_bits {
            5 => serialport::DataBits::Five,
            6 => serialport::DataBits::Six,
            7 => serialport::DataBits::Seven,
            8 => serialport::DataBits::Eight,
            other => return Err(invalid(format!("invalid data bits: {}", other))),
        };
        let stop_bits = match params.stop_bits {
            1 => serialport::StopBits::One,
            2 => serialport::StopBits::Two,
            other => return Err(invalid(format!("invalid stop bits: {}", other))),
        };

        Ok(serialport::new(&params.port, params.baud_rate)
            .timeout(params.timeout)
            .data_bits(data_bits)
            .stop_bits(stop_bits)
            .parity(to_serialport_parity(params.parity))
            .flow_control(if params.flow_control {
                serialport::FlowControl::Hardware
            } else {
                serialport::FlowControl::None
            }))
    }
}

impl Default for SerialTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for SerialTransport {
    fn open(&mut self, params: &ConnectionParams) -> std::result::Result<(), TransportError> {
        self.close();
        self.port_name = params.port.clone();

        let port = Self::build(params)?.open().map_err(|e| {
            tracing::warn!("Failed to open serial port {}: {}", params.port, e);
            open_error(params, e)
        })?;

        // Opening the port resets the board; give the bootloader time to hand over.
        if !params.settle_delay.is_zero() {
            tracing::debug!(
                "Waiting {:?} for {} to settle",
                params.settle_delay,
                params.port
            );
            std::thread::sleep(params.settle_delay);
        }

        port
            .clear(ClearBuffer::All)
            .map_err(|e| open_error(params, e))?;

        tracing::debug!("Opened {} at {} baud", params.port, params.baud_rate);
        self.port = Some(port);
        Ok(())
    }

    fn send(&mut self, command: &str) -> std::result::Result<(), TransportError> {
        let port = self.port.as_mut().ok_or(TransportError::NotConnected)?;
        let line = frame_command(&self.port_name, command)?;

        port
            .write_all(&line)
            .and_then(|_| port.flush())
            .map_err(|e| TransportError::WriteFailed {
                port: self.port_name.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!("Sent command: {}", command);
        Ok(())
    }

    fn close(&mut self) {
        if let Some(mut port) = self.port.take() {
            if let Err(e) = port.flush() {
                tracing::warn!("Flush before closing {} failed: {}", self.port_name, e);
            }
            tracing::debug!("Closed {}", self.port_name);
        }
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_port_patterns() {
        assert!(is_candidate_port("COM3"));
        assert!(is_candidate_port("/dev/ttyACM0"));
        assert!(is_candidate_port("/dev/ttyUSB1"));
        assert!(is_candidate_port("/dev/cu.usbmodem14101"));
        assert!(!is_candidate_port("COM"));
        assert!(!is_candidate_port("COMX"));
        assert!(!is_candidate_port("/dev/ttyS0"));
    }

    #[test]
    fn test_send_while_closed() {
        let mut transport = SerialTransport::new();
        assert!(!transport.is_open());
        assert_eq!(transport.send("all_off"), Err(TransportError::NotConnected));
        transport.close();
        transport.close();
    }

    #[test]
    fn test_rejects_invalid_framing_params() {
        let mut params = ConnectionParams::new("/dev/ttyACM0");
        params.data_bits = 9;
        let err = SerialTransport::new().open(&params).unwrap_err();
        assert!(matches!(err, TransportError::PortUnavailable { .. }));
    }
}
