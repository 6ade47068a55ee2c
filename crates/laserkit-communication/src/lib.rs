//! # LaserKit Communication
//!
//! Serial transport and the laser state controller for LaserKit.
//! The controller keeps a cached ON/OFF state per laser and drives an
//! Arduino-class microcontroller with one-line text commands.

pub mod communication;
pub mod controller;

pub use communication::{
    serial::{list_ports, SerialPortInfo, SerialTransport},
    simulated::{SimulatedPeer, SimulatedTransport},
    ConnectionParams, SerialParity, Transport,
};

pub use controller::{
    session::ControllerSession, ControllerConfig, LaserController, ALL_OFF_COMMAND,
    ALL_ON_COMMAND,
};
