//! # LaserKit Core
//!
//! Core types, errors, and events for LaserKit.
//! Provides the laser data model shared by the transport, controller,
//! settings, and front-end crates.

pub mod core;
pub mod data;
pub mod error;

pub use core::{
    event::ControllerEvent,
    listener::{ControllerListener, ControllerListenerHandle},
};

pub use data::{ConnectionState, LaserId, LaserState, LaserStates};

pub use error::{ControllerError, Error, Result, TransportError};
