//! Scoped controller sessions
//!
//! A [`ControllerSession`] guarantees the shutdown sequence runs however the
//! scope is left, including early returns and panics.

use super::LaserController;
use laserkit_core::ControllerError;
use std::ops::{Deref, DerefMut};

/// Guard that shuts the controller down when dropped
///
/// On drop it issues an emergency stop, then disconnects, ignoring failures
/// of either. The controller itself remains usable afterwards.
pub struct ControllerSession<'a> {
    controller: &'a mut LaserController,
}

impl LaserController {
    /// Connect if needed and return a session guard
    pub fn session(&mut self) -> Result<ControllerSession<'_>, ControllerError> {
        if !self.is_connected() {
            self.connect()?;
        }
        Ok(ControllerSession { controller: self })
    }
}

impl Deref for ControllerSession<'_> {
    type Target = LaserController;

    fn deref(&self) -> &Self::Target {
        self.controller
    }
}

impl DerefMut for ControllerSession<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.controller
    }
}

impl Drop for ControllerSession<'_> {
    fn drop(&mut self) {
        self.controller.shutdown();
    }
}
