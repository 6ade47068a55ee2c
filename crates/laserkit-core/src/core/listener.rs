//! Controller listener interface
//!
//! Defines the sink through which a front-end observes controller activity.

use crate::core::event::ControllerEvent;
use uuid::Uuid;

/// Handle for a registered controller listener.
///
/// Uniquely identifies a listener subscription. Can be used to unsubscribe
/// from controller events.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControllerListenerHandle(pub String);

impl ControllerListenerHandle {
    /// Allocate a fresh handle
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ControllerListenerHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener trait for controller events
///
/// Called synchronously from the thread driving the controller; keep
/// implementations short.
pub trait ControllerListener: Send + Sync {
    /// Called for every controller event
    fn on_event(&self, event: &ControllerEvent);
}

impl<F> ControllerListener for F
where
    F: Fn(&ControllerEvent) + Send + Sync,
{
    fn on_event(&self, event: &ControllerEvent) {
        self(event)
    }
}
