//! Data models for laser and connection state
//!
//! This module provides:
//! - Laser identifiers (1-based)
//! - Per-laser ON/OFF state
//! - A fixed-size, ordered snapshot of every laser's state
//! - Connection state of the controller

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 1-based identifier of a laser channel
pub type LaserId = usize;

/// State of a single laser
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaserState {
    /// Laser is off
    #[default]
    Off,
    /// Laser is on
    On,
}

impl LaserState {
    /// Check whether the laser is emitting
    pub fn is_on(self) -> bool {
        self == LaserState::On
    }

    /// The state a toggle command moves to
    pub fn toggled(self) -> Self {
        match self {
            LaserState::Off => LaserState::On,
            LaserState::On => LaserState::Off,
        }
    }
}

impl From<bool> for LaserState {
    fn from(on: bool) -> Self {
        if on {
            LaserState::On
        } else {
            LaserState::Off
        }
    }
}

impl From<LaserState> for bool {
    fn from(state: LaserState) -> Self {
        state.is_on()
    }
}

impl fmt::Display for LaserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaserState::Off => write!(f, "OFF"),
            LaserState::On => write!(f, "ON"),
        }
    }
}

/// Ordered state of every laser managed by a controller
///
/// Holds exactly one entry per id in `1..=len()`. The length is fixed at
/// construction. A controller hands out clones, so mutating a snapshot never
/// reaches the controller's own copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaserStates {
    states: Vec<LaserState>,
}

impl LaserStates {
    /// Create `count` lasers, all off
    pub fn new(count: usize) -> Self {
        Self {
            states: vec![LaserState::Off; count],
        }
    }

    /// Number of lasers
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Check if no lasers are tracked
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Check if `id` addresses a tracked laser
    pub fn contains(&self, id: LaserId) -> bool {
        (1..=self.states.len()).contains(&id)
    }

    /// State of laser `id`, or `None` when out of range
    pub fn get(&self, id: LaserId) -> Option<LaserState> {
        if self.contains(id) {
            Some(self.states[id - 1])
        } else {
            None
        }
    }

    /// Iterate `(id, state)` pairs in increasing id order
    pub fn iter(&self) -> impl Iterator<Item = (LaserId, LaserState)> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(|(index, state)| (index + 1, *state))
    }

    /// Check if every laser is in `state`
    pub fn all(&self, state: LaserState) -> bool {
        self.states.iter().all(|s| *s == state)
    }

    /// Number of lasers currently on
    pub fn count_on(&self) -> usize {
        self.states.iter().filter(|s| s.is_on()).count()
    }

    /// Copy into an id-keyed map
    pub fn to_map(&self) -> BTreeMap<LaserId, LaserState> {
        self.iter().collect()
    }

    /// Flip laser `id`, returning the new state
    ///
    /// Panics if `id` is out of range; check with [`LaserStates::contains`].
    pub fn toggle(&mut self, id: LaserId) -> LaserState {
        let slot = &mut self.states[id - 1];
        *slot = slot.toggled();
        *slot
    }

    /// Set every laser to `state`
    pub fn fill(&mut self, state: LaserState) {
        self.states.iter_mut().for_each(|s| *s = state);
    }
}

impl fmt::Display for LaserStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(id, state)| format!("{}:{}", id, state))
            .collect();
        write!(f, "[{}]", parts.join(" "))
    }
}

/// Connection state of a controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No open link
    #[default]
    Disconnected,
    /// Link open and lasers forced to a known state
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connected => write!(f, "Connected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_laser_state_conversions() {
        assert_eq!(LaserState::from(true), LaserState::On);
        assert_eq!(LaserState::from(false), LaserState::Off);
        assert!(bool::from(LaserState::On));
        assert_eq!(LaserState::default(), LaserState::Off);
        assert_eq!(LaserState::On.toggled(), LaserState::Off);
        assert_eq!(LaserState::On.to_string(), "ON");
    }

    #[test]
    fn test_states_are_one_based() {
        let states = LaserStates::new(3);
        assert_eq!(states.len(), 3);
        assert_eq!(states.get(0), None);
        assert_eq!(states.get(1), Some(LaserState::Off));
        assert_eq!(states.get(3), Some(LaserState::Off));
        assert_eq!(states.get(4), None);
    }

    #[test]
    fn test_toggle_and_fill() {
        let mut states = LaserStates::new(3);
        assert_eq!(states.toggle(2), LaserState::On);
        assert_eq!(states.count_on(), 1);
        assert_eq!(states.to_string(), "[1:OFF 2:ON 3:OFF]");

        states.fill(LaserState::On);
        assert!(states.all(LaserState::On));
        states.fill(LaserState::Off);
        assert!(states.all(LaserState::Off));
    }

    #[test]
    fn test_iter_order_and_map() {
        let mut states = LaserStates::new(4);
        states.toggle(4);
        let ids: Vec<LaserId> = states.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);

        let map = states.to_map();
        assert_eq!(map.len(), 4);
        assert_eq!(map[&4], LaserState::On);
    }
}
