//! Controller events and the listener interface used to observe them

pub mod event;
pub mod listener;
