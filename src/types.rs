//! Core types for the sync policy controller.
//!
//! These are the event and state vocabulary shared by the display tracker,
//! the critical event handlers, and the control surface.

use std::time::Duration;

/// Whether the policy subsystem starts enabled.
///
/// Deferral is opt-in: until an operator enables the policy, every
/// durability-sensitive operation syncs immediately.
pub const DEFAULT_ENABLED: bool = false;

/// Default delay before a deferred flush fires while the display stays off.
pub const DEFAULT_FLUSH_DELAY: Duration = Duration::from_millis(3000);

/// Last known display power state.
///
/// `Unknown` is the pre-event default. It is never produced by an event:
/// once a blanking notification arrives the tracker only moves between
/// `On` and `Off`. If no display source is attached at startup the state
/// stays `Unknown` for the lifetime of the controller and all
/// display-driven behavior is inoperative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DisplayState {
    /// No blanking event has ever been observed.
    Unknown = 0,
    /// Display output is on.
    On = 1,
    /// Display output is off.
    Off = 2,
}

impl DisplayState {
    /// Decode from the raw atomic cell representation.
    pub(crate) fn from_raw(raw: u8) -> Self {
        match raw {
            1 => DisplayState::On,
            2 => DisplayState::Off,
            _ => DisplayState::Unknown,
        }
    }
}

/// A display blanking notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    /// Display turned its output on.
    Unblanked,
    /// Display turned its output off (includes low-power blank variants).
    Blanked,
}

/// A fatal-error notification.
///
/// Delivered at most once per process lifetime; the process may terminate
/// abnormally at any moment after it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanicEvent;

/// A system shutdown notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebootEvent {
    /// System halt.
    Halt,
    /// Warm restart.
    Restart,
    /// Power-off.
    PowerOff,
}
