//! Key/value control surface for operators.
//!
//! A thin, sysfs-style layer over [`DynamicSync`]: one read/write pair per
//! tunable, with strict value parsing and the same rejection rules as the
//! underlying mutators. Display-dependent keys read as `<unsupported>`
//! while they are inoperative, mirroring how the attribute files of the
//! original tunables behave.

use crate::controller::DynamicSync;
use crate::error::{Error, Result};
use crate::flush::Flusher;
use crate::types::DisplayState;
use std::sync::Arc;
use std::time::Duration;

/// Master on/off switch.
pub const KEY_ENABLED: &str = "enabled";
/// Display-event-driven policy toggle.
pub const KEY_DISPLAY_DRIVEN: &str = "display_driven";
/// Deferred-flush delay in milliseconds.
pub const KEY_DELAY_MS: &str = "delay_ms";
/// Read-only version identifier.
pub const KEY_VERSION: &str = "version";

/// All keys the surface exposes.
pub const KEYS: &[&str] = &[KEY_ENABLED, KEY_DISPLAY_DRIVEN, KEY_DELAY_MS, KEY_VERSION];

/// Read value for display-dependent keys while they are inoperative.
pub const UNSUPPORTED: &str = "<unsupported>";

/// Validated key/value access to a [`DynamicSync`] controller.
#[derive(Debug, Clone)]
pub struct ControlSurface<F: Flusher> {
    sync: Arc<DynamicSync<F>>,
}

impl<F: Flusher> ControlSurface<F> {
    /// Wrap a controller.
    pub fn new(sync: Arc<DynamicSync<F>>) -> Self {
        ControlSurface { sync }
    }

    /// Read the current value of a key.
    ///
    /// `display_driven` reads as [`UNSUPPORTED`] while the display state
    /// has never been observed; `delay_ms` reads as [`UNSUPPORTED`] while
    /// display-driven mode is inactive.
    pub fn read(&self, key: &str) -> Result<String> {
        match key {
            KEY_ENABLED => Ok(format_bool(self.sync.enabled())),
            KEY_DISPLAY_DRIVEN => {
                if self.sync.display_state() == DisplayState::Unknown {
                    Ok(UNSUPPORTED.to_string())
                } else {
                    Ok(format_bool(self.sync.display_driven()))
                }
            }
            KEY_DELAY_MS => {
                if !self.sync.display_driven() {
                    Ok(UNSUPPORTED.to_string())
                } else {
                    Ok(self.sync.delay().as_millis().to_string())
                }
            }
            KEY_VERSION => Ok(crate::VERSION.to_string()),
            _ => Err(Error::UnknownKey(key.to_string())),
        }
    }

    /// Write a new value to a key.
    ///
    /// Values parse strictly: booleans accept only `0` and `1`, the delay
    /// accepts only a non-negative integer count of milliseconds.
    /// Surrounding whitespace (a trailing newline in particular) is
    /// tolerated. No-op writes are rejected without side effects.
    pub fn write(&self, key: &str, value: &str) -> Result<()> {
        match key {
            KEY_ENABLED => self.sync.set_enabled(parse_bool(KEY_ENABLED, value)?),
            KEY_DISPLAY_DRIVEN => self
                .sync
                .set_display_driven(parse_bool(KEY_DISPLAY_DRIVEN, value)?),
            KEY_DELAY_MS => {
                let ms = parse_delay_ms(value)?;
                self.sync.set_delay(Duration::from_millis(ms))
            }
            KEY_VERSION => Err(Error::ReadOnly(KEY_VERSION)),
            _ => Err(Error::UnknownKey(key.to_string())),
        }
    }
}

fn format_bool(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool> {
    match value.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(Error::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

fn parse_delay_ms(value: &str) -> Result<u64> {
    value.trim().parse::<u64>().map_err(|_| Error::InvalidValue {
        key: KEY_DELAY_MS,
        value: value.to_string(),
    })
}
