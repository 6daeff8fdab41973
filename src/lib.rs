//! # dynsync
//!
//! Power-aware filesystem sync policy controller.
//!
//! dynsync decides *when* an existing durable-sync primitive is invoked
//! versus skipped: while the display is off and the policy allows it,
//! durability syncs may be deferred for throughput, backed by a periodic
//! deferred flush; when the display comes back on, or on panic/reboot, syncs
//! are forced immediately for data safety.
//!
//! ## Quick Start
//!
//! ```
//! use dynsync::prelude::*;
//!
//! // Event sources owned by the host.
//! let display = NotifierChain::new();
//! let panic_chain = NotifierChain::new();
//! let reboot_chain = NotifierChain::new();
//!
//! let sync = DynamicSyncBuilder::new()
//!     .display_source(&display)
//!     .panic_source(&panic_chain)
//!     .reboot_source(&reboot_chain)
//!     .start(NoopFlusher)?;
//!
//! // The filesystem layer keeps a read-only gate handle.
//! let gate = sync.gate_reader();
//!
//! // Operators drive the policy through the control surface.
//! let control = ControlSurface::new(sync);
//! control.write("enabled", "1")?;
//!
//! // Display off: deferral opens and a flush is scheduled.
//! display.notify(&DisplayEvent::Blanked);
//! assert!(gate.defer_allowed());
//!
//! // Panic: deferral slams shut.
//! panic_chain.notify(&PanicEvent);
//! assert!(!gate.defer_allowed());
//! # Ok::<(), dynsync::Error>(())
//! ```
//!
//! ## Components
//!
//! - [`DynamicSync`] - the policy controller and event handlers
//! - [`SyncGateReader`] - lock-free gate handle for the filesystem layer
//! - [`ControlSurface`] - sysfs-style key/value tunables
//! - [`NotifierChain`] - priority-ordered event dispatch
//! - [`Flusher`] - seam to the host's durable-flush primitives

#![warn(missing_docs)]
#![warn(clippy::all)]

mod control;
mod controller;
mod error;
mod flush;
mod gate;
mod notifier;
mod scheduler;
mod types;

pub mod prelude;

// Main entry points
pub use controller::{DynamicSync, DynamicSyncBuilder};

// Control surface
pub use control::{
    ControlSurface, KEYS, KEY_DELAY_MS, KEY_DISPLAY_DRIVEN, KEY_ENABLED, KEY_VERSION, UNSUPPORTED,
};

// Error handling
pub use error::{Error, Result};

// Collaborator seams
pub use flush::{Flusher, NoopFlusher};
pub use gate::SyncGateReader;
pub use notifier::{NotifierChain, PANIC_PRIORITY, REBOOT_PRIORITY};

// Event and state types
pub use types::{
    DisplayEvent, DisplayState, PanicEvent, RebootEvent, DEFAULT_ENABLED, DEFAULT_FLUSH_DELAY,
};

/// Static version identifier, exposed through the `version` control key.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
