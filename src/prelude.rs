//! Convenient imports for dynsync.
//!
//! This module re-exports the most commonly used types so you can get
//! started with a single import:
//!
//! ```
//! use dynsync::prelude::*;
//!
//! let sync = DynamicSync::start(NoopFlusher)?;
//! let gate = sync.gate_reader();
//! # Ok::<(), dynsync::Error>(())
//! ```

// Main entry points
pub use crate::controller::{DynamicSync, DynamicSyncBuilder};

// Control surface
pub use crate::control::ControlSurface;

// Error handling
pub use crate::error::{Error, Result};

// Collaborator seams
pub use crate::flush::{Flusher, NoopFlusher};
pub use crate::gate::SyncGateReader;
pub use crate::notifier::NotifierChain;

// Event and state types
pub use crate::types::{DisplayEvent, DisplayState, PanicEvent, RebootEvent};
