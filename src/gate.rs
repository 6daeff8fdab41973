//! The sync gate: a shared flag consulted before optional durability syncs.
//!
//! The filesystem layer reads the gate on every durability-sensitive
//! operation; this subsystem is the only writer. Readers get a
//! [`SyncGateReader`] handle with a `get()`-only API, so write access never
//! leaks outside the controller.
//!
//! # Consistency
//!
//! Reads and writes are single-word atomic operations. A reader racing a
//! display event may observe a one-event-old value; that staleness is an
//! accepted trade-off for a lock-free hot path, not a bug.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Writable side of the sync gate. Owned by the policy controller.
#[derive(Debug, Clone)]
pub(crate) struct SyncGate {
    defer_allowed: Arc<AtomicBool>,
}

impl SyncGate {
    /// Create a gate that disallows deferral.
    pub(crate) fn new() -> Self {
        SyncGate {
            defer_allowed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Store the gate value. Non-blocking.
    pub(crate) fn set(&self, defer_allowed: bool) {
        self.defer_allowed.store(defer_allowed, Ordering::SeqCst);
    }

    /// Load the gate value. Never blocks, never fails.
    pub(crate) fn get(&self) -> bool {
        self.defer_allowed.load(Ordering::SeqCst)
    }

    /// Create a read-only handle for the filesystem collaborator.
    pub(crate) fn reader(&self) -> SyncGateReader {
        SyncGateReader {
            defer_allowed: Arc::clone(&self.defer_allowed),
        }
    }
}

/// Read-only handle to the sync gate.
///
/// Cheap to clone; intended to be embedded in the filesystem layer and
/// consulted on its hot path.
#[derive(Debug, Clone)]
pub struct SyncGateReader {
    defer_allowed: Arc<AtomicBool>,
}

impl SyncGateReader {
    /// Whether an optional durability sync may currently be skipped.
    pub fn defer_allowed(&self) -> bool {
        self.defer_allowed.load(Ordering::SeqCst)
    }
}
