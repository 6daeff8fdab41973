//! Collaborator seam for the underlying sync primitives.
//!
//! The controller never performs storage I/O itself; it decides *when* the
//! durable-flush primitives run and invokes them through this trait.

/// Durable-flush primitives consumed by the policy controller.
///
/// Both operations are fire-and-forget: the underlying sync machinery is
/// assumed not to fail in ways this layer must recover from, so neither
/// returns a `Result` and no retries are ever performed.
pub trait Flusher: Send + Sync + 'static {
    /// Flush all pending filesystem writes to stable storage.
    ///
    /// May take arbitrarily long; called from the deferred-flush worker and
    /// from `enabled` toggles, never from a critical event path.
    fn sync_all(&self);

    /// Best-effort immediate flush for when the process may not survive
    /// long enough for [`Flusher::sync_all`] to complete.
    ///
    /// Must not block on any executor or lock; called from panic and
    /// reboot handlers.
    fn emergency_sync(&self);
}

/// A [`Flusher`] that does nothing.
///
/// Useful when wiring the controller into a host that handles durability
/// elsewhere, and as a stand-in during bring-up.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFlusher;

impl Flusher for NoopFlusher {
    fn sync_all(&self) {}

    fn emergency_sync(&self) {}
}
