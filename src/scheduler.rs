//! Deferred flush scheduling.
//!
//! [`FlushScheduler`] owns a single reschedulable, cancelable one-shot task
//! that runs a flush job after a delay. The task is represented as one
//! `Armed(deadline)` slot guarded by a mutex: scheduling while armed is a
//! no-op, rescheduling mutates the deadline in place, and canceling clears
//! the slot. No second task object is ever created, so at most one flush is
//! pending at any time for any interleaving of calls.
//!
//! The job runs on a dedicated worker thread. Failure to spawn the worker is
//! fatal to subsystem startup; once running, all scheduling operations are
//! infallible.

use crate::error::Result;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// State of the single deferred-flush slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// No flush pending.
    Idle,
    /// A flush will run at the deadline unless canceled or rescheduled.
    Armed(Instant),
    /// Worker must exit.
    Shutdown,
}

struct Shared {
    slot: Mutex<Slot>,
    wakeup: Condvar,
}

/// Owner of the deferred-flush worker and its pending-task slot.
///
/// Dropping the scheduler shuts the worker down and joins it; a task that
/// is already executing runs to completion first.
pub(crate) struct FlushScheduler {
    shared: Arc<Shared>,
    worker: Option<thread::JoinHandle<()>>,
}

impl FlushScheduler {
    /// Spawn the worker thread that executes `job` each time the slot's
    /// deadline expires.
    pub(crate) fn start<F>(job: F) -> Result<Self>
    where
        F: Fn() + Send + 'static,
    {
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot::Idle),
            wakeup: Condvar::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("dynsync-flush".to_string())
            .spawn(move || worker_loop(worker_shared, job))?;

        Ok(FlushScheduler {
            shared,
            worker: Some(worker),
        })
    }

    /// Arm the slot to fire after `delay`.
    ///
    /// No-op if a flush is already pending; callers that want to change the
    /// timing of a pending flush must use [`FlushScheduler::reschedule`].
    /// Returns whether the slot was newly armed.
    pub(crate) fn schedule(&self, delay: Duration) -> bool {
        let mut slot = self.shared.slot.lock();
        match *slot {
            Slot::Idle => {
                *slot = Slot::Armed(Instant::now() + delay);
                self.shared.wakeup.notify_all();
                debug!(delay_ms = delay.as_millis() as u64, "deferred flush armed");
                true
            }
            Slot::Armed(_) | Slot::Shutdown => false,
        }
    }

    /// Move a pending flush's deadline to `new_delay` from now.
    ///
    /// No-op if nothing is pending. Returns whether a deadline was moved.
    pub(crate) fn reschedule(&self, new_delay: Duration) -> bool {
        let mut slot = self.shared.slot.lock();
        match *slot {
            Slot::Armed(_) => {
                *slot = Slot::Armed(Instant::now() + new_delay);
                self.shared.wakeup.notify_all();
                debug!(
                    delay_ms = new_delay.as_millis() as u64,
                    "deferred flush rescheduled"
                );
                true
            }
            Slot::Idle | Slot::Shutdown => false,
        }
    }

    /// Clear a pending flush.
    ///
    /// Safe to call when nothing is pending and safe to call concurrently
    /// with the job's own execution: a job already running is not
    /// interrupted, only future firing is affected. Returns whether a
    /// pending flush was removed.
    pub(crate) fn cancel(&self) -> bool {
        let mut slot = self.shared.slot.lock();
        match *slot {
            Slot::Armed(_) => {
                *slot = Slot::Idle;
                self.shared.wakeup.notify_all();
                debug!("deferred flush canceled");
                true
            }
            Slot::Idle | Slot::Shutdown => false,
        }
    }

    /// Whether a flush is currently pending.
    pub(crate) fn pending(&self) -> bool {
        matches!(*self.shared.slot.lock(), Slot::Armed(_))
    }
}

impl Drop for FlushScheduler {
    fn drop(&mut self) {
        {
            let mut slot = self.shared.slot.lock();
            *slot = Slot::Shutdown;
            self.shared.wakeup.notify_all();
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl std::fmt::Debug for FlushScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlushScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

fn worker_loop<F: Fn()>(shared: Arc<Shared>, job: F) {
    let mut slot = shared.slot.lock();
    loop {
        match *slot {
            Slot::Shutdown => return,
            Slot::Idle => {
                shared.wakeup.wait(&mut slot);
            }
            Slot::Armed(deadline) => {
                if Instant::now() >= deadline {
                    // Clear the slot before running so a concurrent
                    // schedule() arms the next flush instead of no-opping.
                    *slot = Slot::Idle;
                    drop(slot);
                    job();
                    slot = shared.slot.lock();
                } else {
                    let _ = shared.wakeup.wait_until(&mut slot, deadline);
                }
            }
        }
    }
}
