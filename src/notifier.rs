//! Priority-ordered event dispatch.
//!
//! External event sources (display driver, panic path, reboot path) each
//! own a [`NotifierChain`]; interested subsystems register callbacks with an
//! explicit priority. Dispatch walks subscribers from highest to lowest
//! priority, with registration order breaking ties.
//!
//! Registration happens during subsystem startup; [`NotifierChain::notify`]
//! only takes a read lock on the subscriber list and never touches policy or
//! scheduler locks, so a critical event can always dispatch even while an
//! unrelated caller is stalled.

use parking_lot::RwLock;

/// Highest subscriber priority. Used by the panic handler so it preempts
/// all other cleanup logic.
pub const PANIC_PRIORITY: i32 = i32::MAX;

/// Very high (but not maximum) subscriber priority, used by the reboot
/// handler.
pub const REBOOT_PRIORITY: i32 = i16::MAX as i32;

struct Subscriber<E> {
    priority: i32,
    callback: Box<dyn Fn(&E) + Send + Sync>,
}

/// An ordered list of subscriber callbacks for one event source.
///
/// `E` is the event payload type delivered to every subscriber.
pub struct NotifierChain<E> {
    subscribers: RwLock<Vec<Subscriber<E>>>,
}

impl<E> NotifierChain<E> {
    /// Create an empty chain.
    pub fn new() -> Self {
        NotifierChain {
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Register a callback at the given priority.
    ///
    /// Higher priorities are notified first. Subscribers sharing a priority
    /// are notified in registration order.
    pub fn register<F>(&self, priority: i32, callback: F)
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let mut subscribers = self.subscribers.write();
        // Insert after any existing subscriber with >= priority.
        let pos = subscribers
            .iter()
            .position(|s| s.priority < priority)
            .unwrap_or(subscribers.len());
        subscribers.insert(
            pos,
            Subscriber {
                priority,
                callback: Box::new(callback),
            },
        );
    }

    /// Deliver an event to every subscriber, highest priority first.
    pub fn notify(&self, event: &E) {
        let subscribers = self.subscribers.read();
        for subscriber in subscribers.iter() {
            (subscriber.callback)(event);
        }
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Whether no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }
}

impl<E> Default for NotifierChain<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for NotifierChain<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifierChain")
            .field("subscribers", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn recording_chain() -> (NotifierChain<u32>, Arc<Mutex<Vec<&'static str>>>) {
        (NotifierChain::new(), Arc::new(Mutex::new(Vec::new())))
    }

    #[test]
    fn test_notify_empty_chain_is_noop() {
        let chain: NotifierChain<u32> = NotifierChain::new();
        chain.notify(&1);
        assert!(chain.is_empty());
    }

    #[test]
    fn test_priority_ordering() {
        let (chain, log) = recording_chain();

        let l = Arc::clone(&log);
        chain.register(10, move |_| l.lock().push("low"));
        let l = Arc::clone(&log);
        chain.register(PANIC_PRIORITY, move |_| l.lock().push("panic"));
        let l = Arc::clone(&log);
        chain.register(REBOOT_PRIORITY, move |_| l.lock().push("reboot"));

        chain.notify(&0);
        assert_eq!(*log.lock(), vec!["panic", "reboot", "low"]);
    }

    #[test]
    fn test_equal_priority_keeps_registration_order() {
        let (chain, log) = recording_chain();

        let l = Arc::clone(&log);
        chain.register(5, move |_| l.lock().push("first"));
        let l = Arc::clone(&log);
        chain.register(5, move |_| l.lock().push("second"));

        chain.notify(&0);
        assert_eq!(*log.lock(), vec!["first", "second"]);
    }

    #[test]
    fn test_event_payload_delivered() {
        let chain: NotifierChain<u32> = NotifierChain::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        chain.register(0, move |ev| s.lock().push(*ev));

        chain.notify(&7);
        chain.notify(&9);
        assert_eq!(*seen.lock(), vec![7, 9]);
    }
}
