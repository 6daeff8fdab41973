//! The sync policy controller.
//!
//! [`DynamicSync`] owns the policy fields, the sync gate, and the deferred
//! flush scheduler, and reacts to display blanking events and critical
//! (panic/reboot) events. Create one with [`DynamicSyncBuilder`], wiring
//! in whichever event sources the host provides.
//!
//! # Consistency model
//!
//! Policy fields and the gate are independent single-word atomics, not a
//! multi-field lock. A display event racing a concurrent mutation may leave
//! the gate one step stale; the next event corrects it. This is a deliberate
//! latency-over-strict-consistency trade-off: gate readers sit on the
//! filesystem hot path and must never contend on a policy lock.
//!
//! Critical events always win: they force the gate closed and flush through
//! [`Flusher::emergency_sync`] without touching the scheduler worker or any
//! lock a stalled caller could hold, so they run even when a policy mutation
//! is in flight or the worker is wedged. They are never deferred or
//! coalesced.

use crate::error::{Error, Result};
use crate::flush::Flusher;
use crate::gate::{SyncGate, SyncGateReader};
use crate::notifier::{NotifierChain, PANIC_PRIORITY, REBOOT_PRIORITY};
use crate::scheduler::FlushScheduler;
use crate::types::{
    DisplayEvent, DisplayState, PanicEvent, RebootEvent, DEFAULT_ENABLED, DEFAULT_FLUSH_DELAY,
};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Shared policy fields.
///
/// Each field is read and written as an independent atomic word; see the
/// module docs for why there is no enclosing lock.
struct SyncPolicy {
    enabled: AtomicBool,
    display_driven: AtomicBool,
    delay_ms: AtomicU64,
    display_state: AtomicU8,
}

impl SyncPolicy {
    fn new(display_driven: bool, delay: Duration) -> Self {
        SyncPolicy {
            enabled: AtomicBool::new(DEFAULT_ENABLED),
            display_driven: AtomicBool::new(display_driven),
            delay_ms: AtomicU64::new(delay.as_millis() as u64),
            display_state: AtomicU8::new(DisplayState::Unknown as u8),
        }
    }

    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn display_driven(&self) -> bool {
        self.display_driven.load(Ordering::SeqCst)
    }

    fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms.load(Ordering::SeqCst))
    }

    fn display_state(&self) -> DisplayState {
        DisplayState::from_raw(self.display_state.load(Ordering::SeqCst))
    }
}

/// Policy state plus the collaborators the flush paths need.
///
/// Split out from [`DynamicSync`] so the deferred-flush job can hold its own
/// handle without owning the scheduler.
struct Core<F: Flusher> {
    policy: SyncPolicy,
    gate: SyncGate,
    flusher: F,
}

impl<F: Flusher> Core<F> {
    /// Recompute the gate from the current policy and display state.
    ///
    /// Deferral is allowed only while the policy is enabled, and then:
    /// - display-driven: only while the display is known to be off;
    /// - policy-driven (display decoupled): whenever the display state has
    ///   been observed at least once. A permanently unknown display state
    ///   means deferral is never backed by display events, so the gate
    ///   stays at "always immediate".
    fn reevaluate_gate(&self) {
        let allow = self.policy.enabled()
            && match (self.policy.display_driven(), self.policy.display_state()) {
                (true, DisplayState::Off) => true,
                (true, _) => false,
                (false, DisplayState::Unknown) => false,
                (false, _) => true,
            };
        self.gate.set(allow);
    }

    /// Durable flush with the gate held closed for the duration, then
    /// restored to whatever the current policy dictates.
    ///
    /// This is the deferred task body; it also backs `enabled` toggles.
    fn force_sync(&self) {
        self.gate.set(false);
        self.flusher.sync_all();
        self.reevaluate_gate();
        debug!(defer_allowed = self.gate.get(), "forced durable flush");
    }

    /// Close the gate and fire the best-effort flush primitive.
    ///
    /// Runs on panic/reboot paths: no scheduler, no locks, no gate
    /// restoration. The gate stays closed until a later event or mutation
    /// re-evaluates it.
    fn critical_sync(&self) {
        if !self.policy.enabled() {
            return;
        }
        self.gate.set(false);
        self.flusher.emergency_sync();
    }
}

/// Power-aware sync policy controller.
///
/// Decides when durability syncs may be deferred (display off, policy
/// enabled) and when they must be forced (display on, critical events,
/// periodic deferred flush). The filesystem layer consults
/// [`DynamicSync::gate_reader`] before each optional sync.
///
/// # Example
///
/// ```
/// use dynsync::prelude::*;
///
/// let display = NotifierChain::new();
/// let panic_chain = NotifierChain::new();
/// let reboot_chain = NotifierChain::new();
///
/// let sync = DynamicSyncBuilder::new()
///     .display_source(&display)
///     .panic_source(&panic_chain)
///     .reboot_source(&reboot_chain)
///     .start(NoopFlusher)?;
///
/// let gate = sync.gate_reader();
/// sync.set_enabled(true)?;
///
/// display.notify(&DisplayEvent::Unblanked);
/// assert!(!gate.defer_allowed());
/// # Ok::<(), dynsync::Error>(())
/// ```
pub struct DynamicSync<F: Flusher> {
    core: Arc<Core<F>>,
    scheduler: FlushScheduler,
}

impl<F: Flusher> DynamicSync<F> {
    /// Start a controller with no event sources attached.
    ///
    /// Display-driven policy is permanently inoperative; panic and reboot
    /// handling must be driven through [`DynamicSync::handle_panic`] and
    /// [`DynamicSync::handle_reboot`] directly.
    pub fn start(flusher: F) -> Result<Arc<Self>> {
        DynamicSyncBuilder::new().start(flusher)
    }

    /// Read-only gate handle for the filesystem collaborator.
    pub fn gate_reader(&self) -> SyncGateReader {
        self.core.gate.reader()
    }

    /// Whether deferral is currently allowed.
    pub fn defer_allowed(&self) -> bool {
        self.core.gate.get()
    }

    /// Master switch state.
    pub fn enabled(&self) -> bool {
        self.core.policy.enabled()
    }

    /// Whether display blanking events govern the gate.
    pub fn display_driven(&self) -> bool {
        self.core.policy.display_driven()
    }

    /// Configured deferred-flush delay.
    pub fn delay(&self) -> Duration {
        self.core.policy.delay()
    }

    /// Last known display power state.
    pub fn display_state(&self) -> DisplayState {
        self.core.policy.display_state()
    }

    /// Whether a deferred flush is currently pending.
    pub fn flush_pending(&self) -> bool {
        self.scheduler.pending()
    }

    /// React to a display blanking notification.
    ///
    /// Ignored entirely (the state is not even recorded) while the policy
    /// is disabled or not display-driven; duplicate notifications for the
    /// current state are ignored.
    pub fn handle_display_event(&self, event: DisplayEvent) {
        if !(self.core.policy.enabled() && self.core.policy.display_driven()) {
            return;
        }
        match event {
            DisplayEvent::Blanked => self.display_off(),
            DisplayEvent::Unblanked => self.display_on(),
        }
    }

    /// React to a fatal-error notification.
    ///
    /// Idempotent and re-entrant-safe; a no-op while the policy is
    /// disabled.
    pub fn handle_panic(&self) {
        self.core.critical_sync();
    }

    /// React to a shutdown notification.
    ///
    /// All of halt, restart, and power-off force the critical sync. A
    /// pending deferred flush is left alone: it either fires naturally or
    /// dies with the process.
    pub fn handle_reboot(&self, event: RebootEvent) {
        match event {
            RebootEvent::Halt | RebootEvent::Restart | RebootEvent::PowerOff => {
                self.core.critical_sync();
            }
        }
    }

    /// Toggle the master switch.
    ///
    /// Rejects no-op transitions. Either direction forces an immediate
    /// durable flush; the gate is then re-evaluated, which for the off
    /// direction pins it at "never defer" until re-enabled.
    pub fn set_enabled(&self, value: bool) -> Result<()> {
        if value == self.core.policy.enabled() {
            return Err(Error::Unchanged("enabled"));
        }
        self.core.policy.enabled.store(value, Ordering::SeqCst);
        self.core.force_sync();
        info!(enabled = value, "sync policy toggled");
        Ok(())
    }

    /// Toggle display-driven policy.
    ///
    /// Rejected while the display state has never been observed, and for
    /// no-op transitions. Disabling cancels any pending deferred flush;
    /// enabling while the display is already off re-arms one so an open
    /// deferral window is always backed by a pending flush.
    pub fn set_display_driven(&self, value: bool) -> Result<()> {
        if self.core.policy.display_state() == DisplayState::Unknown {
            return Err(Error::DisplayStateUnknown);
        }
        if value == self.core.policy.display_driven() {
            return Err(Error::Unchanged("display_driven"));
        }
        self.core
            .policy
            .display_driven
            .store(value, Ordering::SeqCst);
        self.core.reevaluate_gate();

        if !value {
            // Display-driven scheduling is meaningless once decoupled from
            // display events.
            self.scheduler.cancel();
        } else if self.core.policy.enabled()
            && self.core.policy.display_state() == DisplayState::Off
        {
            self.scheduler.schedule(self.core.policy.delay());
        }
        info!(display_driven = value, "display-driven policy toggled");
        Ok(())
    }

    /// Change the deferred-flush delay.
    ///
    /// Rejected while display-driven mode is inactive, and for no-op
    /// transitions. A pending flush is rescheduled in place; otherwise only
    /// the stored default changes.
    pub fn set_delay(&self, delay: Duration) -> Result<()> {
        if !self.core.policy.display_driven() {
            return Err(Error::DisplayDrivenInactive);
        }
        if delay == self.core.policy.delay() {
            return Err(Error::Unchanged("delay_ms"));
        }
        self.core
            .policy
            .delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
        self.scheduler.reschedule(delay);
        info!(delay_ms = delay.as_millis() as u64, "flush delay changed");
        Ok(())
    }

    fn display_off(&self) {
        if self.core.policy.display_state() == DisplayState::Off {
            return;
        }
        self.core
            .policy
            .display_state
            .store(DisplayState::Off as u8, Ordering::SeqCst);
        self.core.gate.set(true);
        self.scheduler.schedule(self.core.policy.delay());
        debug!("display blanked: deferral allowed, flush scheduled");
    }

    fn display_on(&self) {
        if self.core.policy.display_state() == DisplayState::On {
            return;
        }
        self.core
            .policy
            .display_state
            .store(DisplayState::On as u8, Ordering::SeqCst);
        self.scheduler.cancel();
        self.core.gate.set(false);
        debug!("display unblanked: deferral disallowed, flush canceled");
    }
}

impl<F: Flusher> std::fmt::Debug for DynamicSync<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicSync")
            .field("enabled", &self.enabled())
            .field("display_driven", &self.display_driven())
            .field("delay", &self.delay())
            .field("display_state", &self.display_state())
            .field("defer_allowed", &self.defer_allowed())
            .field("flush_pending", &self.flush_pending())
            .finish()
    }
}

/// Builder for [`DynamicSync`].
///
/// Event sources are optional: a missing display source degrades the
/// controller to permanently display-unaware (with a single warning);
/// missing panic/reboot sources simply mean the host calls the handlers
/// directly.
pub struct DynamicSyncBuilder<'a> {
    display: Option<&'a NotifierChain<DisplayEvent>>,
    panic: Option<&'a NotifierChain<PanicEvent>>,
    reboot: Option<&'a NotifierChain<RebootEvent>>,
}

impl<'a> DynamicSyncBuilder<'a> {
    /// Create a builder with no event sources attached.
    pub fn new() -> Self {
        DynamicSyncBuilder {
            display: None,
            panic: None,
            reboot: None,
        }
    }

    /// Attach the display blanking event source.
    pub fn display_source(mut self, chain: &'a NotifierChain<DisplayEvent>) -> Self {
        self.display = Some(chain);
        self
    }

    /// Attach the panic notification source.
    pub fn panic_source(mut self, chain: &'a NotifierChain<PanicEvent>) -> Self {
        self.panic = Some(chain);
        self
    }

    /// Attach the reboot notification source.
    pub fn reboot_source(mut self, chain: &'a NotifierChain<RebootEvent>) -> Self {
        self.reboot = Some(chain);
        self
    }

    /// Spawn the flush worker and register all attached event sources.
    ///
    /// Worker spawn failure is fatal: the error is returned and no source
    /// is registered.
    pub fn start<F: Flusher>(self, flusher: F) -> Result<Arc<DynamicSync<F>>> {
        let has_display = self.display.is_some();
        // An absent display source permanently disables display-driven
        // behavior: the delay becomes meaningless alongside it.
        let (display_driven, delay) = if has_display {
            (true, DEFAULT_FLUSH_DELAY)
        } else {
            (false, Duration::ZERO)
        };

        let core = Arc::new(Core {
            policy: SyncPolicy::new(display_driven, delay),
            gate: SyncGate::new(),
            flusher,
        });

        let job_core = Arc::clone(&core);
        let scheduler = FlushScheduler::start(move || job_core.force_sync())?;

        let controller = Arc::new(DynamicSync { core, scheduler });

        if let Some(chain) = self.display {
            let this = Arc::clone(&controller);
            chain.register(0, move |event: &DisplayEvent| {
                this.handle_display_event(*event)
            });
        } else {
            warn!("no display event source attached; display-driven policy disabled");
        }

        if let Some(chain) = self.panic {
            let this = Arc::clone(&controller);
            chain.register(PANIC_PRIORITY, move |_: &PanicEvent| this.handle_panic());
        }

        if let Some(chain) = self.reboot {
            let this = Arc::clone(&controller);
            chain.register(REBOOT_PRIORITY, move |event: &RebootEvent| {
                this.handle_reboot(*event)
            });
        }

        Ok(controller)
    }
}

impl<'a> Default for DynamicSyncBuilder<'a> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flush::NoopFlusher;
    use std::sync::atomic::AtomicUsize;

    /// Flusher double that counts invocations of each primitive.
    #[derive(Clone, Default)]
    struct RecordingFlusher {
        syncs: Arc<AtomicUsize>,
        emergencies: Arc<AtomicUsize>,
    }

    impl RecordingFlusher {
        fn syncs(&self) -> usize {
            self.syncs.load(Ordering::SeqCst)
        }

        fn emergencies(&self) -> usize {
            self.emergencies.load(Ordering::SeqCst)
        }
    }

    impl Flusher for RecordingFlusher {
        fn sync_all(&self) {
            self.syncs.fetch_add(1, Ordering::SeqCst);
        }

        fn emergency_sync(&self) {
            self.emergencies.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Controller with an attached display chain and recording flusher.
    fn display_controller() -> (
        Arc<DynamicSync<RecordingFlusher>>,
        Arc<NotifierChain<DisplayEvent>>,
        RecordingFlusher,
    ) {
        let chain = Arc::new(NotifierChain::new());
        let flusher = RecordingFlusher::default();
        let sync = DynamicSyncBuilder::new()
            .display_source(&chain)
            .start(flusher.clone())
            .unwrap();
        (sync, chain, flusher)
    }

    #[test]
    fn test_starts_disabled_with_gate_closed() {
        let (sync, _chain, flusher) = display_controller();
        assert!(!sync.enabled());
        assert!(sync.display_driven());
        assert_eq!(sync.delay(), DEFAULT_FLUSH_DELAY);
        assert_eq!(sync.display_state(), DisplayState::Unknown);
        assert!(!sync.defer_allowed());
        assert!(!sync.flush_pending());
        assert_eq!(flusher.syncs(), 0);
    }

    #[test]
    fn test_no_display_source_degrades() {
        let flusher = RecordingFlusher::default();
        let sync = DynamicSync::start(flusher).unwrap();
        assert!(!sync.display_driven());
        assert_eq!(sync.delay(), Duration::ZERO);
        assert_eq!(sync.display_state(), DisplayState::Unknown);
        assert!(matches!(
            sync.set_display_driven(true),
            Err(Error::DisplayStateUnknown)
        ));
        assert!(matches!(
            sync.set_delay(Duration::from_millis(100)),
            Err(Error::DisplayDrivenInactive)
        ));
    }

    #[test]
    fn test_no_display_source_never_defers() {
        let sync = DynamicSync::start(NoopFlusher).unwrap();
        sync.set_enabled(true).unwrap();
        // Display state was never observed: enabling must not open a
        // deferral window nobody would ever close.
        assert!(!sync.defer_allowed());
    }

    #[test]
    fn test_set_enabled_rejects_noop() {
        let (sync, _chain, flusher) = display_controller();
        assert!(sync.set_enabled(false).unwrap_err().is_unchanged());
        assert_eq!(flusher.syncs(), 0);

        sync.set_enabled(true).unwrap();
        assert!(sync.set_enabled(true).unwrap_err().is_unchanged());
        assert_eq!(flusher.syncs(), 1);
    }

    #[test]
    fn test_enable_flushes_both_directions() {
        let (sync, _chain, flusher) = display_controller();
        sync.set_enabled(true).unwrap();
        assert_eq!(flusher.syncs(), 1);
        sync.set_enabled(false).unwrap();
        assert_eq!(flusher.syncs(), 2);
    }

    #[test]
    fn test_blank_opens_gate_and_schedules() {
        let (sync, chain, _flusher) = display_controller();
        sync.set_enabled(true).unwrap();

        chain.notify(&DisplayEvent::Unblanked);
        assert_eq!(sync.display_state(), DisplayState::On);
        assert!(!sync.defer_allowed());
        assert!(!sync.flush_pending());

        chain.notify(&DisplayEvent::Blanked);
        assert_eq!(sync.display_state(), DisplayState::Off);
        assert!(sync.defer_allowed());
        assert!(sync.flush_pending());
    }

    #[test]
    fn test_unblank_cancels_and_closes_gate() {
        let (sync, chain, _flusher) = display_controller();
        sync.set_enabled(true).unwrap();
        chain.notify(&DisplayEvent::Blanked);
        assert!(sync.flush_pending());

        chain.notify(&DisplayEvent::Unblanked);
        assert!(!sync.defer_allowed());
        assert!(!sync.flush_pending());
    }

    #[test]
    fn test_events_ignored_while_disabled() {
        let (sync, chain, _flusher) = display_controller();
        chain.notify(&DisplayEvent::Blanked);
        // The state is not even recorded while the policy is inert.
        assert_eq!(sync.display_state(), DisplayState::Unknown);
        assert!(!sync.defer_allowed());
        assert!(!sync.flush_pending());
    }

    #[test]
    fn test_duplicate_events_are_idempotent() {
        let (sync, chain, _flusher) = display_controller();
        sync.set_enabled(true).unwrap();

        chain.notify(&DisplayEvent::Unblanked);
        chain.notify(&DisplayEvent::Unblanked);
        assert_eq!(sync.display_state(), DisplayState::On);

        chain.notify(&DisplayEvent::Blanked);
        assert!(sync.flush_pending());
        chain.notify(&DisplayEvent::Blanked);
        assert!(sync.defer_allowed());
        assert!(sync.flush_pending());
    }

    #[test]
    fn test_panic_closes_gate_and_emergency_syncs() {
        let (sync, chain, flusher) = display_controller();
        sync.set_enabled(true).unwrap();
        chain.notify(&DisplayEvent::Blanked);
        assert!(sync.defer_allowed());

        sync.handle_panic();
        assert!(!sync.defer_allowed());
        assert_eq!(flusher.emergencies(), 1);

        // Re-entrant safe.
        sync.handle_panic();
        assert_eq!(flusher.emergencies(), 2);
        assert!(!sync.defer_allowed());
    }

    #[test]
    fn test_critical_handlers_noop_while_disabled() {
        let (sync, _chain, flusher) = display_controller();
        sync.handle_panic();
        sync.handle_reboot(RebootEvent::PowerOff);
        assert_eq!(flusher.emergencies(), 0);
    }

    #[test]
    fn test_reboot_variants_all_critical_sync() {
        let (sync, _chain, flusher) = display_controller();
        sync.set_enabled(true).unwrap();
        for event in [RebootEvent::Halt, RebootEvent::Restart, RebootEvent::PowerOff] {
            sync.handle_reboot(event);
            assert!(!sync.defer_allowed());
        }
        assert_eq!(flusher.emergencies(), 3);
    }

    #[test]
    fn test_critical_event_leaves_pending_flush_alone() {
        let (sync, chain, _flusher) = display_controller();
        sync.set_enabled(true).unwrap();
        chain.notify(&DisplayEvent::Blanked);
        assert!(sync.flush_pending());

        sync.handle_reboot(RebootEvent::Restart);
        assert!(!sync.defer_allowed());
        assert!(sync.flush_pending());
    }

    #[test]
    fn test_disable_enable_restores_gate_from_display_state() {
        let (sync, chain, _flusher) = display_controller();
        sync.set_enabled(true).unwrap();
        chain.notify(&DisplayEvent::Blanked);
        assert!(sync.defer_allowed());

        sync.set_enabled(false).unwrap();
        assert!(!sync.defer_allowed());

        sync.set_enabled(true).unwrap();
        assert!(sync.defer_allowed(), "last known display state is Off");
    }

    #[test]
    fn test_set_display_driven_rejected_while_unknown() {
        let (sync, _chain, _flusher) = display_controller();
        sync.set_enabled(true).unwrap();
        assert!(matches!(
            sync.set_display_driven(false),
            Err(Error::DisplayStateUnknown)
        ));
    }

    #[test]
    fn test_set_display_driven_rejects_noop() {
        let (sync, chain, _flusher) = display_controller();
        sync.set_enabled(true).unwrap();
        chain.notify(&DisplayEvent::Unblanked);
        assert!(sync.set_display_driven(true).unwrap_err().is_unchanged());
    }

    #[test]
    fn test_disabling_display_driven_cancels_pending_flush() {
        let (sync, chain, _flusher) = display_controller();
        sync.set_enabled(true).unwrap();
        chain.notify(&DisplayEvent::Blanked);
        assert!(sync.flush_pending());

        sync.set_display_driven(false).unwrap();
        assert!(!sync.flush_pending());
        // Gate now reflects `enabled` alone.
        assert!(sync.defer_allowed());
    }

    #[test]
    fn test_enabling_display_driven_while_off_rearms_flush() {
        let (sync, chain, _flusher) = display_controller();
        sync.set_enabled(true).unwrap();
        chain.notify(&DisplayEvent::Blanked);
        sync.set_display_driven(false).unwrap();
        assert!(!sync.flush_pending());

        sync.set_display_driven(true).unwrap();
        assert!(sync.defer_allowed());
        assert!(sync.flush_pending());
    }

    #[test]
    fn test_set_delay_requires_display_driven() {
        let (sync, chain, _flusher) = display_controller();
        sync.set_enabled(true).unwrap();
        chain.notify(&DisplayEvent::Unblanked);
        sync.set_display_driven(false).unwrap();
        assert!(matches!(
            sync.set_delay(Duration::from_millis(500)),
            Err(Error::DisplayDrivenInactive)
        ));
    }

    #[test]
    fn test_set_delay_rejects_noop() {
        let (sync, _chain, _flusher) = display_controller();
        assert!(sync.set_delay(DEFAULT_FLUSH_DELAY).unwrap_err().is_unchanged());
    }

    #[test]
    fn test_set_delay_updates_default_and_reschedules() {
        let (sync, chain, _flusher) = display_controller();
        sync.set_enabled(true).unwrap();

        // No task pending: only the stored default changes.
        sync.set_delay(Duration::from_millis(500)).unwrap();
        assert_eq!(sync.delay(), Duration::from_millis(500));
        assert!(!sync.flush_pending());

        // Task pending: rescheduled in place, still exactly one pending.
        chain.notify(&DisplayEvent::Blanked);
        assert!(sync.flush_pending());
        sync.set_delay(Duration::from_secs(10)).unwrap();
        assert!(sync.flush_pending());
        assert_eq!(sync.delay(), Duration::from_secs(10));
    }

    #[test]
    fn test_deferred_flush_fires_and_restores_gate() {
        let (sync, chain, flusher) = display_controller();
        sync.set_enabled(true).unwrap();
        sync.set_delay(Duration::from_millis(20)).unwrap();
        chain.notify(&DisplayEvent::Blanked);
        let enable_syncs = flusher.syncs();

        // The gate reopens only after the flush body finishes, so poll for
        // both the sync count and the restored gate.
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while flusher.syncs() < enable_syncs + 1 || !sync.defer_allowed() {
            assert!(std::time::Instant::now() < deadline, "deferred flush never fired");
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(!sync.flush_pending());
        // Display still off, policy unchanged: the gate stays open.
        assert!(sync.defer_allowed());
    }
}
