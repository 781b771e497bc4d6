//! The change bus: the notification channel between an adapter and its
//! observers.
//!
//! Every adapter owns exactly one [`ChangeBus`]. The bus itself accepts any
//! number of observers (diagnostics, test probes), but at most one *view*
//! may be attached to an adapter at a time; that rule is enforced by the
//! view attach/detach protocol, not here.

use horizon_tessera_core::{ConnectionId, DispatchReport, Signal, SlotResult};

use super::event::ChangeEvent;
use crate::error::ContractViolation;

/// Single-producer, multi-observer notification channel for structural
/// mutations.
///
/// Dispatch is synchronous and happens in subscription order; there is no
/// batching and no deduplication. The emitter is responsible for emitting
/// minimal events, and receives every observer failure back through the
/// [`DispatchReport`].
#[derive(Default)]
pub struct ChangeBus {
    signal: Signal<ChangeEvent>,
}

impl ChangeBus {
    /// Creates a bus with no observers.
    pub fn new() -> Self {
        Self {
            signal: Signal::new(),
        }
    }

    /// Subscribe an observer. Returns the id used to unsubscribe.
    pub fn subscribe<F>(&self, observer: F) -> ConnectionId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.signal.connect(observer)
    }

    /// Subscribe an observer that can report failure back to the emitter.
    pub fn subscribe_fallible<F>(&self, observer: F) -> ConnectionId
    where
        F: Fn(&ChangeEvent) -> SlotResult + Send + Sync + 'static,
    {
        self.signal.connect_fallible(observer)
    }

    /// Unsubscribe an observer.
    ///
    /// Idempotent: unsubscribing an id that is not currently registered is
    /// a no-op and returns `false`.
    pub fn unsubscribe(&self, id: ConnectionId) -> bool {
        self.signal.disconnect(id)
    }

    /// Number of currently subscribed observers.
    pub fn observer_count(&self) -> usize {
        self.signal.connection_count()
    }

    /// Temporarily suppress emission (batch mutations).
    pub fn set_blocked(&self, blocked: bool) {
        self.signal.set_blocked(blocked);
    }

    /// Emit a pre-built event to every observer, in subscription order.
    pub fn emit(&self, event: ChangeEvent) -> DispatchReport {
        tracing::trace!(target: "horizon_tessera::model", ?event, "emitting change event");
        self.signal.emit(&event)
    }

    /// Emit a full reset.
    pub fn reset(&self) -> DispatchReport {
        self.emit(ChangeEvent::Reset)
    }

    /// Emit a checked `Changed` event.
    pub fn changed(&self, start: usize, count: usize) -> Result<DispatchReport, ContractViolation> {
        Ok(self.emit(ChangeEvent::changed(start, count)?))
    }

    /// Emit a checked `Inserted` event.
    pub fn inserted(
        &self,
        start: usize,
        count: usize,
    ) -> Result<DispatchReport, ContractViolation> {
        Ok(self.emit(ChangeEvent::inserted(start, count)?))
    }

    /// Emit a checked `Removed` event.
    pub fn removed(&self, start: usize, count: usize) -> Result<DispatchReport, ContractViolation> {
        Ok(self.emit(ChangeEvent::removed(start, count)?))
    }

    /// Emit a checked `Moved` event.
    pub fn moved(
        &self,
        from: usize,
        to: usize,
        count: usize,
    ) -> Result<DispatchReport, ContractViolation> {
        Ok(self.emit(ChangeEvent::moved(from, to, count)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_events_arrive_in_subscription_order() {
        let bus = ChangeBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = seen.clone();
            bus.subscribe(move |event| seen.lock().push((tag, *event)));
        }

        bus.inserted(0, 2).unwrap();

        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], ("first", ChangeEvent::Inserted { start: 0, count: 2 }));
        assert_eq!(seen[1], ("second", ChangeEvent::Inserted { start: 0, count: 2 }));
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let bus = ChangeBus::new();
        let id = bus.subscribe(|_| {});
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.observer_count(), 0);
    }

    #[test]
    fn test_invalid_range_never_emitted() {
        let bus = ChangeBus::new();
        let count = Arc::new(Mutex::new(0));
        let count_clone = count.clone();
        bus.subscribe(move |_| *count_clone.lock() += 1);

        assert!(bus.changed(0, 0).is_err());
        assert!(bus.moved(1, 1, 1).is_err());
        assert_eq!(*count.lock(), 0);
    }

    #[test]
    fn test_failure_surfaces_in_report() {
        use horizon_tessera_core::ObserverError;

        let bus = ChangeBus::new();
        bus.subscribe_fallible(|_| Err(ObserverError::new("out of sync")));
        let reached = Arc::new(Mutex::new(false));
        let reached_clone = reached.clone();
        bus.subscribe(move |_| *reached_clone.lock() = true);

        let report = bus.reset();
        assert_eq!(report.failures.len(), 1);
        assert!(*reached.lock());
    }
}
