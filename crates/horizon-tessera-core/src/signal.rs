//! Signal system for Horizon Tessera.
//!
//! This module provides the typed publish/subscribe channel that data
//! sources use to announce structural changes to their observers. It is the
//! foundation the model layer builds its change bus on.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The main signal type for emitting notifications
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`DispatchReport`] - Per-emission summary of deliveries and failures
//!
//! # Delivery Semantics
//!
//! Dispatch is always synchronous on the emitting thread and happens in
//! connection order. There is no batching and no deduplication; the caller
//! is responsible for emitting minimal events.
//!
//! # Failure Semantics
//!
//! A failing slot never prevents delivery to the slots connected after it.
//! Error returns and caught panics are collected into the [`DispatchReport`]
//! handed back to the emitter, which decides what to do with them.
//!
//! # Example
//!
//! ```
//! use horizon_tessera_core::Signal;
//!
//! let changed = Signal::<String>::new();
//!
//! let conn_id = changed.connect(|text| {
//!     println!("changed to: {}", text);
//! });
//!
//! let report = changed.emit(&"hello".to_string());
//! assert_eq!(report.delivered, 1);
//! assert!(report.is_clean());
//!
//! changed.disconnect(conn_id);
//! ```

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::error::ObserverError;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via
    /// [`Signal::disconnect`]. The ID remains valid until the connection is
    /// explicitly disconnected or the signal is dropped.
    pub struct ConnectionId;
}

/// The result type slots return from a fallible connection.
pub type SlotResult = std::result::Result<(), ObserverError>;

/// A boxed slot function. Slots report failure through their return value;
/// panics are additionally caught at dispatch time.
type Slot<Args> = Arc<dyn Fn(&Args) -> SlotResult + Send + Sync>;

/// Internal storage for a single connection.
struct Connection<Args> {
    slot: Slot<Args>,
}

/// Connection table plus the explicit dispatch order.
///
/// `SlotMap` iteration order is unspecified after churn, so connection order
/// is tracked separately to guarantee in-order delivery.
struct SignalInner<Args> {
    connections: SlotMap<ConnectionId, Connection<Args>>,
    order: Vec<ConnectionId>,
}

/// Summary of a single emission: how many slots were invoked and which of
/// them failed.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Number of slots that were invoked.
    pub delivered: usize,
    /// Failures collected during dispatch, in delivery order.
    pub failures: Vec<(ConnectionId, ObserverError)>,
}

impl DispatchReport {
    /// `true` if every invoked slot completed without error or panic.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Converts the report into a `Result`, keeping the first failure.
    pub fn into_result(mut self) -> std::result::Result<usize, ObserverError> {
        if self.failures.is_empty() {
            Ok(self.delivered)
        } else {
            Err(self.failures.remove(0).1)
        }
    }
}

/// A type-safe signal with ordered, failure-isolating dispatch.
///
/// The signal is `Send + Sync` so it can live inside an `Arc`-shared data
/// source, but dispatch itself is synchronous: every connected slot runs on
/// the emitting thread before `emit` returns.
pub struct Signal<Args> {
    inner: Mutex<SignalInner<Args>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SignalInner {
                connections: SlotMap::with_key(),
                order: Vec::new(),
            }),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect an infallible slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot
    /// later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connect_fallible(move |args| {
            slot(args);
            Ok(())
        })
    }

    /// Connect a slot that can report failure.
    ///
    /// An `Err` return is collected into the emitter's [`DispatchReport`];
    /// it does not stop delivery to the remaining slots.
    pub fn connect_fallible<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) -> SlotResult + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        let id = inner.connections.insert(Connection {
            slot: Arc::new(slot),
        });
        inner.order.push(id);
        id
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed. Disconnecting
    /// an unknown or already-removed ID is a no-op, not an error.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        let mut inner = self.inner.lock();
        let removed = inner.connections.remove(id).is_some();
        if removed {
            inner.order.retain(|&other| other != id);
        }
        removed
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        let mut inner = self.inner.lock();
        inner.connections.clear();
        inner.order.clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.inner.lock().connections.len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` deliver nothing. This is useful
    /// during batch updates to prevent cascading notifications.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots in connection order.
    ///
    /// Slots connected or disconnected from within a slot take effect for
    /// the next emission; the current one runs against a snapshot of the
    /// connection table.
    pub fn emit(&self, args: &Args) -> DispatchReport {
        if self.is_blocked() {
            tracing::trace!(target: "horizon_tessera_core::signal", "signal blocked, skipping emit");
            return DispatchReport::default();
        }

        // Snapshot under the lock, dispatch outside it, so slots may
        // re-enter the signal (e.g. a view disconnecting during teardown).
        let snapshot: Vec<(ConnectionId, Slot<Args>)> = {
            let inner = self.inner.lock();
            inner
                .order
                .iter()
                .filter_map(|&id| inner.connections.get(id).map(|c| (id, c.slot.clone())))
                .collect()
        };

        tracing::trace!(
            target: "horizon_tessera_core::signal",
            connection_count = snapshot.len(),
            "emitting signal"
        );

        let mut report = DispatchReport::default();
        for (id, slot) in snapshot {
            report.delivered += 1;
            match catch_unwind(AssertUnwindSafe(|| slot(args))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::warn!(
                        target: "horizon_tessera_core::signal",
                        ?id,
                        error = %err,
                        "observer reported failure"
                    );
                    report.failures.push((id, err));
                }
                Err(payload) => {
                    let err = ObserverError::panicked(payload.as_ref());
                    tracing::error!(
                        target: "horizon_tessera_core::signal",
                        ?id,
                        error = %err,
                        "observer panicked during dispatch"
                    );
                    report.failures.push((id, err));
                }
            }
        }
        report
    }
}

static_assertions::assert_impl_all!(Signal<usize>: Send, Sync);
