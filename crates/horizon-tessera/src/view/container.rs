//! The reconciling tile view.
//!
//! `TileView` owns a tree of visual nodes and keeps it in sync with one
//! adapter. It never rebuilds the tree wholesale on ordinary edits:
//! each [`ChangeEvent`] is queued and, on the next layout pass, translated
//! into the minimal slot edits by [`reconcile::apply_event`], followed by
//! one bind pass and one geometry measurement.
//!
//! Structural work is deferred. Events arriving inside one call stack
//! coalesce into a single pass, which both keeps measurement stable and
//! makes a burst of notifications no more expensive than one.
//!
//! [`reconcile::apply_event`]: super::reconcile::apply_event

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use horizon_tessera_core::{ConnectionId, SharedUpdateQueue, UpdateId};

use crate::error::{Error, Result};
use crate::geometry::{Rect, Size};
use crate::layout::{Density, LogicalDensity, TileLayout, TilingMeasure};
use crate::model::{ChangeEvent, TileAdapter};

use super::reconcile::{apply_event, Slot};

type NaturalSizeProvider = Arc<dyn Fn(usize) -> Size + Send + Sync>;
type ScheduleHook = Arc<dyn Fn() + Send + Sync>;

struct ViewState<A: TileAdapter> {
    adapter: Option<Arc<A>>,
    connection: Option<ConnectionId>,
    /// Events received since the last layout pass, in arrival order.
    pending: Vec<ChangeEvent>,
    needs_layout: bool,
    slots: Vec<Slot<A::Node>>,
    layout: TileLayout,
    density: Arc<dyn Density + Send + Sync>,
    available_width: f32,
    natural: Option<NaturalSizeProvider>,
    /// Extra non-data tiles measured after the data-backed ones.
    trailing_reserve: usize,
    measure: TilingMeasure,
    schedule_hook: Option<ScheduleHook>,
    scheduler: Option<(Arc<SharedUpdateQueue>, UpdateId)>,
}

struct TileViewInner<A: TileAdapter> {
    state: Mutex<ViewState<A>>,
}

/// A view over one adapter, reconciling its node tree incrementally.
///
/// The handle is cheap to clone; all clones share one view. A view attaches
/// to at most one adapter at a time, and an adapter must drive at most one
/// view: attaching a second view to an adapter that already has one, without
/// detaching the first, leaves both views applying the same structural
/// events to diverging node trees. The result is unspecified. Detach the
/// first view before attaching another.
///
/// All mutation is expected on one logical thread. The internal lock makes
/// cross-thread access memory-safe, but interleaving mutations from several
/// threads gives no useful ordering guarantee. That lock is held while a
/// layout pass runs the adapter's `create_node` and `bind_node` closures,
/// so those closures must not call back into the view; the lock is not
/// reentrant and such a call deadlocks.
pub struct TileView<A: TileAdapter> {
    inner: Arc<TileViewInner<A>>,
}

impl<A: TileAdapter> Clone for TileView<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A> Default for TileView<A>
where
    A: TileAdapter + 'static,
    A::Node: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A> TileView<A>
where
    A: TileAdapter + 'static,
    A::Node: Send + 'static,
{
    /// Create a detached view with default layout settings.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(TileViewInner {
                state: Mutex::new(ViewState {
                    adapter: None,
                    connection: None,
                    pending: Vec::new(),
                    needs_layout: false,
                    slots: Vec::new(),
                    layout: TileLayout::new(),
                    density: Arc::new(LogicalDensity),
                    available_width: 0.0,
                    natural: None,
                    trailing_reserve: 0,
                    measure: TilingMeasure::empty(),
                    schedule_hook: None,
                    scheduler: None,
                }),
            }),
        }
    }

    /// Attach to `adapter`, detaching from any previous one first.
    ///
    /// Detaching discards every existing node. A full rebuild is queued,
    /// not run inline; it happens on the next layout pass.
    pub fn set_adapter(&self, adapter: Arc<A>) {
        let weak: Weak<TileViewInner<A>> = Arc::downgrade(&self.inner);
        let hook = {
            let mut state = self.inner.state.lock();
            Self::detach_locked(&mut state);

            let connection = adapter.bus().subscribe(move |event: &ChangeEvent| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let hook = {
                    let mut state = inner.state.lock();
                    state.pending.push(*event);
                    state.needs_layout = true;
                    state.schedule_hook.clone()
                };
                if let Some(hook) = hook {
                    hook();
                }
            });

            state.adapter = Some(adapter);
            state.connection = Some(connection);
            state.pending.push(ChangeEvent::Reset);
            state.needs_layout = true;
            state.schedule_hook.clone()
        };
        if let Some(hook) = hook {
            hook();
        }
    }

    /// Detach from the current adapter and discard all nodes.
    ///
    /// Idempotent and mandatory on teardown while the adapter outlives the
    /// view; a forgotten subscription is the one leak this design guards
    /// against, though dropping the last handle also unsubscribes.
    pub fn detach(&self) {
        let mut state = self.inner.state.lock();
        Self::detach_locked(&mut state);
    }

    fn detach_locked(state: &mut ViewState<A>) {
        if let (Some(adapter), Some(connection)) = (state.adapter.take(), state.connection.take()) {
            adapter.bus().unsubscribe(connection);
        }
        state.slots.clear();
        state.pending.clear();
        state.measure = TilingMeasure::empty();
        state.needs_layout = false;
    }

    /// `true` while attached to an adapter.
    pub fn is_attached(&self) -> bool {
        self.inner.state.lock().adapter.is_some()
    }

    /// Number of data-backed nodes currently in the tree.
    pub fn visible_node_count(&self) -> usize {
        self.inner.state.lock().slots.len()
    }

    /// `true` if a layout pass is pending.
    pub fn needs_layout(&self) -> bool {
        self.inner.state.lock().needs_layout
    }

    /// Mark the view dirty and fire the schedule hook.
    pub fn request_layout(&self) {
        let hook = {
            let mut state = self.inner.state.lock();
            state.needs_layout = true;
            state.schedule_hook.clone()
        };
        if let Some(hook) = hook {
            hook();
        }
    }

    /// Run one layout pass: apply queued events, bind dirty slots at their
    /// final indices, then measure.
    ///
    /// A no-op when nothing is dirty. Call this from the scheduler tick
    /// (see [`connect_scheduler`](Self::connect_scheduler)) or directly in
    /// headless use.
    pub fn run_layout_pass(&self) -> Result<()> {
        let mut state = self.inner.state.lock();
        if !state.needs_layout {
            return Ok(());
        }
        state.needs_layout = false;

        let Some(adapter) = state.adapter.clone() else {
            state.pending.clear();
            state.measure = TilingMeasure::empty();
            return Ok(());
        };

        let events = std::mem::take(&mut state.pending);
        if events.contains(&ChangeEvent::Reset) {
            // A reset supersedes everything else queued this tick; the
            // adapter's current state is all that matters.
            state.slots.clear();
            state
                .slots
                .extend((0..adapter.len()).map(|_| Slot::fresh(adapter.create_node())));
        } else {
            let mut make = || adapter.create_node();
            for event in &events {
                if let Err(violation) = apply_event(&mut state.slots, event, &mut make) {
                    // Leave the view consistent and schedule the recovery
                    // rebuild before surfacing the drift; without the hook
                    // a scheduler-driven view would stay desynchronized
                    // until the next unrelated event.
                    state.slots.clear();
                    state.pending.clear();
                    state.pending.push(ChangeEvent::Reset);
                    state.needs_layout = true;
                    let hook = state.schedule_hook.clone();
                    drop(state);
                    if let Some(hook) = hook {
                        hook();
                    }
                    return Err(Error::Contract(violation));
                }
            }

            // A count mismatch here means an adapter mutated without
            // notifying; rebuild rather than bind stale indices.
            let count = adapter.len();
            if state.slots.len() != count {
                tracing::warn!(
                    target: "horizon_tessera::view",
                    slots = state.slots.len(),
                    items = count,
                    "node tree out of sync with adapter, rebuilding"
                );
                state.slots.clear();
                state
                    .slots
                    .extend((0..count).map(|_| Slot::fresh(adapter.create_node())));
            }
        }

        for (index, slot) in state.slots.iter_mut().enumerate() {
            if slot.needs_bind {
                adapter.bind_node(&mut slot.value, index);
                slot.needs_bind = false;
            }
        }

        let tile_count = state.slots.len() + state.trailing_reserve;
        let layout = state.layout.clone();
        let density = state.density.clone();
        let width = state.available_width;
        let natural = state.natural.clone();
        let natural_fn: &dyn Fn(usize) -> Size = match &natural {
            Some(provider) => &**provider,
            None => &|_| Size::ZERO,
        };
        state.measure = layout.measure(tile_count, width, &*density, natural_fn);

        tracing::trace!(
            target: "horizon_tessera::layout",
            tiles = tile_count,
            events = events.len(),
            width = state.available_width,
            "layout pass complete"
        );
        Ok(())
    }

    /// Register a deferred-layout task on `queue` and schedule it whenever
    /// this view becomes dirty.
    ///
    /// However many events arrive before the queue is next pumped, the
    /// task runs the layout pass at most once per pump. Errors from the
    /// pass are logged, not propagated, since the pump has no caller to
    /// hand them to.
    pub fn connect_scheduler(&self, queue: &Arc<SharedUpdateQueue>) -> UpdateId {
        let weak: Weak<TileViewInner<A>> = Arc::downgrade(&self.inner);
        let id = queue.register(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let view = TileView { inner };
            if let Err(error) = view.run_layout_pass() {
                tracing::error!(
                    target: "horizon_tessera::view",
                    %error,
                    "deferred layout pass failed"
                );
            }
        });

        let mut state = self.inner.state.lock();
        let queue_for_hook = queue.clone();
        state.schedule_hook = Some(Arc::new(move || {
            let _ = queue_for_hook.schedule(id);
        }));
        state.scheduler = Some((queue.clone(), id));
        if state.needs_layout {
            let _ = queue.schedule(id);
        }
        id
    }

    /// Unregister from the scheduler connected via
    /// [`connect_scheduler`](Self::connect_scheduler).
    pub fn disconnect_scheduler(&self) {
        let taken = {
            let mut state = self.inner.state.lock();
            state.schedule_hook = None;
            state.scheduler.take()
        };
        if let Some((queue, id)) = taken {
            let _ = queue.unregister(id);
        }
    }

    /// Set a custom hook fired whenever the view becomes dirty.
    ///
    /// [`connect_scheduler`](Self::connect_scheduler) installs its own
    /// hook; use this only when driving layout from a host event loop.
    pub fn set_schedule_hook<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.state.lock().schedule_hook = Some(Arc::new(hook));
    }

    /// Set the column count. Triggers a deferred re-layout on success.
    pub fn set_columns(&self, columns: usize) -> Result<()> {
        self.inner.state.lock().layout.set_columns(columns)?;
        self.request_layout();
        Ok(())
    }

    /// Set the inter-tile spacing. Triggers a deferred re-layout.
    pub fn set_spacing(&self, spacing: crate::layout::TileSpacing) {
        self.inner.state.lock().layout.set_spacing(spacing);
        self.request_layout();
    }

    /// Set the tile aspect ratio. Triggers a deferred re-layout.
    pub fn set_ratio(&self, ratio: f32) {
        self.inner.state.lock().layout.set_ratio(ratio);
        self.request_layout();
    }

    /// Set the presentation mode. Triggers a deferred re-layout.
    pub fn set_mode(&self, mode: crate::layout::TileMode) {
        self.inner.state.lock().layout.set_mode(mode);
        self.request_layout();
    }

    /// Set the column policy. Triggers a deferred re-layout.
    pub fn set_column_rule(&self, rule: crate::layout::ColumnRule) {
        self.inner.state.lock().layout.set_column_rule(rule);
        self.request_layout();
    }

    /// Let a lone tile keep its natural size. Triggers a deferred
    /// re-layout.
    pub fn set_single_free(&self, single_free: bool) {
        self.inner.state.lock().layout.set_single_free(single_free);
        self.request_layout();
    }

    /// Set the available width in physical pixels. Triggers a deferred
    /// re-layout.
    pub fn set_available_width(&self, width: f32) {
        self.inner.state.lock().available_width = width;
        self.request_layout();
    }

    /// Set the dp conversion. Triggers a deferred re-layout.
    pub fn set_density<D>(&self, density: D)
    where
        D: Density + Send + Sync + 'static,
    {
        self.inner.state.lock().density = Arc::new(density);
        self.request_layout();
    }

    /// Supply natural tile sizes, used by the free-sized lone tile and by
    /// natural-height rows. Triggers a deferred re-layout.
    pub fn set_natural_size_provider<F>(&self, provider: F)
    where
        F: Fn(usize) -> Size + Send + Sync + 'static,
    {
        self.inner.state.lock().natural = Some(Arc::new(provider));
        self.request_layout();
    }

    /// Measure extra non-data tiles after the data-backed ones. Triggers a
    /// deferred re-layout.
    pub fn set_trailing_reserve(&self, reserve: usize) {
        self.inner.state.lock().trailing_reserve = reserve;
        self.request_layout();
    }

    /// Extra non-data tiles currently measured.
    pub fn trailing_reserve(&self) -> usize {
        self.inner.state.lock().trailing_reserve
    }

    /// Total size from the last layout pass.
    pub fn measure_size(&self) -> Size {
        self.inner.state.lock().measure.size
    }

    /// Geometry of tile `index` from the last layout pass, including any
    /// trailing reserve tiles.
    pub fn node_geometry(&self, index: usize) -> Option<Rect> {
        self.inner.state.lock().measure.tiles.get(index).copied()
    }

    /// Number of tiles measured in the last layout pass.
    pub fn measured_tile_count(&self) -> usize {
        self.inner.state.lock().measure.tiles.len()
    }

    /// Run `f` against the node at `index`, if present.
    pub fn with_node<R>(&self, index: usize, f: impl FnOnce(&mut A::Node) -> R) -> Option<R> {
        let mut state = self.inner.state.lock();
        state.slots.get_mut(index).map(|slot| f(&mut slot.value))
    }
}

static_assertions::assert_impl_all!(TileView<crate::model::ListAdapter<String, ()>>: Send, Sync);

impl<A: TileAdapter> Drop for TileViewInner<A> {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if let (Some(adapter), Some(connection)) = (state.adapter.take(), state.connection.take()) {
            adapter.bus().unsubscribe(connection);
        }
        if let Some((queue, id)) = state.scheduler.take() {
            let _ = queue.unregister(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::TileSpacing;
    use crate::model::ListAdapter;

    #[derive(Default, Debug)]
    struct TestNode {
        text: String,
        binds: usize,
    }

    fn adapter(items: &[&str]) -> Arc<ListAdapter<String, TestNode>> {
        Arc::new(ListAdapter::new(
            items.iter().map(|s| s.to_string()).collect(),
            TestNode::default,
            |item: &String, node: &mut TestNode, _| {
                node.text = item.clone();
                node.binds += 1;
            },
        ))
    }

    fn attached(items: &[&str]) -> (TileView<ListAdapter<String, TestNode>>, Arc<ListAdapter<String, TestNode>>) {
        let source = adapter(items);
        let view = TileView::new();
        view.set_available_width(300.0);
        view.set_spacing(TileSpacing::uniform(10.0));
        view.set_adapter(source.clone());
        view.run_layout_pass().unwrap();
        (view, source)
    }

    #[test]
    fn test_attach_builds_all_nodes() {
        let (view, source) = attached(&["a", "b", "c"]);
        assert_eq!(view.visible_node_count(), source.len());
        assert_eq!(view.with_node(1, |n| n.text.clone()), Some("b".into()));
    }

    #[test]
    fn test_events_are_deferred_until_pass() {
        let (view, source) = attached(&["a"]);

        source.push("b".into());
        source.push("c".into());
        // Nothing structural happened yet.
        assert_eq!(view.visible_node_count(), 1);
        assert!(view.needs_layout());

        view.run_layout_pass().unwrap();
        assert_eq!(view.visible_node_count(), 3);
    }

    #[test]
    fn test_insert_preserves_existing_bindings() {
        let (view, source) = attached(&["a", "b"]);
        let binds_before = view.with_node(1, |n| n.binds).unwrap();

        source.insert(0, "x".into()).unwrap();
        view.run_layout_pass().unwrap();

        // The shifted node kept its binding; only the new node was bound.
        assert_eq!(view.with_node(2, |n| (n.text.clone(), n.binds)).unwrap().1, binds_before);
        assert_eq!(view.with_node(0, |n| n.text.clone()), Some("x".into()));
    }

    #[test]
    fn test_changed_rebinds_in_place() {
        let (view, source) = attached(&["a"]);
        source.update(0, |item| *item = "a2".into()).unwrap();
        view.run_layout_pass().unwrap();
        assert_eq!(view.with_node(0, |n| (n.text.clone(), n.binds)), Some(("a2".into(), 2)));
    }

    #[test]
    fn test_reset_supersedes_queued_events() {
        let (view, source) = attached(&["a"]);

        source.push("b".into());
        source.set_items(vec!["x".into(), "y".into(), "z".into()]);
        source.push("w".into());
        view.run_layout_pass().unwrap();

        assert_eq!(view.visible_node_count(), 4);
        assert_eq!(view.with_node(0, |n| n.text.clone()), Some("x".into()));
        assert_eq!(view.with_node(3, |n| n.text.clone()), Some("w".into()));
    }

    #[test]
    fn test_detach_discards_nodes_and_unsubscribes() {
        let (view, source) = attached(&["a", "b"]);
        view.detach();
        assert_eq!(view.visible_node_count(), 0);
        assert_eq!(source.bus().observer_count(), 0);

        // Idempotent.
        view.detach();
    }

    #[test]
    fn test_reattach_detaches_previous_source() {
        let (view, first) = attached(&["a"]);
        let second = adapter(&["x", "y"]);

        view.set_adapter(second.clone());
        view.run_layout_pass().unwrap();

        assert_eq!(first.bus().observer_count(), 0);
        assert_eq!(view.visible_node_count(), 2);
    }

    #[test]
    fn test_scheduler_coalesces_events_into_one_pass() {
        let queue = Arc::new(SharedUpdateQueue::new());
        let source = adapter(&[]);
        let view = TileView::new();
        view.set_available_width(300.0);
        view.connect_scheduler(&queue);
        view.set_adapter(source.clone());

        source.push("a".into());
        source.push("b".into());
        source.push("c".into());

        assert_eq!(queue.run_pending(), 1);
        assert_eq!(view.visible_node_count(), 3);
        assert!(!view.needs_layout());
    }

    #[test]
    fn test_bad_event_schedules_recovery_rebuild() {
        let queue = Arc::new(SharedUpdateQueue::new());
        let source = adapter(&["a", "b"]);
        let view = TileView::new();
        view.set_available_width(300.0);
        view.connect_scheduler(&queue);
        view.set_adapter(source.clone());
        assert_eq!(queue.run_pending(), 1);
        assert_eq!(view.visible_node_count(), 2);

        // A range that does not match the sequence, as from a buggy
        // adapter emitting without mutating.
        source.bus().emit(ChangeEvent::Removed { start: 5, count: 1 });
        assert_eq!(queue.run_pending(), 1);
        assert_eq!(view.visible_node_count(), 0);

        // The failed pass left a recovery rebuild scheduled; the next pump
        // resynchronizes without any further adapter activity.
        assert_eq!(queue.run_pending(), 1);
        assert_eq!(view.visible_node_count(), 2);
        assert!(!view.needs_layout());
        assert_eq!(view.with_node(0, |n| n.text.clone()), Some("a".into()));
    }

    #[test]
    fn test_geometry_after_pass() {
        let (view, _source) = attached(&["a", "b", "c", "d", "e", "f", "g", "h", "i"]);

        let tile = 280.0 / 3.0;
        assert_eq!(view.measured_tile_count(), 9);
        let rect = view.node_geometry(4).unwrap();
        assert!((rect.origin.x - (tile + 10.0)).abs() < 0.01);
        assert!((rect.origin.y - (tile + 10.0)).abs() < 0.01);
        assert!((view.measure_size().height - (3.0 * tile + 20.0)).abs() < 0.01);
    }

    #[test]
    fn test_trailing_reserve_extends_measure() {
        let (view, _source) = attached(&["a", "b"]);
        view.set_trailing_reserve(1);
        view.run_layout_pass().unwrap();

        assert_eq!(view.visible_node_count(), 2);
        assert_eq!(view.measured_tile_count(), 3);
    }

    #[test]
    fn test_dropping_view_unsubscribes() {
        let source = adapter(&["a"]);
        {
            let view = TileView::new();
            view.set_adapter(source.clone());
            assert_eq!(source.bus().observer_count(), 1);
        }
        assert_eq!(source.bus().observer_count(), 0);
    }
}
