//! Adapters: ordered item collections that drive a tile view.
//!
//! An adapter owns the item sequence, knows how to create and bind visual
//! nodes for its items, and announces every structural mutation through its
//! [`ChangeBus`]. Events go out after the sequence has been edited, never
//! before, so an observer reading [`TileAdapter::len`] during dispatch
//! always sees the post-mutation value. Adapters never touch layout
//! geometry.

use parking_lot::RwLock;
use std::sync::Arc;

use horizon_tessera_core::DispatchReport;

use super::bus::ChangeBus;
use crate::error::ContractViolation;

/// The contract between a data source and the view that renders it.
///
/// # Contract
///
/// - `len()` is always `>= 0` and equals the sequence length once a
///   notification is fully processed.
/// - `create_node` is a pure factory; it must not read per-index state.
/// - `bind_node` applies the item at `index` to the node; the view calls it
///   once per fresh node per visible index, and again whenever that index
///   is reported changed.
/// - Every notification goes out through [`bus`](Self::bus) exactly once,
///   after the backing sequence was mutated to match.
pub trait TileAdapter: Send + Sync {
    /// The visual node type this adapter produces.
    type Node;

    /// Number of items in the sequence.
    fn len(&self) -> usize;

    /// `true` if the sequence holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create a fresh, unbound visual node.
    fn create_node(&self) -> Self::Node;

    /// Apply the item at `index` to `node`.
    fn bind_node(&self, node: &mut Self::Node, index: usize);

    /// The change bus this adapter announces mutations on.
    fn bus(&self) -> &ChangeBus;
}

/// Type alias for a node factory function.
pub type NodeFactory<N> = Arc<dyn Fn() -> N + Send + Sync>;

/// Type alias for a node binder function: `(item, node, index)`.
pub type NodeBinder<T, N> = Arc<dyn Fn(&T, &mut N, usize) + Send + Sync>;

/// A closure-based adapter over a mutable `Vec<T>`.
///
/// `ListAdapter` is the standard concrete adapter: items live in an ordered
/// sequence, the node factory and binder are supplied at construction, and
/// every mutator emits the matching change event exactly once.
///
/// # Example
///
/// ```
/// use horizon_tessera::model::ListAdapter;
///
/// #[derive(Default)]
/// struct Thumb {
///     label: String,
/// }
///
/// let adapter = ListAdapter::new(
///     vec!["a.png".to_string(), "b.png".to_string()],
///     Thumb::default,
///     |item: &String, node: &mut Thumb, _index| {
///         node.label = item.clone();
///     },
/// );
///
/// assert_eq!(adapter.len(), 2);
/// adapter.push("c.png".to_string());
/// assert_eq!(adapter.len(), 3);
/// ```
pub struct ListAdapter<T, N> {
    items: RwLock<Vec<T>>,
    factory: NodeFactory<N>,
    binder: NodeBinder<T, N>,
    bus: ChangeBus,
}

impl<T, N> ListAdapter<T, N>
where
    T: Send + Sync + 'static,
    N: Send + 'static,
{
    /// Creates an adapter over `items` with the given node factory and
    /// binder.
    pub fn new<F, B>(items: Vec<T>, factory: F, binder: B) -> Self
    where
        F: Fn() -> N + Send + Sync + 'static,
        B: Fn(&T, &mut N, usize) + Send + Sync + 'static,
    {
        Self {
            items: RwLock::new(items),
            factory: Arc::new(factory),
            binder: Arc::new(binder),
            bus: ChangeBus::new(),
        }
    }

    /// Creates an empty adapter.
    pub fn empty<F, B>(factory: F, binder: B) -> Self
    where
        F: Fn() -> N + Send + Sync + 'static,
        B: Fn(&T, &mut N, usize) + Send + Sync + 'static,
    {
        Self::new(Vec::new(), factory, binder)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// `true` if there are no items.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Read-only access to the items.
    pub fn items(&self) -> impl std::ops::Deref<Target = Vec<T>> + '_ {
        self.items.read()
    }

    /// Appends an item and emits `Inserted(len - 1, 1)`.
    pub fn push(&self, item: T) -> DispatchReport {
        let index = {
            let mut items = self.items.write();
            items.push(item);
            items.len() - 1
        };
        self.bus.emit(super::ChangeEvent::Inserted {
            start: index,
            count: 1,
        })
    }

    /// Inserts an item at `index` (where `index == len` appends) and emits
    /// `Inserted(index, 1)`.
    ///
    /// Fails fast with a [`ContractViolation`] when `index > len`; the
    /// sequence is left untouched and nothing is emitted.
    pub fn insert(&self, index: usize, item: T) -> Result<DispatchReport, ContractViolation> {
        {
            let mut items = self.items.write();
            if index > items.len() {
                return Err(ContractViolation::IndexOutOfBounds {
                    index,
                    len: items.len(),
                });
            }
            items.insert(index, item);
        }
        Ok(self.bus.emit(super::ChangeEvent::Inserted {
            start: index,
            count: 1,
        }))
    }

    /// Inserts several items at `index` and emits one
    /// `Inserted(index, items.len())`. Inserting an empty batch is a no-op.
    pub fn insert_all(
        &self,
        index: usize,
        batch: Vec<T>,
    ) -> Result<DispatchReport, ContractViolation> {
        if batch.is_empty() {
            return Ok(DispatchReport::default());
        }
        let count = batch.len();
        {
            let mut items = self.items.write();
            if index > items.len() {
                return Err(ContractViolation::IndexOutOfBounds {
                    index,
                    len: items.len(),
                });
            }
            items.splice(index..index, batch);
        }
        Ok(self.bus.emit(super::ChangeEvent::Inserted {
            start: index,
            count,
        }))
    }

    /// Appends several items, emitting one `Inserted` for the whole batch.
    pub fn extend(&self, batch: Vec<T>) -> DispatchReport {
        if batch.is_empty() {
            return DispatchReport::default();
        }
        let (start, count) = {
            let mut items = self.items.write();
            let start = items.len();
            let count = batch.len();
            items.extend(batch);
            (start, count)
        };
        self.bus.emit(super::ChangeEvent::Inserted { start, count })
    }

    /// Removes and returns the item at `index`, emitting
    /// `Removed(index, 1)`.
    pub fn remove(&self, index: usize) -> Result<(T, DispatchReport), ContractViolation> {
        let item = {
            let mut items = self.items.write();
            if index >= items.len() {
                return Err(ContractViolation::IndexOutOfBounds {
                    index,
                    len: items.len(),
                });
            }
            items.remove(index)
        };
        let report = self.bus.emit(super::ChangeEvent::Removed {
            start: index,
            count: 1,
        });
        Ok((item, report))
    }

    /// Removes `count` items starting at `start`, emitting one `Removed`.
    pub fn remove_range(
        &self,
        start: usize,
        count: usize,
    ) -> Result<(Vec<T>, DispatchReport), ContractViolation> {
        if count == 0 {
            return Err(ContractViolation::EmptyRange);
        }
        let removed = {
            let mut items = self.items.write();
            let len = items.len();
            if start.checked_add(count).is_none_or(|end| end > len) {
                return Err(ContractViolation::RangeOutOfBounds { start, count, len });
            }
            items.drain(start..start + count).collect()
        };
        let report = self.bus.emit(super::ChangeEvent::Removed { start, count });
        Ok((removed, report))
    }

    /// Mutates the item at `index` in place and emits `Changed(index, 1)`.
    pub fn update<F, R>(&self, index: usize, f: F) -> Result<(R, DispatchReport), ContractViolation>
    where
        F: FnOnce(&mut T) -> R,
    {
        let result = {
            let mut items = self.items.write();
            let len = items.len();
            let Some(item) = items.get_mut(index) else {
                return Err(ContractViolation::IndexOutOfBounds { index, len });
            };
            f(item)
        };
        let report = self.bus.emit(super::ChangeEvent::Changed {
            start: index,
            count: 1,
        });
        Ok((result, report))
    }

    /// Relocates the block `[from, from + count)` so it starts at index
    /// `to` of the resulting sequence, emitting one `Moved`.
    pub fn move_range(
        &self,
        from: usize,
        to: usize,
        count: usize,
    ) -> Result<DispatchReport, ContractViolation> {
        if count == 0 {
            return Err(ContractViolation::EmptyRange);
        }
        if from == to {
            return Err(ContractViolation::MoveToSelf { index: from });
        }
        {
            let mut items = self.items.write();
            let len = items.len();
            if from.checked_add(count).is_none_or(|end| end > len) {
                return Err(ContractViolation::RangeOutOfBounds {
                    start: from,
                    count,
                    len,
                });
            }
            if to.checked_add(count).is_none_or(|end| end > len) {
                return Err(ContractViolation::RangeOutOfBounds {
                    start: to,
                    count,
                    len,
                });
            }
            let block: Vec<T> = items.drain(from..from + count).collect();
            items.splice(to..to, block);
        }
        Ok(self.bus.emit(super::ChangeEvent::Moved { from, to, count }))
    }

    /// Replaces all items and emits a `Reset`.
    pub fn set_items(&self, items: Vec<T>) -> DispatchReport {
        *self.items.write() = items;
        self.bus.reset()
    }

    /// Removes all items and emits a `Reset`.
    pub fn clear(&self) -> DispatchReport {
        self.items.write().clear();
        self.bus.reset()
    }
}

impl<T, N> TileAdapter for ListAdapter<T, N>
where
    T: Send + Sync + 'static,
    N: Send + Sync + 'static,
{
    type Node = N;

    fn len(&self) -> usize {
        self.items.read().len()
    }

    fn create_node(&self) -> N {
        (self.factory)()
    }

    fn bind_node(&self, node: &mut N, index: usize) {
        let items = self.items.read();
        if let Some(item) = items.get(index) {
            (self.binder)(item, node, index);
        } else {
            // A bind against a stale index means the caller skipped a
            // notification; loud but non-fatal.
            tracing::warn!(
                target: "horizon_tessera::model",
                index,
                len = items.len(),
                "bind_node called with out-of-range index"
            );
        }
    }

    fn bus(&self) -> &ChangeBus {
        &self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChangeEvent;
    use parking_lot::Mutex;

    #[derive(Default, Debug, PartialEq)]
    struct TestNode {
        text: String,
        bound_at: Option<usize>,
    }

    fn test_adapter(items: Vec<String>) -> ListAdapter<String, TestNode> {
        ListAdapter::new(items, TestNode::default, |item, node, index| {
            node.text = item.clone();
            node.bound_at = Some(index);
        })
    }

    fn record_events(adapter: &ListAdapter<String, TestNode>) -> Arc<Mutex<Vec<ChangeEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        adapter.bus().subscribe(move |event| sink.lock().push(*event));
        events
    }

    #[test]
    fn test_push_emits_after_mutation() {
        let adapter = Arc::new(test_adapter(vec!["a".into()]));

        // The observer must see the post-mutation count.
        let observed_len = Arc::new(Mutex::new(0));
        let observed = observed_len.clone();
        let probe = adapter.clone();
        adapter.bus().subscribe(move |_| {
            *observed.lock() = probe.len();
        });

        adapter.push("b".into());
        assert_eq!(*observed_len.lock(), 2);
    }

    #[test]
    fn test_insert_and_remove_events() {
        let adapter = test_adapter(vec!["a".into(), "c".into()]);
        let events = record_events(&adapter);

        adapter.insert(1, "b".into()).unwrap();
        let (removed, _) = adapter.remove(0).unwrap();

        assert_eq!(removed, "a");
        assert_eq!(*adapter.items(), vec!["b".to_string(), "c".to_string()]);
        assert_eq!(
            *events.lock(),
            vec![
                ChangeEvent::Inserted { start: 1, count: 1 },
                ChangeEvent::Removed { start: 0, count: 1 },
            ]
        );
    }

    #[test]
    fn test_insert_past_end_fails_fast() {
        let adapter = test_adapter(vec!["a".into()]);
        let events = record_events(&adapter);

        let err = adapter.insert(2, "x".into()).unwrap_err();
        assert_eq!(err, ContractViolation::IndexOutOfBounds { index: 2, len: 1 });

        // No mutation, no event: the range was rejected, not clamped.
        assert_eq!(adapter.len(), 1);
        assert!(events.lock().is_empty());
    }

    #[test]
    fn test_remove_range_validation() {
        let adapter = test_adapter(vec!["a".into(), "b".into(), "c".into()]);
        assert!(adapter.remove_range(2, 2).is_err());
        assert!(adapter.remove_range(0, 0).is_err());

        let (removed, _) = adapter.remove_range(0, 2).unwrap();
        assert_eq!(removed, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(*adapter.items(), vec!["c".to_string()]);
    }

    #[test]
    fn test_move_range() {
        let adapter = test_adapter(vec!["a".into(), "b".into(), "c".into(), "d".into()]);
        let events = record_events(&adapter);

        adapter.move_range(0, 2, 2).unwrap();
        assert_eq!(
            *adapter.items(),
            vec![
                "c".to_string(),
                "d".to_string(),
                "a".to_string(),
                "b".to_string()
            ]
        );
        assert_eq!(
            *events.lock(),
            vec![ChangeEvent::Moved {
                from: 0,
                to: 2,
                count: 2
            }]
        );

        assert!(adapter.move_range(1, 1, 1).is_err());
        assert!(adapter.move_range(3, 0, 2).is_err());
    }

    #[test]
    fn test_update_emits_changed() {
        let adapter = test_adapter(vec!["a".into()]);
        let events = record_events(&adapter);

        adapter.update(0, |item| item.push('!')).unwrap();
        assert_eq!(*adapter.items(), vec!["a!".to_string()]);
        assert_eq!(
            *events.lock(),
            vec![ChangeEvent::Changed { start: 0, count: 1 }]
        );

        assert!(adapter.update(5, |_| ()).is_err());
    }

    #[test]
    fn test_set_items_resets() {
        let adapter = test_adapter(vec!["a".into()]);
        let events = record_events(&adapter);

        adapter.set_items(vec!["x".into(), "y".into()]);
        adapter.clear();

        assert_eq!(*events.lock(), vec![ChangeEvent::Reset, ChangeEvent::Reset]);
        assert!(adapter.is_empty());
    }

    #[test]
    fn test_bind_node_applies_item() {
        let adapter = test_adapter(vec!["a".into(), "b".into()]);
        let mut node = adapter.create_node();
        adapter.bind_node(&mut node, 1);
        assert_eq!(node.text, "b");
        assert_eq!(node.bound_at, Some(1));
    }

    #[test]
    fn test_extend_emits_single_batch_event() {
        let adapter = test_adapter(vec!["a".into()]);
        let events = record_events(&adapter);

        adapter.extend(vec!["b".into(), "c".into()]);
        adapter.extend(Vec::new());

        assert_eq!(
            *events.lock(),
            vec![ChangeEvent::Inserted { start: 1, count: 2 }]
        );
    }
}
