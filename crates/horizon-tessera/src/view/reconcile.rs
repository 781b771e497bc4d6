//! Incremental node-tree edits derived from change events.
//!
//! The reconciliation step is deliberately pure: it rewrites a `Vec` of
//! [`Slot`]s to mirror the post-event item sequence and marks which slots
//! need a fresh bind, without touching the adapter or the layout. The view
//! runs it once per layout pass, applying queued events in arrival order,
//! then binds every dirty slot at its final index.

use crate::error::ContractViolation;
use crate::model::ChangeEvent;

/// One visual node position in the tree.
///
/// `needs_bind` survives relocation: a node shifted by an insert or a move
/// keeps its binding, only freshly created or explicitly changed slots are
/// re-bound.
#[derive(Debug)]
pub struct Slot<T> {
    /// The visual node occupying this position.
    pub value: T,
    /// Whether the next bind pass must re-apply the backing item.
    pub needs_bind: bool,
}

impl<T> Slot<T> {
    /// A freshly created slot, pending its first bind.
    pub fn fresh(value: T) -> Self {
        Self {
            value,
            needs_bind: true,
        }
    }
}

/// Apply one structural event to the slot vector.
///
/// `make` produces a fresh node for each inserted position.
///
/// - `Reset` discards every slot; the caller rebuilds from the adapter.
/// - `Changed` marks the range dirty without structural change.
/// - `Inserted` splices fresh slots at `start`; slots after the range keep
///   their bindings while their indices shift.
/// - `Removed` drains the range, dropping the nodes.
/// - `Moved` relocates the block without recreating any node.
///
/// Ranges are validated against the current slot count and fail fast; a
/// bad range indicates index drift between adapter and view, which
/// clamping would hide.
///
/// [`Reset`]: ChangeEvent::Reset
pub fn apply_event<T>(
    slots: &mut Vec<Slot<T>>,
    event: &ChangeEvent,
    make: &mut dyn FnMut() -> T,
) -> Result<(), ContractViolation> {
    let len = slots.len();
    match *event {
        ChangeEvent::Reset => {
            slots.clear();
        }
        ChangeEvent::Changed { start, count } => {
            check_range(start, count, len)?;
            for slot in &mut slots[start..start + count] {
                slot.needs_bind = true;
            }
        }
        ChangeEvent::Inserted { start, count } => {
            if start > len {
                return Err(ContractViolation::IndexOutOfBounds { index: start, len });
            }
            slots.splice(start..start, (0..count).map(|_| Slot::fresh(make())));
        }
        ChangeEvent::Removed { start, count } => {
            check_range(start, count, len)?;
            slots.drain(start..start + count);
        }
        ChangeEvent::Moved { from, to, count } => {
            check_range(from, count, len)?;
            if to.checked_add(count).is_none_or(|end| end > len) {
                return Err(ContractViolation::RangeOutOfBounds {
                    start: to,
                    count,
                    len,
                });
            }
            let block: Vec<Slot<T>> = slots.drain(from..from + count).collect();
            slots.splice(to..to, block);
        }
    }
    Ok(())
}

fn check_range(start: usize, count: usize, len: usize) -> Result<(), ContractViolation> {
    if start.checked_add(count).is_none_or(|end| end > len) {
        Err(ContractViolation::RangeOutOfBounds { start, count, len })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound_slots(ids: &[u32]) -> Vec<Slot<u32>> {
        ids.iter()
            .map(|&id| Slot {
                value: id,
                needs_bind: false,
            })
            .collect()
    }

    fn values<T: Copy>(slots: &[Slot<T>]) -> Vec<T> {
        slots.iter().map(|s| s.value).collect()
    }

    fn dirty(slots: &[Slot<u32>]) -> Vec<bool> {
        slots.iter().map(|s| s.needs_bind).collect()
    }

    #[test]
    fn test_insert_keeps_later_bindings() {
        let mut slots = bound_slots(&[10, 20, 30]);
        let mut next = 100;
        let mut make = || {
            next += 1;
            next
        };

        apply_event(
            &mut slots,
            &ChangeEvent::Inserted { start: 1, count: 2 },
            &mut make,
        )
        .unwrap();

        assert_eq!(values(&slots), vec![10, 101, 102, 20, 30]);
        // Shifted slots stay clean; only the fresh ones need binding.
        assert_eq!(dirty(&slots), vec![false, true, true, false, false]);
    }

    #[test]
    fn test_insert_then_remove_round_trips() {
        let mut slots = bound_slots(&[1, 2, 3, 4]);
        let mut make = || 99;

        apply_event(
            &mut slots,
            &ChangeEvent::Inserted { start: 2, count: 2 },
            &mut make,
        )
        .unwrap();
        apply_event(
            &mut slots,
            &ChangeEvent::Removed { start: 2, count: 2 },
            &mut make,
        )
        .unwrap();

        assert_eq!(values(&slots), vec![1, 2, 3, 4]);
        assert_eq!(dirty(&slots), vec![false; 4]);
    }

    #[test]
    fn test_changed_marks_without_restructuring() {
        let mut slots = bound_slots(&[1, 2, 3]);
        apply_event(
            &mut slots,
            &ChangeEvent::Changed { start: 1, count: 2 },
            &mut || 0,
        )
        .unwrap();

        assert_eq!(values(&slots), vec![1, 2, 3]);
        assert_eq!(dirty(&slots), vec![false, true, true]);
    }

    #[test]
    fn test_moved_relocates_without_recreating() {
        let mut slots = bound_slots(&[1, 2, 3, 4, 5]);
        apply_event(
            &mut slots,
            &ChangeEvent::Moved {
                from: 0,
                to: 3,
                count: 2,
            },
            &mut || 0,
        )
        .unwrap();

        assert_eq!(values(&slots), vec![3, 4, 5, 1, 2]);
        assert_eq!(dirty(&slots), vec![false; 5]);
    }

    #[test]
    fn test_out_of_range_fails_fast() {
        let mut slots = bound_slots(&[1, 2]);

        let err = apply_event(
            &mut slots,
            &ChangeEvent::Removed { start: 1, count: 2 },
            &mut || 0,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ContractViolation::RangeOutOfBounds {
                start: 1,
                count: 2,
                len: 2
            }
        );

        assert!(apply_event(
            &mut slots,
            &ChangeEvent::Inserted { start: 3, count: 1 },
            &mut || 0,
        )
        .is_err());

        // Nothing was clamped or partially applied.
        assert_eq!(values(&slots), vec![1, 2]);
    }

    #[test]
    fn test_reset_clears_all() {
        let mut slots = bound_slots(&[1, 2, 3]);
        apply_event(&mut slots, &ChangeEvent::Reset, &mut || 0).unwrap();
        assert!(slots.is_empty());
    }
}
