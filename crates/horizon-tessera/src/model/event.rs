//! Structural change events.
//!
//! A [`ChangeEvent`] describes one mutation of an adapter's ordered item
//! sequence. Item identity is positional: events talk about index ranges,
//! never item values.

use crate::error::ContractViolation;

/// One structural mutation of an ordered item sequence.
///
/// All ranged variants cover at least one item and `Moved` always relocates
/// the block; use the checked constructors to build events that uphold
/// those invariants. Bounds against the actual sequence length are checked
/// where the length is known: at emission time by the adapter and at
/// application time by the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    /// The whole sequence changed; observers rebuild from scratch.
    Reset,
    /// Items in `[start, start + count)` changed in place.
    Changed { start: usize, count: usize },
    /// `count` items were inserted at `start`.
    Inserted { start: usize, count: usize },
    /// Items in `[start, start + count)` were removed.
    Removed { start: usize, count: usize },
    /// The block `[from, from + count)` was extracted and reinserted so it
    /// starts at index `to` of the resulting sequence.
    Moved {
        from: usize,
        to: usize,
        count: usize,
    },
}

impl ChangeEvent {
    /// A checked `Changed` event. Fails when `count == 0`.
    pub fn changed(start: usize, count: usize) -> Result<Self, ContractViolation> {
        Self::require_count(count)?;
        Ok(Self::Changed { start, count })
    }

    /// A checked `Inserted` event. Fails when `count == 0`.
    pub fn inserted(start: usize, count: usize) -> Result<Self, ContractViolation> {
        Self::require_count(count)?;
        Ok(Self::Inserted { start, count })
    }

    /// A checked `Removed` event. Fails when `count == 0`.
    pub fn removed(start: usize, count: usize) -> Result<Self, ContractViolation> {
        Self::require_count(count)?;
        Ok(Self::Removed { start, count })
    }

    /// A checked `Moved` event. Fails when `count == 0` or `from == to`.
    pub fn moved(from: usize, to: usize, count: usize) -> Result<Self, ContractViolation> {
        Self::require_count(count)?;
        if from == to {
            return Err(ContractViolation::MoveToSelf { index: from });
        }
        Ok(Self::Moved { from, to, count })
    }

    /// `true` for events that change the node tree shape (everything except
    /// `Changed`).
    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::Changed { .. })
    }

    fn require_count(count: usize) -> Result<(), ContractViolation> {
        if count == 0 {
            Err(ContractViolation::EmptyRange)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_count_rejected() {
        assert_eq!(
            ChangeEvent::changed(0, 0),
            Err(ContractViolation::EmptyRange)
        );
        assert_eq!(
            ChangeEvent::inserted(3, 0),
            Err(ContractViolation::EmptyRange)
        );
        assert_eq!(
            ChangeEvent::removed(0, 0),
            Err(ContractViolation::EmptyRange)
        );
        assert_eq!(
            ChangeEvent::moved(0, 1, 0),
            Err(ContractViolation::EmptyRange)
        );
    }

    #[test]
    fn test_move_to_self_rejected() {
        assert_eq!(
            ChangeEvent::moved(2, 2, 1),
            Err(ContractViolation::MoveToSelf { index: 2 })
        );
    }

    #[test]
    fn test_structural_classification() {
        assert!(ChangeEvent::Reset.is_structural());
        assert!(ChangeEvent::inserted(0, 1).unwrap().is_structural());
        assert!(ChangeEvent::removed(0, 1).unwrap().is_structural());
        assert!(ChangeEvent::moved(0, 1, 1).unwrap().is_structural());
        assert!(!ChangeEvent::changed(0, 1).unwrap().is_structural());
    }
}
