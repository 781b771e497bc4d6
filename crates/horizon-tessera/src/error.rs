//! Error types for the tile reconciliation engine.

use horizon_tessera_core::{DispatchReport, ObserverError};

/// Result type alias for tessera operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A broken caller contract: bad index ranges, malformed events, invalid
/// configuration.
///
/// Contract violations fail fast with a descriptive error and are never
/// silently clamped; clamping hides index-drift bugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContractViolation {
    /// An index argument is outside the valid range.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A range argument does not fit within the sequence.
    #[error("range starting at {start} with count {count} out of bounds for length {len}")]
    RangeOutOfBounds {
        start: usize,
        count: usize,
        len: usize,
    },

    /// Ranged change events must cover at least one item.
    #[error("ranged change events must cover at least one item")]
    EmptyRange,

    /// A move must relocate the block; source and destination may not match.
    #[error("moved event requires distinct source and destination (both {index})")]
    MoveToSelf { index: usize },

    /// Tiling requires at least one column.
    #[error("column count must be at least 1")]
    InvalidColumnCount,
}

/// Errors that can occur while driving the reconciliation engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A caller contract was violated.
    #[error(transparent)]
    Contract(#[from] ContractViolation),

    /// One or more observers failed during change dispatch.
    ///
    /// Delivery to the remaining observers still happened; this error only
    /// surfaces what went wrong.
    #[error("{failed} of {delivered} observers failed during dispatch; first: {first}")]
    ObserverFailure {
        delivered: usize,
        failed: usize,
        first: ObserverError,
    },
}

impl Error {
    /// Extracts an `ObserverFailure` from a dispatch report, if any observer
    /// failed. A clean report yields `None`.
    pub fn from_report(report: DispatchReport) -> Option<Self> {
        if report.is_clean() {
            return None;
        }
        let delivered = report.delivered;
        let failed = report.failures.len();
        let first = report.failures.into_iter().next().map(|(_, err)| err)?;
        Some(Self::ObserverFailure {
            delivered,
            failed,
            first,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_violation_display() {
        let err = ContractViolation::RangeOutOfBounds {
            start: 5,
            count: 2,
            len: 6,
        };
        assert_eq!(
            err.to_string(),
            "range starting at 5 with count 2 out of bounds for length 6"
        );
    }

    #[test]
    fn test_from_clean_report() {
        let report = DispatchReport::default();
        assert!(Error::from_report(report).is_none());
    }
}
