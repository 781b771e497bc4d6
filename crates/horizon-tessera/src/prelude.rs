//! Prelude module for Horizon Tessera.
//!
//! Re-exports the most commonly used types for convenient importing:
//!
//! ```
//! use horizon_tessera::prelude::*;
//! ```

// ============================================================================
// Model
// ============================================================================

pub use crate::model::{ChangeBus, ChangeEvent, ListAdapter, TileAdapter};

// ============================================================================
// Views
// ============================================================================

pub use crate::view::{CapacityOutcome, ImageLoader, PhotoTileView, TileView};

// ============================================================================
// Layout and Geometry
// ============================================================================

pub use crate::geometry::{Point, Rect, Size};
pub use crate::layout::{
    ColumnRule, Density, LogicalDensity, ScaledDensity, TileLayout, TileMode, TileSpacing,
};

// ============================================================================
// Scheduling and Errors
// ============================================================================

pub use crate::error::{ContractViolation, Error, Result};
pub use horizon_tessera_core::{DispatchReport, SharedUpdateQueue, UpdateQueue};
