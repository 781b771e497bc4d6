//! Tile geometry: pure measurement with no view or model dependencies.
//!
//! Everything in this module is a function of its inputs. Given a node
//! count, an available width, and a [`TileLayout`] configuration, the
//! same tile rectangles come out every time, which is what makes the
//! geometry testable without a view tree.

mod density;
mod tiling;

pub use density::{Density, LogicalDensity, ScaledDensity};
pub use tiling::{
    grid_columns, ColumnRule, TileLayout, TileMode, TileSpacing, TilingMeasure,
};
