//! The view side: node-tree reconciliation and the tile views built on it.

mod container;
mod photo;
mod reconcile;

pub use container::TileView;
pub use photo::{CapacityOutcome, ImageLoader, PhotoTileView};
pub use reconcile::{apply_event, Slot};
