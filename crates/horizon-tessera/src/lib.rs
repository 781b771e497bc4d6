//! Horizon Tessera - adapter-driven tile grids with incremental
//! reconciliation.
//!
//! Tessera keeps a grid of visual tiles in sync with an ordered data
//! collection. The collection lives in an adapter; every mutation emits a
//! change event; an attached [`TileView`] translates those events into
//! minimal node-tree edits and one deferred layout pass per tick.
//! [`PhotoTileView`] layers a photo cap, an add-more placeholder, and
//! click handling on top.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_tessera::prelude::*;
//!
//! #[derive(Default)]
//! struct Thumb {
//!     url: String,
//! }
//!
//! let photos: PhotoTileView<String, Thumb> =
//!     PhotoTileView::new(Thumb::default, |node: &mut Thumb, item: &String| {
//!         node.url = item.clone();
//!     });
//! photos.view().set_available_width(300.0);
//!
//! let queue = Arc::new(SharedUpdateQueue::new());
//! photos.connect_scheduler(&queue);
//!
//! assert!(photos.add_photo("sunset.jpg".to_string()).is_accepted());
//! queue.run_pending();
//! assert_eq!(photos.photo_count(), 1);
//! ```

pub mod error;
pub mod geometry;
pub mod layout;
pub mod model;
pub mod prelude;
pub mod view;

pub use error::{ContractViolation, Error, Result};
pub use geometry::{Point, Rect, Size};

// The scheduling and signal primitives live in the core crate; re-export
// them so most users need only this one.
pub use horizon_tessera_core::{
    ConnectionId, DispatchReport, SharedUpdateQueue, Signal, UpdateId, UpdateQueue,
};
