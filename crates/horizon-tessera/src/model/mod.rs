//! The data side of the model/view split: change events, the bus that
//! carries them, and the adapters that own item sequences.
//!
//! Views never poll an adapter. They subscribe to its [`ChangeBus`] and
//! apply each [`ChangeEvent`] incrementally, which keeps a thousand-item
//! collection as cheap to update as a ten-item one.

mod adapter;
mod bus;
mod event;

pub use adapter::{ListAdapter, NodeBinder, NodeFactory, TileAdapter};
pub use bus::ChangeBus;
pub use event::ChangeEvent;
