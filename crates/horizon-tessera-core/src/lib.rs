//! Core systems for Horizon Tessera.
//!
//! This crate provides the foundational components of the Horizon Tessera
//! tile reconciliation engine:
//!
//! - **Signal System**: Typed, ordered publish/subscribe dispatch with
//!   per-observer failure isolation
//! - **Update Queue**: Deduplicating once-per-tick scheduling for deferred
//!   rebuilds
//! - **Logging**: `tracing` targets for subsystem filtering
//!
//! # Signal Example
//!
//! ```
//! use horizon_tessera_core::Signal;
//!
//! let count_changed = Signal::<usize>::new();
//!
//! let conn_id = count_changed.connect(|count| {
//!     println!("count is now {}", count);
//! });
//!
//! let report = count_changed.emit(&3);
//! assert!(report.is_clean());
//!
//! count_changed.disconnect(conn_id);
//! ```
//!
//! # Update Queue Example
//!
//! ```
//! use horizon_tessera_core::UpdateQueue;
//!
//! let mut queue = UpdateQueue::new();
//! let rebuild = queue.register(|| { /* rebuild the tile tree */ });
//!
//! // Any number of notifications within a tick...
//! queue.schedule(rebuild).unwrap();
//! queue.schedule(rebuild).unwrap();
//!
//! // ...collapse into a single run.
//! assert_eq!(queue.run_pending(), 1);
//! ```

mod error;
pub mod logging;
mod scheduler;
mod signal;

pub use error::{CoreError, ObserverError, Result, UpdateError};
pub use scheduler::{SharedUpdateQueue, UpdateId, UpdateQueue};
pub use signal::{ConnectionId, DispatchReport, Signal, SlotResult};
