//! Logging facilities for Horizon Tessera.
//!
//! Horizon Tessera uses the `tracing` crate for instrumentation. To see
//! logs, install a tracing subscriber in your application:
//!
//! ```ignore
//! use tracing_subscriber;
//!
//! fn main() {
//!     // Initialize tracing (you can customize this)
//!     tracing_subscriber::fmt::init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! All events carry one of the targets below, so subsystems can be filtered
//! with standard `tracing` directives, e.g.
//! `RUST_LOG=horizon_tessera_core::signal=trace`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_tessera_core";
    /// Signal dispatch target.
    pub const SIGNAL: &str = "horizon_tessera_core::signal";
    /// Update queue target.
    pub const UPDATE: &str = "horizon_tessera_core::update";
    /// Model/adapter target (main crate).
    pub const MODEL: &str = "horizon_tessera::model";
    /// View reconciliation target (main crate).
    pub const VIEW: &str = "horizon_tessera::view";
    /// Tiling layout target (main crate).
    pub const LAYOUT: &str = "horizon_tessera::layout";
}
