//! Density-independent pixel conversion.
//!
//! Spacing constants are expressed in density-independent pixels (dp) so a
//! layout reads the same at any display scale. The platform layer supplies
//! the conversion; tests use [`LogicalDensity`] where 1 dp == 1 px.

/// Converts density-independent pixels to physical pixels.
pub trait Density {
    /// Convert `value` dp to physical pixels.
    fn dp(&self, value: f32) -> f32;
}

/// The identity conversion: 1 dp == 1 px.
///
/// The default for headless use and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LogicalDensity;

impl Density for LogicalDensity {
    fn dp(&self, value: f32) -> f32 {
        value
    }
}

/// A uniform scale factor, e.g. `2.0` for a @2x display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledDensity(pub f32);

impl Density for ScaledDensity {
    fn dp(&self, value: f32) -> f32 {
        value * self.0
    }
}
