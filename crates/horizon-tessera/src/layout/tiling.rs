//! Fixed-column tile placement.
//!
//! `TileLayout` arranges a run of tiles row-major inside a fixed column
//! grid: every tile in the grid branch has the same width, derived from the
//! available width minus inter-tile spacing, and either a fixed aspect
//! ratio or its natural height. A single tile can opt out of the grid
//! entirely and keep its natural size.
//!
//! # Example
//!
//! ```
//! use horizon_tessera::layout::{LogicalDensity, TileLayout};
//! use horizon_tessera::Size;
//!
//! let layout = TileLayout::new();
//! let measure = layout.measure(9, 300.0, &LogicalDensity, &|_| Size::ZERO);
//! assert_eq!(measure.tiles.len(), 9);
//! ```

use crate::error::ContractViolation;
use crate::geometry::{Rect, Size};

use super::density::Density;

/// Inter-tile spacing in density-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSpacing {
    /// Gap between columns.
    pub horizontal: f32,
    /// Gap between rows.
    pub vertical: f32,
}

impl TileSpacing {
    /// Spacing with independent horizontal and vertical gaps.
    pub const fn new(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// The same gap in both directions.
    pub const fn uniform(spacing: f32) -> Self {
        Self::new(spacing, spacing)
    }
}

impl Default for TileSpacing {
    fn default() -> Self {
        Self::uniform(4.0)
    }
}

/// How tiles claim horizontal space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileMode {
    /// Tiles always fill the configured column count.
    Fill,
    /// Grid presentation; column policies such as
    /// [`ColumnRule::SquareForFour`] apply.
    #[default]
    Grid,
}

/// Presentation policy for the effective column count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnRule {
    /// Always use the configured column count.
    #[default]
    Fixed,
    /// Under [`TileMode::Grid`], exactly 4 tiles arrange as a 2x2 square
    /// instead of one full row plus a remainder.
    SquareForFour,
}

/// The effective column count for `node_count` tiles.
///
/// This is presentation policy, separate from the placement formula, so
/// callers can test and override it independently.
pub fn grid_columns(mode: TileMode, rule: ColumnRule, base: usize, node_count: usize) -> usize {
    if mode == TileMode::Grid && rule == ColumnRule::SquareForFour && node_count == 4 {
        2
    } else {
        base
    }
}

/// The result of a measurement pass: overall size plus one rectangle per
/// tile, in tile order.
#[derive(Debug, Clone, PartialEq)]
pub struct TilingMeasure {
    /// Total size occupied by all tiles.
    pub size: Size,
    /// One rectangle per tile, origin-relative, row-major.
    pub tiles: Vec<Rect>,
}

impl TilingMeasure {
    /// A measurement for zero tiles.
    pub fn empty() -> Self {
        Self {
            size: Size::ZERO,
            tiles: Vec::new(),
        }
    }
}

/// Fixed-column tile layout configuration and measurement.
///
/// Column count is validated at configuration time: [`set_columns`] rejects
/// zero so [`measure`] never divides by it unchecked.
///
/// [`set_columns`]: Self::set_columns
/// [`measure`]: Self::measure
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayout {
    /// Configured column count. Always >= 1.
    columns: usize,
    /// Inter-tile spacing, in dp.
    spacing: TileSpacing,
    /// Width-to-height ratio. Positive fixes the aspect; zero or negative
    /// gives each row the natural height of its tallest tile.
    ratio: f32,
    /// Fill or grid presentation.
    mode: TileMode,
    /// When exactly one tile is present, let it keep its natural size
    /// instead of forcing one grid cell.
    single_free: bool,
    /// Column policy applied on top of the configured count.
    column_rule: ColumnRule,
}

impl Default for TileLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl TileLayout {
    /// Create a layout with default settings: 3 columns, grid mode, square
    /// tiles, default spacing.
    pub fn new() -> Self {
        Self {
            columns: 3,
            spacing: TileSpacing::default(),
            ratio: 1.0,
            mode: TileMode::Grid,
            single_free: false,
            column_rule: ColumnRule::Fixed,
        }
    }

    /// Configured column count.
    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Set the column count.
    ///
    /// Rejected with a [`ContractViolation`] when `columns == 0`; the
    /// failure is attributable to the call site instead of surfacing as a
    /// division inside a later measurement pass.
    pub fn set_columns(&mut self, columns: usize) -> Result<(), ContractViolation> {
        if columns == 0 {
            return Err(ContractViolation::InvalidColumnCount);
        }
        self.columns = columns;
        Ok(())
    }

    /// Inter-tile spacing in dp.
    #[inline]
    pub fn spacing(&self) -> TileSpacing {
        self.spacing
    }

    /// Set the inter-tile spacing.
    pub fn set_spacing(&mut self, spacing: TileSpacing) {
        self.spacing = spacing;
    }

    /// Width-to-height ratio.
    #[inline]
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Set the aspect ratio. Positive fixes `height = width / ratio`; zero
    /// or negative uses each tile's natural height.
    pub fn set_ratio(&mut self, ratio: f32) {
        self.ratio = ratio;
    }

    /// Current presentation mode.
    #[inline]
    pub fn mode(&self) -> TileMode {
        self.mode
    }

    /// Set the presentation mode.
    pub fn set_mode(&mut self, mode: TileMode) {
        self.mode = mode;
    }

    /// Whether a lone tile keeps its natural size.
    #[inline]
    pub fn single_free(&self) -> bool {
        self.single_free
    }

    /// Let a lone tile keep its natural size instead of one grid cell.
    pub fn set_single_free(&mut self, single_free: bool) {
        self.single_free = single_free;
    }

    /// Current column policy.
    #[inline]
    pub fn column_rule(&self) -> ColumnRule {
        self.column_rule
    }

    /// Set the column policy.
    pub fn set_column_rule(&mut self, rule: ColumnRule) {
        self.column_rule = rule;
    }

    /// Compute tile geometry for `node_count` tiles in `available_width`
    /// physical pixels.
    ///
    /// `natural` supplies the unconstrained size of the tile at a given
    /// index; it is consulted only for the lone free-sized tile and for
    /// row heights when `ratio <= 0`.
    pub fn measure(
        &self,
        node_count: usize,
        available_width: f32,
        density: &dyn Density,
        natural: &dyn Fn(usize) -> Size,
    ) -> TilingMeasure {
        if node_count == 0 {
            return TilingMeasure::empty();
        }

        // Deliberate carve-out: one tile may float free of the grid.
        if node_count == 1 && self.single_free {
            let size = natural(0);
            return TilingMeasure {
                size,
                tiles: vec![Rect::new(0.0, 0.0, size.width, size.height)],
            };
        }

        let columns = grid_columns(self.mode, self.column_rule, self.columns, node_count);
        let h_spacing = density.dp(self.spacing.horizontal);
        let v_spacing = density.dp(self.spacing.vertical);

        let tile_width =
            ((available_width - h_spacing * (columns as f32 - 1.0)) / columns as f32).max(0.0);

        let mut tiles = Vec::with_capacity(node_count);
        let mut y = 0.0;
        let mut total_width: f32 = 0.0;

        let mut index = 0;
        while index < node_count {
            let row_end = (index + columns).min(node_count);
            let row_height = if self.ratio > 0.0 {
                tile_width / self.ratio
            } else {
                // Natural-height rows take the tallest tile in the row.
                (index..row_end)
                    .map(|i| natural(i).height)
                    .fold(0.0, f32::max)
            };

            for (col, _) in (index..row_end).enumerate() {
                let x = col as f32 * (tile_width + h_spacing);
                tiles.push(Rect::new(x, y, tile_width, row_height));
                total_width = total_width.max(x + tile_width);
            }

            index = row_end;
            y += row_height;
            if index < node_count {
                y += v_spacing;
            }
        }

        TilingMeasure {
            size: Size::new(total_width, y),
            tiles,
        }
    }
}
