//! # Formgrid Layout
//!
//! Logical grid layout engine for form containers.
//!
//! A container declares how many logical columns and rows it has; every widget
//! inside it asks for a span of cells and a weight. The engine assigns each
//! widget a non-overlapping block of cells and converts the grid into pixel
//! rectangles.
//!
//! ## Design Goals
//!
//! 1. **Placement never fails**: conflicting or oversized requests relocate or
//!    grow the grid instead of erroring
//! 2. **Deterministic**: identical inputs give identical rectangles
//! 3. **Narrow seams**: widgets are only seen through [`GridCell`] and the
//!    [`Measurer`] trait
//! 4. **Bounded cost**: exactly two measurement passes (width, then height)
//!
//! ## Modules
//!
//! - [`cell`]: placement requests ([`GridCell`], [`Weight`])
//! - [`cursor`]: row-major / column-major coordinate walker
//! - [`matrix`]: occupancy bookkeeping and auto-placement
//! - [`resolver`]: column width / row height resolution and rectangles
//! - [`layout`]: the per-pass orchestrator
//! - [`measure`] and [`cache`]: the preferred-size seam and its memoization
//! - [`debug`]: diagnostic overlays

pub mod cache;
pub mod cell;
pub mod cursor;
pub mod debug;
pub mod layout;
pub mod matrix;
pub mod measure;
pub mod resolver;

pub use cache::{CacheStats, CachingMeasurer};
pub use cell::{GridCell, Orientation, Weight, WidgetId};
pub use cursor::{CellIndex, PlacementCursor};
pub use debug::{CellBoundsOverlay, OverlayCell};
pub use layout::{BoundsSink, CellRect, LayoutParams, LayoutPhase, LayoutResult, LogicalGridLayout};
pub use matrix::{OccupancyMatrix, Placement, PlacementConflict, Slot};
pub use measure::{MeasureError, Measurer, SizeHints};
pub use resolver::{Axis, GridSizeResolver, ResolvedGrid, SizedItem, TrackSizes};

use serde::{Deserialize, Serialize};

/// Upper bound for any single column width or row height, in pixels.
pub const MAX_TRACK_SIZE: i32 = 10240;

/// Upper bound for the end of any explicit origin plus span, per axis.
///
/// Requests past it are auto-placed and reported as a conflict.
pub const MAX_GRID_TRACKS: usize = 4096;

/// A rectangle in container pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether the two rectangles share any area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Clamp both dimensions at zero.
    pub fn non_negative(self) -> Self {
        Self {
            width: self.width.max(0),
            height: self.height.max(0),
        }
    }
}
