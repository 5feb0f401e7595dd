//! The per-pass orchestrator.
//!
//! A pass always starts from scratch:
//!
//! ```text
//! Idle -> Collecting -> Placing -> MeasuringWidths -> ResolvingWidths
//!      -> MeasuringHeights -> ResolvingHeights -> Emitting -> Idle
//! ```
//!
//! Heights are measured a second time with the resolved column width as a
//! hint so wrapping content can report its real height. Widths are never
//! revisited, so a pass calls the measurer at most twice per widget.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::cell::{GridCell, Orientation, WidgetId};
use crate::cursor::CellIndex;
use crate::matrix::{self, OccupancyMatrix, Placement, PlacementConflict, Slot};
use crate::measure::{Measurer, SizeHints};
use crate::resolver::{self, Axis, GridSizeResolver, TrackSizes};
use crate::{Rect, Size};

/// Per-container grid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    /// Declared logical columns; `0` is treated as `1`.
    pub column_count: usize,
    /// Declared logical rows; may be `0` and grow during placement.
    pub row_count: usize,
    /// Horizontal gap between columns, in pixels.
    pub h_gap: i32,
    /// Vertical gap between rows, in pixels.
    pub v_gap: i32,
    pub orientation: Orientation,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            column_count: 1,
            row_count: 0,
            h_gap: 0,
            v_gap: 0,
            orientation: Orientation::Horizontal,
        }
    }
}

impl LayoutParams {
    /// Clamp values that cannot be laid out.
    ///
    /// The axis auto placement does not grow must have at least one track.
    fn normalized(self) -> Self {
        let mut params = self;
        params.column_count = params.column_count.max(1);
        if params.orientation == Orientation::Vertical {
            params.row_count = params.row_count.max(1);
        }
        params.h_gap = params.h_gap.max(0);
        params.v_gap = params.v_gap.max(0);
        params
    }
}

/// Steps of a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutPhase {
    Idle,
    Collecting,
    Placing,
    MeasuringWidths,
    ResolvingWidths,
    MeasuringHeights,
    ResolvingHeights,
    Emitting,
}

impl LayoutPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutPhase::Idle => "idle",
            LayoutPhase::Collecting => "collecting",
            LayoutPhase::Placing => "placing",
            LayoutPhase::MeasuringWidths => "measuring_widths",
            LayoutPhase::ResolvingWidths => "resolving_widths",
            LayoutPhase::MeasuringHeights => "measuring_heights",
            LayoutPhase::ResolvingHeights => "resolving_heights",
            LayoutPhase::Emitting => "emitting",
        }
    }

    /// The phase that follows this one.
    pub fn next(&self) -> LayoutPhase {
        match self {
            LayoutPhase::Idle => LayoutPhase::Collecting,
            LayoutPhase::Collecting => LayoutPhase::Placing,
            LayoutPhase::Placing => LayoutPhase::MeasuringWidths,
            LayoutPhase::MeasuringWidths => LayoutPhase::ResolvingWidths,
            LayoutPhase::ResolvingWidths => LayoutPhase::MeasuringHeights,
            LayoutPhase::MeasuringHeights => LayoutPhase::ResolvingHeights,
            LayoutPhase::ResolvingHeights => LayoutPhase::Emitting,
            LayoutPhase::Emitting => LayoutPhase::Idle,
        }
    }
}

impl fmt::Display for LayoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final geometry of one widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRect {
    pub widget: WidgetId,
    pub rect: Rect,
    /// Grid column.
    pub x: usize,
    /// Grid row.
    pub y: usize,
    pub span_x: usize,
    pub span_y: usize,
}

impl CellRect {
    fn new(placement: &Placement, rect: Rect) -> Self {
        Self {
            widget: placement.widget,
            rect,
            x: placement.x,
            y: placement.y,
            span_x: placement.span_x,
            span_y: placement.span_y,
        }
    }

    pub fn placement(&self) -> Placement {
        Placement {
            widget: self.widget,
            x: self.x,
            y: self.y,
            span_x: self.span_x,
            span_y: self.span_y,
        }
    }
}

/// Receives computed bounds, typically the widget layer.
pub trait BoundsSink {
    fn set_bounds(&mut self, widget: WidgetId, rect: Rect);
}

impl BoundsSink for HashMap<WidgetId, Rect> {
    fn set_bounds(&mut self, widget: WidgetId, rect: Rect) {
        self.insert(widget, rect);
    }
}

impl BoundsSink for Vec<(WidgetId, Rect)> {
    fn set_bounds(&mut self, widget: WidgetId, rect: Rect) {
        self.push((widget, rect));
    }
}

/// Output of one layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    /// One entry per input cell, in input order.
    pub rects: Vec<CellRect>,
    pub columns: TrackSizes,
    pub rows: TrackSizes,
    /// Constraint conflicts resolved during placement.
    pub conflicts: Vec<PlacementConflict>,
    /// Cells the auto placement search skipped.
    placeholders: Vec<CellIndex>,
}

impl LayoutResult {
    pub fn column_widths(&self) -> &[i32] {
        &self.columns.sizes
    }

    pub fn row_heights(&self) -> &[i32] {
        &self.rows.sizes
    }

    /// Final column count, after any auto-expansion.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Final row count, after any auto-expansion.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn rect_for(&self, widget: WidgetId) -> Option<Rect> {
        self.rects.iter().find(|r| r.widget == widget).map(|r| r.rect)
    }

    pub fn placements(&self) -> impl Iterator<Item = Placement> + '_ {
        self.rects.iter().map(CellRect::placement)
    }

    /// Pixel bounds of every logical cell, indexed `[row][column]`.
    pub fn cell_bounds(&self) -> Vec<Vec<Rect>> {
        (0..self.row_count())
            .map(|row| {
                (0..self.column_count())
                    .map(|column| {
                        Rect::new(
                            self.columns.positions[column],
                            self.rows.positions[row],
                            self.columns.sizes[column],
                            self.rows.sizes[row],
                        )
                    })
                    .collect()
            })
            .collect()
    }

    /// Size the grid wants: intrinsic tracks plus gaps.
    pub fn preferred_size(&self) -> Size {
        Size::new(self.columns.intrinsic_total(), self.rows.intrinsic_total())
    }

    /// Size the grid actually covers.
    pub fn used_size(&self) -> Size {
        Size::new(self.columns.total(), self.rows.total())
    }

    /// Occupancy matrix as it stood after placement, rendered on demand.
    pub fn matrix_debug_string(&self) -> String {
        let mut slots: HashMap<(usize, usize), Slot> = self
            .placeholders
            .iter()
            .map(|index| ((index.x, index.y), Slot::Placeholder))
            .collect();
        for p in self.placements() {
            for x in p.x..p.end_x() {
                for y in p.y..p.end_y() {
                    slots.insert((x, y), Slot::Occupied(p.widget));
                }
            }
        }
        matrix::render_slots(self.column_count(), self.row_count(), |x, y| slots.get(&(x, y)).copied())
    }

    /// Hand every rectangle to `sink`, in input order.
    pub fn apply(&self, sink: &mut impl BoundsSink) {
        for cell in &self.rects {
            sink.set_bounds(cell.widget, cell.rect);
        }
    }
}

/// Lays out a set of cells on a logical grid.
#[derive(Debug, Clone, Default)]
pub struct LogicalGridLayout {
    params: LayoutParams,
}

impl LogicalGridLayout {
    pub fn new(params: LayoutParams) -> Self {
        Self { params }
    }

    /// Set the declared column count.
    pub fn columns(mut self, column_count: usize) -> Self {
        self.params.column_count = column_count;
        self
    }

    /// Set the declared row count.
    pub fn rows(mut self, row_count: usize) -> Self {
        self.params.row_count = row_count;
        self
    }

    /// Set the horizontal and vertical gaps.
    pub fn gaps(mut self, h_gap: i32, v_gap: i32) -> Self {
        self.params.h_gap = h_gap;
        self.params.v_gap = v_gap;
        self
    }

    /// Set the auto placement traversal order.
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.params.orientation = orientation;
        self
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    /// Run one layout pass.
    ///
    /// `available_width` and `available_height` are the container's content
    /// size, gaps included. Measurement failures count as a zero size.
    pub fn layout<M>(
        &self,
        cells: &[GridCell],
        available_width: i32,
        available_height: i32,
        measurer: &M,
    ) -> LayoutResult
    where
        M: Measurer + ?Sized,
    {
        let _span = tracing::debug_span!("grid_layout", cells = cells.len()).entered();
        let params = self.params.normalized();
        let resolver = GridSizeResolver::new(params.h_gap, params.v_gap);

        let mut phase = LayoutPhase::Idle;
        let mut advance = |expected: LayoutPhase| {
            phase = phase.next();
            debug_assert_eq!(phase, expected);
            trace!(%phase, "Layout phase");
        };

        advance(LayoutPhase::Collecting);
        debug!(
            cells = cells.len(),
            columns = params.column_count,
            rows = params.row_count,
            available_width,
            available_height,
            "Starting grid layout"
        );

        advance(LayoutPhase::Placing);
        let mut matrix = OccupancyMatrix::new(params.column_count, params.row_count, params.orientation);
        let placements = matrix.place_all(cells);
        let column_count = matrix.column_count();
        let row_count = matrix.row_count();

        advance(LayoutPhase::MeasuringWidths);
        let unconstrained: Vec<Size> = cells.iter().map(|cell| measure_unconstrained(cell, measurer)).collect();

        advance(LayoutPhase::ResolvingWidths);
        let columns = resolver.resolve_columns(
            column_count,
            &GridSizeResolver::items(Axis::Horizontal, cells, &placements, &unconstrained),
            available_width,
        );

        advance(LayoutPhase::MeasuringHeights);
        let constrained: Vec<Size> = cells
            .iter()
            .zip(&placements)
            .zip(&unconstrained)
            .map(|((cell, placement), size)| {
                let (_, width) = columns.extent(placement.x, placement.span_x);
                measure_constrained(cell, *size, width, measurer)
            })
            .collect();

        advance(LayoutPhase::ResolvingHeights);
        let rows = resolver.resolve_rows(
            row_count,
            &GridSizeResolver::items(Axis::Vertical, cells, &placements, &constrained),
            available_height,
        );

        advance(LayoutPhase::Emitting);
        let own_heights = resolver::own_heights(cells, &constrained);
        let rects = resolver
            .build_rects(&placements, &columns, &rows, &own_heights)
            .into_iter()
            .zip(&placements)
            .map(|(rect, placement)| CellRect::new(placement, rect))
            .collect();

        let result = LayoutResult {
            rects,
            columns,
            rows,
            conflicts: matrix.conflicts().to_vec(),
            placeholders: matrix.placeholders(),
        };

        advance(LayoutPhase::Idle);
        debug!(
            columns = result.column_count(),
            rows = result.row_count(),
            conflicts = result.conflicts.len(),
            "Grid layout complete"
        );
        result
    }
}

/// Phase one: hints first, then the measurer without constraints.
fn measure_unconstrained<M: Measurer + ?Sized>(cell: &GridCell, measurer: &M) -> Size {
    if let (Some(width), Some(height)) = (cell.width_hint, cell.height_hint) {
        return Size::new(width, height).non_negative();
    }
    let measured = measure_or_zero(cell.widget, SizeHints::none(), measurer);
    Size::new(
        cell.width_hint.unwrap_or(measured.width),
        cell.height_hint.unwrap_or(measured.height),
    )
    .non_negative()
}

/// Phase two: re-measure the height at the width the cell will get.
fn measure_constrained<M: Measurer + ?Sized>(cell: &GridCell, unconstrained: Size, width: i32, measurer: &M) -> Size {
    if cell.height_hint.is_some() {
        return unconstrained;
    }
    let measured = measure_or_zero(cell.widget, SizeHints::with_width(width), measurer);
    Size::new(unconstrained.width, measured.height.max(0))
}

fn measure_or_zero<M: Measurer + ?Sized>(widget: WidgetId, hints: SizeHints, measurer: &M) -> Size {
    match measurer.preferred_size(widget, hints) {
        Ok(size) => size.non_negative(),
        Err(err) => {
            warn!(%widget, error = %err, "Measurement failed, using zero size");
            Size::zero()
        }
    }
}
