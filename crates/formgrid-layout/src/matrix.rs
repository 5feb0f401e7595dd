//! Occupancy bookkeeping and cell assignment.
//!
//! The matrix owns a sparse column -> row table of slots. Cells are assigned
//! in three phases:
//!
//! 1. cells with an explicit column and row
//! 2. cells with only one explicit coordinate
//! 3. auto-placed cells, plus explicit cells that had to be relocated
//!
//! Auto placement walks a single forward-only [`PlacementCursor`], so a cell
//! never lands before the previous auto-placed one. When the declared region
//! runs out, the matrix grows along the traversal's primary axis instead of
//! failing. Explicit origins that would end past [`MAX_GRID_TRACKS`] are
//! treated like overlaps: the cell is auto-placed and a conflict recorded.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::cell::{GridCell, Orientation, WidgetId};
use crate::cursor::{CellIndex, PlacementCursor};
use crate::MAX_GRID_TRACKS;

/// Content of one logical cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Covered by a widget's span.
    Occupied(WidgetId),
    /// Visited and skipped by the free-slot search; still free.
    Placeholder,
}

/// Where a widget ended up, in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub widget: WidgetId,
    pub x: usize,
    pub y: usize,
    pub span_x: usize,
    pub span_y: usize,
}

impl Placement {
    pub fn origin(&self) -> CellIndex {
        CellIndex::new(self.x, self.y)
    }

    /// Exclusive end column.
    pub fn end_x(&self) -> usize {
        self.x + self.span_x
    }

    /// Exclusive end row.
    pub fn end_y(&self) -> usize {
        self.y + self.span_y
    }

    pub fn covers(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.end_x() && y >= self.y && y < self.end_y()
    }

    pub fn overlaps(&self, other: &Placement) -> bool {
        self.x < other.end_x()
            && other.x < self.end_x()
            && self.y < other.end_y()
            && other.y < self.end_y()
    }
}

/// A malformed request the matrix resolved on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementConflict {
    /// The explicit origin was already taken; the cell was auto-placed instead.
    Overlap {
        widget: WidgetId,
        requested: CellIndex,
        relocated_to: CellIndex,
    },
    /// The explicit origin plus span ended past [`MAX_GRID_TRACKS`]; the cell
    /// was auto-placed instead.
    OriginOutOfRange {
        widget: WidgetId,
        requested: CellIndex,
        relocated_to: CellIndex,
    },
    /// The span did not fit the non-growing axis, which was widened to the span.
    SpanExceedsGrid {
        widget: WidgetId,
        span: usize,
        limit: usize,
    },
}

impl PlacementConflict {
    pub fn widget(&self) -> WidgetId {
        match self {
            PlacementConflict::Overlap { widget, .. } => *widget,
            PlacementConflict::OriginOutOfRange { widget, .. } => *widget,
            PlacementConflict::SpanExceedsGrid { widget, .. } => *widget,
        }
    }
}

/// Sparse occupancy table for one layout pass.
#[derive(Debug, Clone)]
pub struct OccupancyMatrix {
    declared_columns: usize,
    declared_rows: usize,
    column_count: usize,
    row_count: usize,
    orientation: Orientation,
    /// column -> row -> slot
    slots: HashMap<usize, HashMap<usize, Slot>>,
    cursor: PlacementCursor,
    placements: Vec<Placement>,
    conflicts: Vec<PlacementConflict>,
}

impl OccupancyMatrix {
    pub fn new(column_count: usize, row_count: usize, orientation: Orientation) -> Self {
        Self {
            declared_columns: column_count,
            declared_rows: row_count,
            column_count,
            row_count,
            orientation,
            slots: HashMap::new(),
            cursor: PlacementCursor::new(0, 0, column_count, row_count, orientation),
            placements: Vec::new(),
            conflicts: Vec::new(),
        }
    }

    /// Forget all assignments and return to the declared dimensions.
    pub fn reset(&mut self) {
        self.column_count = self.declared_columns;
        self.row_count = self.declared_rows;
        self.slots.clear();
        self.placements.clear();
        self.conflicts.clear();
        self.cursor = PlacementCursor::new(0, 0, self.column_count, self.row_count, self.orientation);
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Conflicts recorded since the last reset.
    pub fn conflicts(&self) -> &[PlacementConflict] {
        &self.conflicts
    }

    /// Placements in the order they were made.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn slot_at(&self, x: usize, y: usize) -> Option<Slot> {
        self.slots.get(&x).and_then(|column| column.get(&y)).copied()
    }

    /// Widget covering the cell, if any.
    pub fn cell_at(&self, x: usize, y: usize) -> Option<WidgetId> {
        match self.slot_at(x, y) {
            Some(Slot::Occupied(widget)) => Some(widget),
            _ => None,
        }
    }

    /// True iff the rectangle lies inside the grid and none of its cells is occupied.
    pub fn is_all_cell_free(&self, x: usize, y: usize, w: usize, h: usize) -> bool {
        x.checked_add(w).is_some_and(|end| end <= self.column_count)
            && y.checked_add(h).is_some_and(|end| end <= self.row_count)
            && self.is_region_unoccupied(x, y, w, h)
    }

    fn is_region_unoccupied(&self, x: usize, y: usize, w: usize, h: usize) -> bool {
        (x..x + w).all(|cx| (y..y + h).all(|cy| !matches!(self.slot_at(cx, cy), Some(Slot::Occupied(_)))))
    }

    /// Assign every cell; the result is in input order.
    pub fn place_all(&mut self, cells: &[GridCell]) -> Vec<Placement> {
        let mut assigned: Vec<Option<Placement>> = vec![None; cells.len()];
        let mut relocated = Vec::new();

        // Phase 1: explicit in both dimensions
        for (i, cell) in cells.iter().enumerate().filter(|(_, c)| c.is_fully_placed()) {
            match self.try_place_explicit(cell) {
                Some(placement) => assigned[i] = Some(placement),
                None => relocated.push(i),
            }
        }

        // Phase 2: explicit in one dimension
        for (i, cell) in cells.iter().enumerate().filter(|(_, c)| c.is_partially_placed()) {
            if origin_in_range(cell) {
                assigned[i] = Some(self.place_partial(cell));
            } else {
                relocated.push(i);
            }
        }

        // Phase 3: auto placement, relocated cells keep their input order
        let mut queue: Vec<usize> = cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.needs_auto_placement())
            .map(|(i, _)| i)
            .chain(relocated)
            .collect();
        queue.sort_unstable();

        for i in queue {
            let cell = &cells[i];
            let placement = if cell.needs_auto_placement() {
                self.place_auto(cell)
            } else {
                self.relocate(cell)
            };
            assigned[i] = Some(placement);
        }

        assigned.into_iter().flatten().collect()
    }

    /// Place a cell at its explicit origin, relocating it on overlap.
    ///
    /// Cells without both origins are routed to the matching search.
    pub fn place_explicit(&mut self, cell: &GridCell) -> Placement {
        if cell.is_partially_placed() {
            return self.place_partial(cell);
        }
        if !cell.is_fully_placed() {
            return self.place_auto(cell);
        }
        match self.try_place_explicit(cell) {
            Some(placement) => placement,
            None => self.relocate(cell),
        }
    }

    fn try_place_explicit(&mut self, cell: &GridCell) -> Option<Placement> {
        if !origin_in_range(cell) {
            return None;
        }
        let (x, y) = (cell.origin_x?, cell.origin_y?);
        let (w, h) = (cell.effective_span_x(), cell.effective_span_y());

        self.ensure_bounds(x + w, y + h);
        if !self.is_all_cell_free(x, y, w, h) {
            return None;
        }
        Some(self.occupy(cell.widget, CellIndex::new(x, y), w, h))
    }

    /// Place a cell that pins only its column or only its row.
    pub fn place_partial(&mut self, cell: &GridCell) -> Placement {
        if !origin_in_range(cell) {
            return self.relocate(cell);
        }
        let (w, h) = (cell.effective_span_x(), cell.effective_span_y());

        let index = match (cell.origin_x, cell.origin_y) {
            (Some(x), None) => {
                // Rows past the end are always free, so the search ends there at the latest.
                let y = (0..=self.row_count)
                    .find(|&y| self.is_region_unoccupied(x, y, w, h))
                    .unwrap_or(self.row_count);
                CellIndex::new(x, y)
            }
            (None, Some(y)) => {
                let x = (0..=self.column_count.saturating_sub(w))
                    .find(|&x| self.is_region_unoccupied(x, y, w, h))
                    .unwrap_or(self.column_count);
                CellIndex::new(x, y)
            }
            (Some(x), Some(y)) => {
                if self.is_region_unoccupied(x, y, w, h) {
                    CellIndex::new(x, y)
                } else {
                    return self.place_explicit(cell);
                }
            }
            (None, None) => return self.place_auto(cell),
        };

        self.ensure_bounds(index.x + w, index.y + h);
        self.occupy(cell.widget, index, w, h)
    }

    /// Place a cell at the next free position in traversal order.
    pub fn place_auto(&mut self, cell: &GridCell) -> Placement {
        let (w, h) = (cell.effective_span_x(), cell.effective_span_y());
        self.fit_span_to_fixed_axis(cell.widget, w, h);

        if let Some(index) = self.search(w, h) {
            return self.occupy(cell.widget, index, w, h);
        }

        // Grow far enough that the span must fit, resume the search, then
        // keep only the tracks actually used.
        let (old_columns, old_rows) = (self.column_count, self.row_count);
        match self.orientation {
            Orientation::Horizontal => self.row_count += h,
            Orientation::Vertical => self.column_count += w,
        }
        self.cursor.resize(self.column_count, self.row_count);

        let index = self.search(w, h).unwrap_or(match self.orientation {
            Orientation::Horizontal => CellIndex::new(0, old_rows),
            Orientation::Vertical => CellIndex::new(old_columns, 0),
        });

        match self.orientation {
            Orientation::Horizontal => self.row_count = old_rows.max(index.y + h),
            Orientation::Vertical => self.column_count = old_columns.max(index.x + w),
        }
        self.cursor.resize(self.column_count, self.row_count);

        debug!(
            widget = %cell.widget,
            columns = self.column_count,
            rows = self.row_count,
            "Grid expanded to fit auto-placed cell"
        );

        self.occupy(cell.widget, index, w, h)
    }

    /// Walk the cursor until a position fits the span.
    fn search(&mut self, w: usize, h: usize) -> Option<CellIndex> {
        while self.cursor.increment() {
            let index = self.cursor.current_index()?;
            if self.is_all_cell_free(index.x, index.y, w, h) {
                return Some(index);
            }
            if self.slot_at(index.x, index.y).is_none() {
                self.slots.entry(index.x).or_default().insert(index.y, Slot::Placeholder);
            }
        }
        None
    }

    fn fit_span_to_fixed_axis(&mut self, widget: WidgetId, w: usize, h: usize) {
        let (span, limit) = match self.orientation {
            Orientation::Horizontal => (w, self.column_count),
            Orientation::Vertical => (h, self.row_count),
        };
        if span <= limit {
            return;
        }

        warn!(%widget, span, limit, "Cell span exceeds grid, widening");
        self.conflicts.push(PlacementConflict::SpanExceedsGrid { widget, span, limit });
        match self.orientation {
            Orientation::Horizontal => self.column_count = span,
            Orientation::Vertical => self.row_count = span,
        }
        self.cursor.resize(self.column_count, self.row_count);
    }

    fn ensure_bounds(&mut self, columns: usize, rows: usize) {
        if columns <= self.column_count && rows <= self.row_count {
            return;
        }
        self.column_count = self.column_count.max(columns);
        self.row_count = self.row_count.max(rows);
        self.cursor.resize(self.column_count, self.row_count);
        trace!(
            columns = self.column_count,
            rows = self.row_count,
            "Grid bounds grown for explicit placement"
        );
    }

    fn occupy(&mut self, widget: WidgetId, index: CellIndex, w: usize, h: usize) -> Placement {
        for x in index.x..index.x + w {
            let column = self.slots.entry(x).or_default();
            for y in index.y..index.y + h {
                column.insert(y, Slot::Occupied(widget));
            }
        }

        let placement = Placement {
            widget,
            x: index.x,
            y: index.y,
            span_x: w,
            span_y: h,
        };
        self.placements.push(placement);

        trace!(%widget, x = index.x, y = index.y, span_x = w, span_y = h, "Placed cell");
        placement
    }

    /// Auto-place an explicit cell that could not go where it asked.
    fn relocate(&mut self, cell: &GridCell) -> Placement {
        let placement = self.place_auto(cell);
        let requested = CellIndex::new(cell.origin_x.unwrap_or(0), cell.origin_y.unwrap_or(0));
        let relocated_to = placement.origin();

        if origin_in_range(cell) {
            warn!(
                widget = %cell.widget,
                %requested,
                %relocated_to,
                "Explicit cell overlaps an occupied cell, relocated"
            );
            self.conflicts.push(PlacementConflict::Overlap {
                widget: cell.widget,
                requested,
                relocated_to,
            });
        } else {
            warn!(
                widget = %cell.widget,
                %requested,
                %relocated_to,
                "Explicit origin out of range, relocated"
            );
            self.conflicts.push(PlacementConflict::OriginOutOfRange {
                widget: cell.widget,
                requested,
                relocated_to,
            });
        }
        placement
    }

    /// Cells visited and skipped by the auto placement search.
    pub fn placeholders(&self) -> Vec<CellIndex> {
        let mut placeholders: Vec<CellIndex> = self
            .slots
            .iter()
            .flat_map(|(&x, column)| {
                column
                    .iter()
                    .filter(|(_, slot)| matches!(slot, Slot::Placeholder))
                    .map(move |(&y, _)| CellIndex::new(x, y))
            })
            .collect();
        placeholders.sort_unstable_by_key(|index| (index.y, index.x));
        placeholders
    }

    /// Render the grid as rows of widget ids.
    ///
    /// `+` marks a placeholder, `.` an untouched cell.
    pub fn to_debug_string(&self) -> String {
        render_slots(self.column_count, self.row_count, |x, y| self.slot_at(x, y))
    }
}

/// True if every explicit origin plus its span ends within [`MAX_GRID_TRACKS`].
fn origin_in_range(cell: &GridCell) -> bool {
    let fits = |origin: Option<usize>, span: usize| {
        origin.map_or(true, |o| o.checked_add(span).is_some_and(|end| end <= MAX_GRID_TRACKS))
    };
    fits(cell.origin_x, cell.effective_span_x()) && fits(cell.origin_y, cell.effective_span_y())
}

/// Right-aligned, space-separated rows of slot labels.
pub(crate) fn render_slots(columns: usize, rows: usize, slot: impl Fn(usize, usize) -> Option<Slot>) -> String {
    let labels: Vec<Vec<String>> = (0..rows)
        .map(|y| {
            (0..columns)
                .map(|x| match slot(x, y) {
                    Some(Slot::Occupied(widget)) => widget.to_string(),
                    Some(Slot::Placeholder) => "+".to_string(),
                    None => ".".to_string(),
                })
                .collect()
        })
        .collect();

    let width = labels.iter().flatten().map(|l| l.len()).max().unwrap_or(1);

    labels
        .iter()
        .map(|row| {
            row.iter()
                .map(|l| format!("{:>width$}", l, width = width))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
