//! Development overlays for a finished layout pass.
//!
//! Not used on any production path; tooling renders these on top of the
//! container to see the logical cells behind the widgets.

use std::fmt;

use crate::cell::{Orientation, WidgetId};
use crate::cursor::{CellIndex, PlacementCursor};
use crate::layout::LayoutResult;
use crate::Rect;

/// One logical cell of the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayCell {
    pub index: CellIndex,
    /// Bounds of the logical cell, not of the widget covering it.
    pub rect: Rect,
    pub widget: Option<WidgetId>,
    /// `"x,y"` for empty cells, `"x,y #id"` for covered ones.
    pub label: String,
}

/// Every logical cell of a pass with its pixel bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellBoundsOverlay {
    cells: Vec<OverlayCell>,
    columns: usize,
    rows: usize,
}

impl CellBoundsOverlay {
    pub fn from_result(result: &LayoutResult) -> Self {
        Self::with_orientation(result, Orientation::Horizontal)
    }

    /// Enumerate cells in the given traversal order.
    pub fn with_orientation(result: &LayoutResult, orientation: Orientation) -> Self {
        let columns = result.column_count();
        let rows = result.row_count();
        let bounds = result.cell_bounds();

        let cells = PlacementCursor::new(0, 0, columns, rows, orientation)
            .map(|index| {
                let widget = result
                    .placements()
                    .find(|p| p.covers(index.x, index.y))
                    .map(|p| p.widget);
                let label = match widget {
                    Some(widget) => format!("{},{} #{}", index.x, index.y, widget),
                    None => format!("{},{}", index.x, index.y),
                };
                OverlayCell {
                    index,
                    rect: bounds[index.y][index.x],
                    widget,
                    label,
                }
            })
            .collect();

        Self { cells, columns, rows }
    }

    pub fn cells(&self) -> &[OverlayCell] {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = &OverlayCell> {
        self.cells.iter()
    }

    /// Logical cells no widget covers.
    pub fn empty_cells(&self) -> impl Iterator<Item = &OverlayCell> {
        self.cells.iter().filter(|c| c.widget.is_none())
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }
}

impl fmt::Display for CellBoundsOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "grid {}x{}", self.columns, self.rows)?;
        for cell in &self.cells {
            writeln!(
                f,
                "  [{}] x={} y={} w={} h={}",
                cell.label, cell.rect.x, cell.rect.y, cell.rect.width, cell.rect.height
            )?;
        }
        Ok(())
    }
}
