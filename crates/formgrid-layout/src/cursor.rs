//! Coordinate walker for automatic placement.
//!
//! The cursor knows nothing about occupancy. It enumerates the cells of a
//! rectangular region `[start_x, start_x + columns) x [start_y, start_y + rows)`
//! in row-major ([`Orientation::Horizontal`]) or column-major
//! ([`Orientation::Vertical`]) order. The matrix drives it for free-slot search
//! and the diagnostics use it to enumerate the whole grid.

use std::fmt;

use crate::cell::Orientation;

/// A logical grid coordinate (column, row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CellIndex {
    pub x: usize,
    pub y: usize,
}

impl CellIndex {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Stateful traversal over a bounded region.
#[derive(Debug, Clone)]
pub struct PlacementCursor {
    start: CellIndex,
    column_count: usize,
    row_count: usize,
    orientation: Orientation,
    current: Option<CellIndex>,
    exhausted: bool,
}

impl PlacementCursor {
    pub fn new(
        start_x: usize,
        start_y: usize,
        column_count: usize,
        row_count: usize,
        orientation: Orientation,
    ) -> Self {
        Self {
            start: CellIndex::new(start_x, start_y),
            column_count,
            row_count,
            orientation,
            current: None,
            exhausted: false,
        }
    }

    /// Advance one step. Returns `false` once the region is exhausted.
    pub fn increment(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        if self.column_count == 0 || self.row_count == 0 {
            self.exhausted = true;
            return false;
        }

        let next = match self.current {
            None => Some(self.start),
            Some(index) => self.step(index),
        };

        match next {
            Some(index) => {
                self.current = Some(index);
                true
            }
            None => {
                self.exhausted = true;
                false
            }
        }
    }

    /// Coordinate reached by the last successful [`increment`](Self::increment).
    pub fn current_index(&self) -> Option<CellIndex> {
        self.current
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Rewind to the state before the first increment.
    pub fn reset(&mut self) {
        self.current = None;
        self.exhausted = false;
    }

    /// Change the region size, keeping the current position.
    ///
    /// An exhausted cursor resumes after its last index, so growing the
    /// region continues the traversal into the new cells.
    pub fn resize(&mut self, column_count: usize, row_count: usize) {
        self.column_count = column_count;
        self.row_count = row_count;
        if self.exhausted {
            self.exhausted = false;
            if let Some(index) = self.current {
                if !self.contains(index) {
                    self.current = None;
                }
            }
        }
    }

    fn contains(&self, index: CellIndex) -> bool {
        index.x >= self.start.x
            && index.x < self.start.x + self.column_count
            && index.y >= self.start.y
            && index.y < self.start.y + self.row_count
    }

    fn step(&self, index: CellIndex) -> Option<CellIndex> {
        let end_x = self.start.x + self.column_count;
        let end_y = self.start.y + self.row_count;
        match self.orientation {
            Orientation::Horizontal => {
                if index.x + 1 < end_x {
                    Some(CellIndex::new(index.x + 1, index.y))
                } else if index.y + 1 < end_y {
                    Some(CellIndex::new(self.start.x, index.y + 1))
                } else {
                    None
                }
            }
            Orientation::Vertical => {
                if index.y + 1 < end_y {
                    Some(CellIndex::new(index.x, index.y + 1))
                } else if index.x + 1 < end_x {
                    Some(CellIndex::new(index.x + 1, self.start.y))
                } else {
                    None
                }
            }
        }
    }
}

impl Iterator for PlacementCursor {
    type Item = CellIndex;

    fn next(&mut self) -> Option<CellIndex> {
        if self.increment() {
            self.current
        } else {
            None
        }
    }
}
