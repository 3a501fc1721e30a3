//! Placement cursor: the earliest free cell known to the engine.
//!
//! Auto-flow search starts here instead of at the origin. The cursor only
//! ever moves forward in row-major order, and only when the cell it points
//! at becomes occupied.

use crate::geometry::Cell;
use crate::grid::OccupancyGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlacementCursor {
    pub row: usize,
    pub col: usize,
}

impl PlacementCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self) -> Cell {
        Cell::new(self.row, self.col)
    }

    pub fn is_at(&self, cell: Cell) -> bool {
        self.cell() == cell
    }

    /// Whether the cell under the cursor has been occupied.
    pub fn is_blocked(&self, grid: &OccupancyGrid) -> bool {
        !grid.is_free(self.row, self.col)
    }

    /// Move to the next free cell if the current one has been taken.
    /// Returns `true` when the cursor moved.
    pub fn advance_if_blocked(&mut self, grid: &mut OccupancyGrid) -> bool {
        if !self.is_blocked(grid) {
            return false;
        }
        let next = grid.next_free_cell(self.row, self.col);
        self.row = next.row;
        self.col = next.col;
        true
    }

    /// Whether the cursor has moved past the last allowed row.
    pub fn beyond(&self, row_cap: Option<usize>) -> bool {
        row_cap.is_some_and(|cap| self.row >= cap)
    }
}
