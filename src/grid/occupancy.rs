//! Occupancy matrix backing first-fit placement.
//!
//! Each cell stores a signed skip value:
//! - positive `v`: the cell is free and so are the next `v - 1` cells to its
//!   right, up to the next occupied block or the row edge;
//! - negative `v`: the cell is occupied and sits `|v|` cells before the end of
//!   its block, so the rightmost cell of a block holds `-1`.
//!
//! Both "how much room starts here" and "how far to the end of this obstacle"
//! are therefore single lookups, and a forward scan never revisits a cell.
//! Rows are stored flat with a stride of `columns` and grow lazily.

use crate::geometry::Cell;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    columns: usize,
    row_cap: Option<usize>,
    cells: Vec<i32>,
}

impl OccupancyGrid {
    /// A grid with one fresh row, or `row_cap` fresh rows when capped.
    /// Zero columns are treated as a single column.
    pub fn new(columns: usize, row_cap: Option<usize>) -> Self {
        let mut grid = Self {
            columns: columns.max(1),
            row_cap,
            cells: Vec::new(),
        };
        let initial_rows = row_cap.unwrap_or(1).max(1);
        grid.ensure_rows_up_to(initial_rows - 1);
        grid
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn row_cap(&self) -> Option<usize> {
        self.row_cap
    }

    /// Number of allocated rows.
    pub fn rows(&self) -> usize {
        self.cells.len() / self.columns
    }

    /// Grow with fresh rows until `row` exists. Existing rows are untouched.
    pub fn ensure_rows_up_to(&mut self, row: usize) {
        let wanted = (row + 1) * self.columns;
        if self.cells.len() >= wanted {
            return;
        }
        self.cells.reserve(wanted - self.cells.len());
        while self.cells.len() < wanted {
            let col = self.cells.len() % self.columns;
            self.cells.push(self.fresh_value(col));
        }
    }

    /// Skip value at `(row, col)`. Rows beyond the allocated ones read as
    /// fresh; columns outside the grid have no value.
    pub fn skip_value(&self, row: usize, col: usize) -> Option<i32> {
        if col >= self.columns {
            return None;
        }
        let value = self
            .cells
            .get(self.index(row, col))
            .copied()
            .unwrap_or_else(|| self.fresh_value(col));
        Some(value)
    }

    /// Allocated skip values of one row.
    pub fn row_values(&self, row: usize) -> Option<&[i32]> {
        let start = row * self.columns;
        self.cells.get(start..start + self.columns)
    }

    pub fn is_free(&self, row: usize, col: usize) -> bool {
        self.skip_value(row, col).is_some_and(|value| value > 0)
    }

    /// Whether `width` contiguous free cells start at `(row, col)`.
    ///
    /// Single-row test: callers spanning several rows repeat it per row.
    pub fn fits(&self, row: usize, col: usize, width: usize) -> bool {
        self.skip_value(row, col)
            .is_some_and(|value| i64::from(value) >= width as i64)
    }

    /// Mark a `width` x `height` block anchored at `(row, col)` as occupied.
    ///
    /// Occupied cells get `k - width` for offset `k`, and the free run to the
    /// left of the block is re-capped so it stops at `col`. The left walk halts
    /// at the first occupied cell it meets.
    pub fn commit(&mut self, row: usize, col: usize, width: usize, height: usize) {
        let width = width.min(self.columns.saturating_sub(col));
        if width == 0 || height == 0 {
            return;
        }
        self.ensure_rows_up_to(row + height - 1);

        for r in row..row + height {
            let base = r * self.columns;
            for k in 0..width {
                self.cells[base + col + k] = k as i32 - width as i32;
            }
            for k in (0..col).rev() {
                let cell = &mut self.cells[base + k];
                if *cell < 0 {
                    break;
                }
                *cell = (col - k) as i32;
            }
        }
    }

    /// First free cell at or after `(row, col)` in row-major order.
    ///
    /// Occupied blocks are jumped in one step; running off the right edge
    /// wraps to column 0 of the next row, allocating it if needed. Terminates
    /// because fresh rows are entirely free.
    pub fn next_free_cell(&mut self, row: usize, col: usize) -> Cell {
        let (mut row, mut col) = (row, col);
        loop {
            if col >= self.columns {
                row += 1;
                col = 0;
            }
            self.ensure_rows_up_to(row);
            let value = self.cells[self.index(row, col)];
            if value > 0 {
                return Cell::new(row, col);
            }
            col += (value.unsigned_abs() as usize).max(1);
        }
    }

    fn index(&self, row: usize, col: usize) -> usize {
        row * self.columns + col
    }

    fn fresh_value(&self, col: usize) -> i32 {
        (self.columns - col) as i32
    }
}
