use serde::{Deserialize, Serialize};

/// Measurement axis of a container or element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Width,
    Height,
}

/// A grid cell address, zero based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Footprint of a tile measured in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub width: usize,
    pub height: usize,
}

impl Span {
    /// Both dimensions are clamped to at least one cell.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub const fn unit() -> Self {
        Self {
            width: 1,
            height: 1,
        }
    }

    /// Convert an element's outer size into whole cells.
    ///
    /// The gutter is added once before dividing so that a tile spanning `n`
    /// columns (which includes `n - 1` inner gutters) rounds to exactly `n`.
    /// Column spans never exceed `columns`.
    pub fn from_outer_size(
        outer_width: f64,
        outer_height: f64,
        gutter: f64,
        col_size: f64,
        row_size: f64,
        columns: usize,
    ) -> Self {
        let cols = cells_for(outer_width + gutter, col_size).min(columns.max(1));
        let rows = cells_for(outer_height + gutter, row_size);
        Self::new(cols, rows)
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::unit()
    }
}

fn cells_for(length: f64, cell: f64) -> usize {
    if !cell.is_finite() || cell <= 0.0 || !length.is_finite() || length <= 0.0 {
        return 1;
    }
    (length / cell).round() as usize
}

/// Rectangle of cells occupied by a placed tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRect {
    pub origin: Cell,
    pub span: Span,
}

impl CellRect {
    pub const fn new(origin: Cell, span: Span) -> Self {
        Self { origin, span }
    }

    pub fn bottom(&self) -> usize {
        self.origin.row + self.span.height
    }

    pub fn right(&self) -> usize {
        self.origin.col + self.span.width
    }

    pub fn intersects(&self, other: &CellRect) -> bool {
        self.origin.row < other.bottom()
            && other.origin.row < self.bottom()
            && self.origin.col < other.right()
            && other.origin.col < self.right()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (self.origin.row..self.bottom()).contains(&cell.row)
            && (self.origin.col..self.right()).contains(&cell.col)
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (self.origin.row..self.bottom())
            .flat_map(move |row| (self.origin.col..self.right()).map(move |col| Cell::new(row, col)))
    }
}
