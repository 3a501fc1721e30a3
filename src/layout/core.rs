use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::json;

use crate::cursor::PlacementCursor;
use crate::geometry::{Cell, CellRect, Span};
use crate::grid::OccupancyGrid;
use crate::logging::{Logger, TARGET_LAYOUT, json_kv, json_str};
use crate::tile::{TileId, TileSpec};

/// Deepest row an explicit position may reach on a grid without a row cap.
/// Anything lower is treated as auto-flow, which keeps a stray position
/// from allocating an enormous grid.
pub const MAX_EXPLICIT_ROW: usize = 10_000;

/// Grid shape and active breakpoint for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutParams {
    pub columns: usize,
    pub row_cap: Option<usize>,
    pub breakpoint: Option<usize>,
}

impl LayoutParams {
    pub fn new(columns: usize) -> Self {
        Self {
            columns: columns.max(1),
            row_cap: None,
            breakpoint: None,
        }
    }

    pub fn with_row_cap(mut self, row_cap: Option<usize>) -> Self {
        self.row_cap = row_cap.filter(|cap| *cap > 0);
        self
    }

    pub fn with_breakpoint(mut self, breakpoint: Option<usize>) -> Self {
        self.breakpoint = breakpoint;
        self
    }
}

/// Why a tile was left out of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnplacedReason {
    /// Explicit position would end below the row cap.
    ExplicitRowOverflow,
    /// Auto-flow tile taller than the row cap.
    TallerThanRowCap,
    /// No gap within the row cap was left.
    GridFull,
}

impl UnplacedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnplacedReason::ExplicitRowOverflow => "explicit_row_overflow",
            UnplacedReason::TallerThanRowCap => "taller_than_row_cap",
            UnplacedReason::GridFull => "grid_full",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TilePlacement {
    Placed { cell: Cell, span: Span },
    Unplaced { reason: UnplacedReason },
}

impl TilePlacement {
    pub fn is_placed(&self) -> bool {
        matches!(self, TilePlacement::Placed { .. })
    }

    pub fn cell(&self) -> Option<Cell> {
        match self {
            TilePlacement::Placed { cell, .. } => Some(*cell),
            TilePlacement::Unplaced { .. } => None,
        }
    }

    pub fn rect(&self) -> Option<CellRect> {
        match self {
            TilePlacement::Placed { cell, span } => Some(CellRect::new(*cell, *span)),
            TilePlacement::Unplaced { .. } => None,
        }
    }
}

/// Outcome of one full pass: every input tile appears exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutResult {
    pub params: LayoutParams,
    pub placements: BTreeMap<TileId, TilePlacement>,
    /// One past the lowest row any placed tile reaches.
    pub rows_used: usize,
}

impl LayoutResult {
    pub fn empty(params: LayoutParams) -> Self {
        Self {
            params,
            placements: BTreeMap::new(),
            rows_used: 0,
        }
    }

    pub fn get(&self, id: TileId) -> Option<&TilePlacement> {
        self.placements.get(&id)
    }

    pub fn rect_of(&self, id: TileId) -> Option<CellRect> {
        self.get(id).and_then(TilePlacement::rect)
    }

    pub fn placed(&self) -> impl Iterator<Item = (TileId, CellRect)> + '_ {
        self.placements
            .iter()
            .filter_map(|(id, placement)| placement.rect().map(|rect| (*id, rect)))
    }

    pub fn unplaced(&self) -> impl Iterator<Item = (TileId, UnplacedReason)> + '_ {
        self.placements
            .iter()
            .filter_map(|(id, placement)| match placement {
                TilePlacement::Unplaced { reason } => Some((*id, *reason)),
                TilePlacement::Placed { .. } => None,
            })
    }

    pub fn placed_count(&self) -> usize {
        self.placed().count()
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

enum Class {
    Assigned(Cell),
    Default,
}

/// First-fit placement over an [`OccupancyGrid`].
///
/// Explicitly positioned tiles are committed first and are authoritative;
/// overlapping explicit positions are the caller's problem. Everything else
/// flows into the first gap after the placement cursor, in id order.
#[derive(Debug, Clone)]
pub struct PlacementEngine {
    params: LayoutParams,
    logger: Logger,
}

impl PlacementEngine {
    pub fn new(params: LayoutParams) -> Self {
        Self {
            params: LayoutParams {
                columns: params.columns.max(1),
                ..params
            },
            logger: Logger::null(),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn params(&self) -> LayoutParams {
        self.params
    }

    pub fn run(&self, tiles: &[TileSpec]) -> LayoutResult {
        self.run_detailed(tiles).0
    }

    /// Run a pass on a fresh grid and hand the grid back with the result.
    pub fn run_detailed(&self, tiles: &[TileSpec]) -> (LayoutResult, OccupancyGrid) {
        let LayoutParams {
            columns, row_cap, ..
        } = self.params;
        let mut grid = OccupancyGrid::new(columns, row_cap);
        let mut cursor = PlacementCursor::new();
        let mut result = LayoutResult::empty(self.params);

        let mut ordered: Vec<&TileSpec> = tiles.iter().collect();
        ordered.sort_by_key(|tile| tile.id);

        let mut assigned = Vec::new();
        let mut default = Vec::new();
        for tile in ordered {
            match self.classify(tile) {
                Class::Assigned(cell) => assigned.push((tile, cell)),
                Class::Default => default.push(tile),
            }
        }

        for (tile, cell) in assigned {
            let placement = self.place_assigned(&mut grid, &mut cursor, tile, cell);
            self.record(&mut result, tile.id, placement);
        }

        let mut exhausted = false;
        for tile in default {
            exhausted = exhausted || cursor.beyond(row_cap);
            let placement = if exhausted {
                TilePlacement::Unplaced {
                    reason: UnplacedReason::GridFull,
                }
            } else {
                self.place_default(&mut grid, &mut cursor, tile)
            };
            self.record(&mut result, tile.id, placement);
        }

        self.logger.debug(
            TARGET_LAYOUT,
            "layout_pass_completed",
            [
                json_kv("columns", json!(columns)),
                json_kv("row_cap", json!(row_cap)),
                json_kv("tiles", json!(result.len())),
                json_kv("placed", json!(result.placed_count())),
                json_kv("rows_used", json!(result.rows_used)),
            ],
        );

        (result, grid)
    }

    fn classify(&self, tile: &TileSpec) -> Class {
        let Some(cell) = tile.explicit_cell(self.params.breakpoint) else {
            return Class::Default;
        };
        if cell.col + tile.width > self.params.columns {
            // Falls through to auto-flow rather than being truncated.
            self.logger.debug(
                TARGET_LAYOUT,
                "explicit_column_overflow",
                [
                    json_str("tile", tile.id.to_string()),
                    json_kv("col", json!(cell.col)),
                    json_kv("width", json!(tile.width)),
                ],
            );
            return Class::Default;
        }
        if self.params.row_cap.is_none() && cell.row.saturating_add(tile.height) > MAX_EXPLICIT_ROW
        {
            self.logger.warn(
                TARGET_LAYOUT,
                "explicit_row_out_of_range",
                [
                    json_str("tile", tile.id.to_string()),
                    json_kv("row", json!(cell.row)),
                    json_kv("limit", json!(MAX_EXPLICIT_ROW)),
                ],
            );
            return Class::Default;
        }
        Class::Assigned(cell)
    }

    fn place_assigned(
        &self,
        grid: &mut OccupancyGrid,
        cursor: &mut PlacementCursor,
        tile: &TileSpec,
        cell: Cell,
    ) -> TilePlacement {
        let span = tile.span();
        let last_row = cell.row + span.height - 1;
        if self.params.row_cap.is_some_and(|cap| last_row >= cap) {
            return TilePlacement::Unplaced {
                reason: UnplacedReason::ExplicitRowOverflow,
            };
        }

        grid.commit(cell.row, cell.col, span.width, span.height);
        cursor.advance_if_blocked(grid);
        TilePlacement::Placed { cell, span }
    }

    fn place_default(
        &self,
        grid: &mut OccupancyGrid,
        cursor: &mut PlacementCursor,
        tile: &TileSpec,
    ) -> TilePlacement {
        let row_cap = self.params.row_cap;
        if row_cap.is_some_and(|cap| tile.height > cap) {
            return TilePlacement::Unplaced {
                reason: UnplacedReason::TallerThanRowCap,
            };
        }

        let span = tile.effective_span(self.params.columns, row_cap);
        let Some(anchor) = find_slot(grid, cursor.cell(), span, row_cap) else {
            return TilePlacement::Unplaced {
                reason: UnplacedReason::GridFull,
            };
        };

        grid.commit(anchor.row, anchor.col, span.width, span.height);
        if cursor.is_at(anchor) {
            cursor.advance_if_blocked(grid);
        }
        TilePlacement::Placed { cell: anchor, span }
    }

    fn record(&self, result: &mut LayoutResult, id: TileId, placement: TilePlacement) {
        match placement {
            TilePlacement::Placed { cell, span } => {
                result.rows_used = result.rows_used.max(cell.row + span.height);
            }
            TilePlacement::Unplaced { reason } => {
                self.logger.warn(
                    TARGET_LAYOUT,
                    "tile_unplaced",
                    [
                        json_str("tile", id.to_string()),
                        json_str("reason", reason.as_str()),
                    ],
                );
            }
        }
        result.placements.insert(id, placement);
    }
}

/// Probe downward from `start` for `span.height` rows that each fit
/// `span.width` at the same column. On a miss, move the anchor past the free
/// run it started in and restart the probe there.
fn find_slot(
    grid: &mut OccupancyGrid,
    start: Cell,
    span: Span,
    row_cap: Option<usize>,
) -> Option<Cell> {
    let mut anchor = start;
    let mut row = anchor.row;

    while row - anchor.row < span.height {
        if row_cap.is_some_and(|cap| row >= cap) {
            return None;
        }

        if grid.fits(row, anchor.col, span.width) {
            row += 1;
            continue;
        }

        // The skip always comes from the anchor row, even when a lower row
        // was the one that missed.
        let skip = grid
            .skip_value(anchor.row, anchor.col)
            .map_or(1, |value| value.max(1) as usize);
        anchor = grid.next_free_cell(anchor.row, anchor.col + skip);
        row = anchor.row;
    }

    Some(anchor)
}
