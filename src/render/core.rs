use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::json;

use crate::config::SizingUnit;
use crate::error::Result;
use crate::layout::TilePlacement;
use crate::logging::{Logger, TARGET_RENDER, json_kv};
use crate::tile::TileId;

use super::sizing::TrackSizes;

/// Top/left offset of a tile in the configured unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileOffset {
    pub top: f64,
    pub left: f64,
    pub unit: SizingUnit,
}

impl TileOffset {
    /// Offsets as style values, e.g. `("12.5%", "0%")`.
    pub fn css(&self) -> (String, String) {
        let suffix = self.unit.suffix();
        (
            format!("{}{suffix}", self.top),
            format!("{}{suffix}", self.left),
        )
    }
}

/// Where computed offsets end up: element styles, a terminal, a test buffer.
pub trait StyleSink {
    fn apply(&mut self, tile: TileId, offset: &TileOffset) -> Result<()>;

    /// Remove anything previously applied for `tile`.
    fn clear(&mut self, tile: TileId) -> Result<()>;
}

/// Keeps the latest offset per tile in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStyleSink {
    pub offsets: BTreeMap<TileId, TileOffset>,
    pub cleared: Vec<TileId>,
}

impl MemoryStyleSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self, tile: TileId) -> Option<&TileOffset> {
        self.offsets.get(&tile)
    }
}

impl StyleSink for MemoryStyleSink {
    fn apply(&mut self, tile: TileId, offset: &TileOffset) -> Result<()> {
        self.offsets.insert(tile, *offset);
        Ok(())
    }

    fn clear(&mut self, tile: TileId) -> Result<()> {
        self.offsets.remove(&tile);
        self.cleared.push(tile);
        Ok(())
    }
}

/// Converts placements into offsets and pushes them into a [`StyleSink`].
#[derive(Debug, Clone)]
pub struct OffsetRenderer {
    sizes: TrackSizes,
    logger: Logger,
}

impl OffsetRenderer {
    pub fn new(sizes: TrackSizes) -> Self {
        Self {
            sizes,
            logger: Logger::null(),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn sizes(&self) -> &TrackSizes {
        &self.sizes
    }

    /// Push one tile: its offset when placed, a clear otherwise. Returns
    /// `true` when an offset was applied.
    pub fn render_tile<S>(
        &self,
        sink: &mut S,
        tile: TileId,
        placement: &TilePlacement,
    ) -> Result<bool>
    where
        S: StyleSink + ?Sized,
    {
        match placement.cell() {
            Some(cell) => {
                sink.apply(tile, &self.sizes.offset(cell))?;
                Ok(true)
            }
            None => {
                sink.clear(tile)?;
                Ok(false)
            }
        }
    }

    /// Apply placed tiles and clear unplaced ones. Returns how many tiles
    /// received an offset.
    pub fn render<'a, S>(
        &self,
        sink: &mut S,
        placements: impl IntoIterator<Item = (TileId, &'a TilePlacement)>,
    ) -> Result<usize>
    where
        S: StyleSink + ?Sized,
    {
        let mut applied = 0;
        let mut cleared = 0;
        for (tile, placement) in placements {
            if self.render_tile(sink, tile, placement)? {
                applied += 1;
            } else {
                cleared += 1;
            }
        }

        self.logger.debug(
            TARGET_RENDER,
            "offsets_rendered",
            [
                json_kv("applied", json!(applied)),
                json_kv("cleared", json!(cleared)),
            ],
        );
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Axis, Cell, Span};
    use crate::layout::UnplacedReason;

    fn sizes(unit: SizingUnit) -> TrackSizes {
        TrackSizes {
            unit,
            gutter: 2.0,
            col_size: 25.0,
            row_size: 10.0,
            columns: 4,
            row_axis: Axis::Height,
        }
    }

    #[test]
    fn css_values_carry_the_unit_suffix() {
        let offset = sizes(SizingUnit::Percent).offset(Cell::new(2, 1));
        assert_eq!(offset.css(), ("22%".to_string(), "27%".to_string()));

        let offset = sizes(SizingUnit::Absolute).offset(Cell::new(0, 0));
        assert_eq!(offset.css(), ("2px".to_string(), "2px".to_string()));
    }

    #[test]
    fn render_applies_placed_and_clears_unplaced() {
        let placed = TilePlacement::Placed {
            cell: Cell::new(1, 3),
            span: Span::unit(),
        };
        let dropped = TilePlacement::Unplaced {
            reason: UnplacedReason::GridFull,
        };

        let mut sink = MemoryStyleSink::new();
        let renderer = OffsetRenderer::new(sizes(SizingUnit::Absolute));
        let applied = renderer
            .render(&mut sink, [(TileId(0), &placed), (TileId(1), &dropped)])
            .unwrap();

        assert_eq!(applied, 1);
        let offset = sink.offset(TileId(0)).unwrap();
        assert_eq!((offset.top, offset.left), (12.0, 77.0));
        assert_eq!(sink.cleared, vec![TileId(1)]);
    }
}
