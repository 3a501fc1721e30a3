//! Property-based invariants of the placement engine and breakpoint selection.
//!
//! 1. Placed tiles never overlap, auto-flow and explicit alike.
//! 2. Placed tiles stay inside the column count and the row cap.
//! 3. Layout is deterministic and independent of input order.
//! 4. Breakpoint reselection is monotonic in the measurement.

use std::collections::BTreeMap;

use mosaic_grid::{
    Axis, BreakpointTable, Cell, CellMetrics, CellRect, Container, LayoutParams, LayoutResult,
    MemoryStyleSink, Mosaic, MosaicConfig, PlacementEngine, SizingUnit, Span, TileId,
    TilePlacement, TilePosition, TileSpec, UnplacedReason, reselect,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn params_strategy() -> impl Strategy<Value = LayoutParams> {
    (1usize..=6, prop::option::of(1usize..=6))
        .prop_map(|(columns, row_cap)| LayoutParams::new(columns).with_row_cap(row_cap))
}

fn auto_tile_strategy() -> impl Strategy<Value = TileSpec> {
    (1usize..=7, 1usize..=3).prop_map(|(width, height)| {
        TileSpec::new(TileId(0), Span::new(width, height))
    })
}

/// Explicit tiles, each confined to its own band of three rows so no two
/// footprints can meet.
fn explicit_tiles_strategy() -> impl Strategy<Value = Vec<TileSpec>> {
    prop::collection::vec((0u32..3, 0u32..6, 1usize..=6, 1usize..=3), 0..=4).prop_map(|cells| {
        cells
            .into_iter()
            .enumerate()
            .map(|(band, (offset, col, width, height))| {
                let offset = offset.min(3 - height as u32);
                TileSpec::new(TileId(0), Span::new(width, height))
                    .pinned(band as u32 * 3 + offset, col)
            })
            .collect()
    })
}

/// Auto and explicit tiles shuffled together, ids following the final order.
fn tiles_strategy() -> impl Strategy<Value = Vec<TileSpec>> {
    (
        prop::collection::vec(auto_tile_strategy(), 1..14),
        explicit_tiles_strategy(),
    )
        .prop_flat_map(|(mut tiles, explicit)| {
            tiles.extend(explicit);
            Just(tiles).prop_shuffle()
        })
        .prop_map(|tiles| {
            tiles
                .into_iter()
                .enumerate()
                .map(|(id, mut tile)| {
                    tile.id = TileId(id as u64);
                    tile
                })
                .collect()
        })
}

fn placed_rects(result: &LayoutResult) -> Vec<(TileId, CellRect)> {
    result.placed().collect()
}

fn breakpoint_table() -> BreakpointTable<&'static str> {
    BreakpointTable::new("base", [(0, "phone"), (600, "tablet"), (1024, "wide")])
}

// ═════════════════════════════════════════════════════════════════════════
// 1. No overlap
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn placed_tiles_never_overlap(params in params_strategy(), tiles in tiles_strategy()) {
        let result = PlacementEngine::new(params).run(&tiles);
        let rects = placed_rects(&result);
        for (i, (a_id, a)) in rects.iter().enumerate() {
            for (b_id, b) in &rects[i + 1..] {
                prop_assert!(
                    !a.intersects(b),
                    "{} {:?} overlaps {} {:?} with {:?}",
                    a_id, a, b_id, b, params
                );
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Containment
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn placed_tiles_stay_inside_the_grid(params in params_strategy(), tiles in tiles_strategy()) {
        let result = PlacementEngine::new(params).run(&tiles);
        for (id, rect) in result.placed() {
            prop_assert!(rect.right() <= params.columns, "{} {:?} {:?}", id, rect, params);
            if let Some(cap) = params.row_cap {
                prop_assert!(rect.bottom() <= cap, "{} {:?} {:?}", id, rect, params);
            }
        }
        prop_assert_eq!(result.len(), tiles.len());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Determinism and order independence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn layout_is_deterministic_and_order_independent(
        params in params_strategy(),
        tiles in tiles_strategy(),
    ) {
        let engine = PlacementEngine::new(params);
        let first = engine.run(&tiles);
        let again = engine.run(&tiles);
        prop_assert_eq!(&first, &again);

        let mut reversed = tiles.clone();
        reversed.reverse();
        let from_reversed = engine.run(&reversed);
        prop_assert_eq!(&first, &from_reversed, "order changed the layout for {:?}", params);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Reselect monotonicity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reselect_is_monotonic_in_the_measurement(
        mut measurements in prop::collection::vec(-200i64..2000, 1..40),
    ) {
        let table = breakpoint_table();
        measurements.sort_unstable();

        let mut current = table.initial_index(measurements[0]);
        for &measurement in &measurements {
            let next = reselect(measurement, &table, current);
            prop_assert!(next >= current, "dropped to {} at {}", next, measurement);
            prop_assert_eq!(next, table.initial_index(measurement));
            current = next;
        }

        for &measurement in measurements.iter().rev() {
            let next = reselect(measurement, &table, current);
            prop_assert!(next <= current, "rose to {} at {}", next, measurement);
            current = next;
        }
    }
}

#[test]
fn documented_scenarios() {
    let run = |params: LayoutParams, tiles: &[TileSpec]| PlacementEngine::new(params).run(tiles);

    // 1. single auto tile
    let result = run(LayoutParams::new(4), &[TileSpec::new(TileId(0), Span::new(2, 1))]);
    let rect = result.rect_of(TileId(0)).unwrap();
    assert_eq!((rect.origin, rect.span.width), (Cell::new(0, 0), 2));

    // 2. no room beside an explicit tile
    let result = run(
        LayoutParams::new(4),
        &[
            TileSpec::new(TileId(0), Span::new(2, 1)).pinned(0, 1),
            TileSpec::new(TileId(1), Span::new(2, 1)),
        ],
    );
    assert_eq!(result.rect_of(TileId(1)).unwrap().origin, Cell::new(1, 0));

    // 3. wider than the grid
    let result = run(LayoutParams::new(3), &[TileSpec::new(TileId(0), Span::new(5, 1))]);
    let rect = result.rect_of(TileId(0)).unwrap();
    assert_eq!((rect.origin, rect.span.width), (Cell::new(0, 0), 3));

    // 4. taller than the row cap
    let result = run(
        LayoutParams::new(4).with_row_cap(Some(2)),
        &[TileSpec::new(TileId(0), Span::new(1, 3))],
    );
    assert_eq!(
        result.get(TileId(0)),
        Some(&TilePlacement::Unplaced {
            reason: UnplacedReason::TallerThanRowCap
        })
    );

    // 5. breakpoint crossing
    let table = BreakpointTable::new((), [(0, ()), (600, ()), (1024, ())]);
    assert_eq!(reselect(800, &table, 1), 2);

    // 6. explicit column beyond the grid
    let result = run(
        LayoutParams::new(4),
        &[TileSpec::new(TileId(0), Span::unit()).pinned(2, 5)],
    );
    assert_eq!(result.rect_of(TileId(0)).unwrap().origin, Cell::new(0, 0));
}

struct Gallery {
    spans: Vec<Span>,
    positions: BTreeMap<usize, TilePosition>,
}

impl Container for Gallery {
    fn item_count(&self) -> usize {
        self.spans.len()
    }

    fn span(&self, index: usize, _metrics: &CellMetrics) -> Option<Span> {
        self.spans.get(index).copied()
    }

    fn position(&self, index: usize) -> TilePosition {
        self.positions
            .get(&index)
            .cloned()
            .unwrap_or_else(TilePosition::auto)
    }

    fn extent(&self, axis: Axis) -> Option<f64> {
        Some(match axis {
            Axis::Width => 1200.0,
            Axis::Height => 800.0,
        })
    }
}

fn gallery() -> Gallery {
    Gallery {
        spans: vec![
            Span::new(2, 2),
            Span::unit(),
            Span::new(3, 1),
            Span::unit(),
            Span::new(1, 2),
        ],
        positions: BTreeMap::from([(3, TilePosition::fixed(0, 5))]),
    }
}

#[test]
fn relayout_is_idempotent_and_ids_are_stable() {
    let config = MosaicConfig::new(6).with_sizing_unit(SizingUnit::Absolute);
    let mut mosaic = Mosaic::build(gallery(), config, 1200).unwrap();
    let first = mosaic.layout().clone();
    let ids = mosaic.registry().ids().to_vec();
    let mut sink = MemoryStyleSink::new();
    mosaic.apply(&mut sink).unwrap();

    let second = mosaic.relayout().unwrap().clone();
    assert_eq!(first, second);
    assert_eq!(mosaic.registry().ids(), ids.as_slice());
    // Unchanged placements leave nothing to restyle.
    assert_eq!(mosaic.apply(&mut sink).unwrap(), 0);
    assert_eq!(first.rect_of(TileId(3)).unwrap().origin, Cell::new(0, 5));
}

#[test]
fn dirty_tracking_only_flags_moved_tiles() {
    let config = MosaicConfig::new(6).with_sizing_unit(SizingUnit::Absolute);
    let mut mosaic = Mosaic::build(gallery(), config, 1200).unwrap();
    let mut sink = MemoryStyleSink::new();
    mosaic.apply(&mut sink).unwrap();

    // Growing the last tile moves nothing else.
    mosaic.container_mut().spans[4] = Span::new(1, 3);
    mosaic.relayout().unwrap();
    let before = sink.offsets.clone();
    assert_eq!(mosaic.apply(&mut sink).unwrap(), 1);
    for (id, offset) in &before {
        if *id != TileId(4) {
            assert_eq!(sink.offset(*id), Some(offset));
        }
    }
}

#[test]
fn teardown_clears_every_produced_style() {
    let config = MosaicConfig::new(6).with_sizing_unit(SizingUnit::Absolute);
    let mut mosaic = Mosaic::build(gallery(), config, 1200).unwrap();
    let mut sink = MemoryStyleSink::new();
    mosaic.apply(&mut sink).unwrap();
    assert_eq!(sink.offsets.len(), 5);

    let gallery = mosaic.teardown(&mut sink).unwrap();
    assert!(sink.offsets.is_empty());
    assert_eq!(sink.cleared.len(), 5);
    assert_eq!(gallery.spans.len(), 5);
}
