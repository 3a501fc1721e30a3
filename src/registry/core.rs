use std::collections::{BTreeMap, BTreeSet};

use blake3::Hash;

use crate::error::{MosaicError, Result};
use crate::layout::{LayoutResult, TilePlacement, UnplacedReason};
use crate::tile::TileId;

/// Last known state of one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileState {
    /// Position of the item in the container.
    pub index: usize,
    pub placement: Option<TilePlacement>,
    pub is_dirty: bool,
}

impl TileState {
    fn new(index: usize) -> Self {
        Self {
            index,
            placement: None,
            is_dirty: true,
        }
    }

    fn update_placement(&mut self, placement: TilePlacement) -> bool {
        if self.placement == Some(placement) {
            return false;
        }
        self.placement = Some(placement);
        self.is_dirty = true;
        true
    }
}

/// Digest of a whole layout, stable across runs for identical placements.
pub fn layout_fingerprint(result: &LayoutResult) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(result.params.columns as u64).to_le_bytes());
    hasher.update(&(result.params.row_cap.map_or(0, |cap| cap as u64 + 1)).to_le_bytes());
    for (id, placement) in &result.placements {
        hasher.update(&id.0.to_le_bytes());
        match placement {
            TilePlacement::Placed { cell, span } => {
                hasher.update(&[1]);
                for value in [cell.row, cell.col, span.width, span.height] {
                    hasher.update(&(value as u64).to_le_bytes());
                }
            }
            TilePlacement::Unplaced { reason } => {
                let code: u8 = match reason {
                    UnplacedReason::ExplicitRowOverflow => 0,
                    UnplacedReason::TallerThanRowCap => 1,
                    UnplacedReason::GridFull => 2,
                };
                hasher.update(&[0, code]);
            }
        }
    }
    hasher.finalize()
}

/// Tile ids, their placements and which ones changed since the last drain.
///
/// Ids are handed out monotonically and never reused, so a tile keeps its
/// identity across relayouts.
#[derive(Debug, Default)]
pub struct TileRegistry {
    next_id: u64,
    by_index: Vec<TileId>,
    entries: BTreeMap<TileId, TileState>,
    dirty: BTreeSet<TileId>,
    fingerprint: Option<Hash>,
}

impl TileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self) -> TileId {
        let id = TileId(self.next_id);
        self.next_id += 1;
        let index = self.by_index.len();
        self.by_index.push(id);
        self.entries.insert(id, TileState::new(index));
        self.dirty.insert(id);
        id
    }

    /// Match the registry to a container holding `count` items: new items
    /// get fresh ids, ids of items that disappeared are released.
    pub fn sync_items(&mut self, count: usize) -> Vec<TileId> {
        while self.by_index.len() < count {
            self.register();
        }
        for id in self.by_index.split_off(count) {
            self.entries.remove(&id);
            self.dirty.remove(&id);
        }
        self.by_index.clone()
    }

    pub fn ids(&self) -> &[TileId] {
        &self.by_index
    }

    pub fn id_at(&self, index: usize) -> Option<TileId> {
        self.by_index.get(index).copied()
    }

    pub fn state(&self, id: TileId) -> Option<&TileState> {
        self.entries.get(&id)
    }

    pub fn placement(&self, id: TileId) -> Option<&TilePlacement> {
        self.entries.get(&id).and_then(|state| state.placement.as_ref())
    }

    /// Record a fresh layout. Returns how many tiles changed placement.
    pub fn sync_layout(&mut self, result: &LayoutResult) -> Result<usize> {
        let fingerprint = layout_fingerprint(result);
        if self.fingerprint == Some(fingerprint) {
            return Ok(0);
        }

        let mut changed = 0;
        for (id, placement) in &result.placements {
            let state = self
                .entries
                .get_mut(id)
                .ok_or(MosaicError::UnknownTile(*id))?;
            if state.update_placement(*placement) {
                self.dirty.insert(*id);
                changed += 1;
            }
        }
        self.fingerprint = Some(fingerprint);
        Ok(changed)
    }

    pub fn fingerprint(&self) -> Option<Hash> {
        self.fingerprint
    }

    /// Drain tiles whose placement changed, in id order.
    pub fn take_dirty(&mut self) -> Vec<(TileId, TilePlacement)> {
        let ids = std::mem::take(&mut self.dirty);
        ids.into_iter()
            .filter_map(|id| {
                let state = self.entries.get_mut(&id)?;
                state.is_dirty = false;
                state.placement.map(|placement| (id, placement))
            })
            .collect()
    }

    /// Flag `ids` again, e.g. when pushing their styles failed. Unknown ids
    /// and tiles without a placement are ignored.
    pub fn mark_dirty(&mut self, ids: impl IntoIterator<Item = TileId>) {
        for id in ids {
            let Some(state) = self
                .entries
                .get_mut(&id)
                .filter(|state| state.placement.is_some())
            else {
                continue;
            };
            state.is_dirty = true;
            self.dirty.insert(id);
        }
    }

    /// Flag every tile that has a placement, e.g. after track sizes changed
    /// and offsets moved without any placement changing.
    pub fn mark_all_dirty(&mut self) {
        for (id, state) in &mut self.entries {
            if state.placement.is_some() {
                state.is_dirty = true;
                self.dirty.insert(*id);
            }
        }
    }

    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    /// Release all bookkeeping. Returns every id that was tracked.
    pub fn clear(&mut self) -> Vec<TileId> {
        self.entries.clear();
        self.dirty.clear();
        self.fingerprint = None;
        std::mem::take(&mut self.by_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Cell, Span};
    use crate::layout::LayoutParams;

    fn layout(placements: &[(u64, Option<(usize, usize)>)]) -> LayoutResult {
        let mut result = LayoutResult::empty(LayoutParams::new(4));
        for (id, cell) in placements {
            let placement = match cell {
                Some((row, col)) => TilePlacement::Placed {
                    cell: Cell::new(*row, *col),
                    span: Span::unit(),
                },
                None => TilePlacement::Unplaced {
                    reason: UnplacedReason::GridFull,
                },
            };
            result.placements.insert(TileId(*id), placement);
        }
        result
    }

    #[test]
    fn ids_are_monotonic_and_not_reused() {
        let mut registry = TileRegistry::new();
        assert_eq!(registry.sync_items(3), vec![TileId(0), TileId(1), TileId(2)]);
        assert_eq!(registry.sync_items(1), vec![TileId(0)]);
        assert_eq!(registry.sync_items(2), vec![TileId(0), TileId(3)]);
        assert_eq!(registry.state(TileId(3)).unwrap().index, 1);
    }

    #[test]
    fn only_changed_tiles_become_dirty() {
        let mut registry = TileRegistry::new();
        registry.sync_items(2);
        registry.sync_layout(&layout(&[(0, Some((0, 0))), (1, Some((0, 1)))])).unwrap();
        assert_eq!(registry.take_dirty().len(), 2);

        let changed = registry
            .sync_layout(&layout(&[(0, Some((0, 0))), (1, None)]))
            .unwrap();
        assert_eq!(changed, 1);
        let dirty = registry.take_dirty();
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty[0].0, TileId(1));
        assert!(!dirty[0].1.is_placed());
    }

    #[test]
    fn identical_layout_is_skipped_by_fingerprint() {
        let mut registry = TileRegistry::new();
        registry.sync_items(1);
        let first = layout(&[(0, Some((1, 1)))]);
        registry.sync_layout(&first).unwrap();
        registry.take_dirty();

        assert_eq!(registry.sync_layout(&first.clone()).unwrap(), 0);
        assert!(!registry.has_dirty());
        assert_eq!(registry.fingerprint(), Some(layout_fingerprint(&first)));
    }

    #[test]
    fn mark_all_dirty_skips_tiles_without_placement() {
        let mut registry = TileRegistry::new();
        registry.sync_items(2);
        registry.sync_layout(&layout(&[(0, Some((0, 0)))])).unwrap();
        registry.take_dirty();

        registry.mark_all_dirty();
        let dirty = registry.take_dirty();
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty[0].0, TileId(0));
    }

    #[test]
    fn mark_dirty_restores_drained_tiles() {
        let mut registry = TileRegistry::new();
        registry.sync_items(3);
        registry
            .sync_layout(&layout(&[(0, Some((0, 0))), (1, Some((0, 1))), (2, None)]))
            .unwrap();
        registry.take_dirty();

        registry.mark_dirty([TileId(1), TileId(2), TileId(9)]);
        let ids: Vec<_> = registry.take_dirty().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![TileId(1), TileId(2)]);
        assert!(registry.state(TileId(1)).is_some_and(|state| !state.is_dirty));
    }

    #[test]
    fn unknown_tiles_are_rejected() {
        let mut registry = TileRegistry::new();
        let err = registry.sync_layout(&layout(&[(7, None)])).unwrap_err();
        assert!(matches!(err, MosaicError::UnknownTile(TileId(7))));
    }

    #[test]
    fn clear_releases_everything() {
        let mut registry = TileRegistry::new();
        registry.sync_items(2);
        assert_eq!(registry.clear(), vec![TileId(0), TileId(1)]);
        assert!(registry.is_empty());
        assert!(registry.placement(TileId(0)).is_none());
    }
}
