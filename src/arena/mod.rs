//! Tile storage addressed by stable handles.
//!
//! Tiles live in an ordered map keyed by [`TileId`]; handles are never reused
//! during a board's lifetime. Two cell indexes are maintained incrementally
//! so lookups by cell never scan the whole tile set:
//!
//! - `resting`: non-moving tiles, keyed by their current cell
//! - `arriving`: moving tiles that survive the move, keyed by their destination
//!
//! Consumed tiles (sliding into a merge with `next.value == 0`) are in
//! neither index; they linger in the map until [`TileArena::purge`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_BOARD_SIZE;
use crate::error::{BoardError, InvariantViolation};
use crate::tile::{Tile, TileData};

/// Stable handle to a tile inside a [`TileArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u32);

impl TileId {
    pub fn index(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct TileArena {
    size: usize,
    tiles: BTreeMap<TileId, Tile>,
    next_id: u32,
    resting: Vec<Option<TileId>>,
    arriving: Vec<Option<TileId>>,
}

impl TileArena {
    /// An empty `size`x`size` arena; `size` must be in `1..=MAX_BOARD_SIZE`.
    pub fn new(size: usize) -> Result<Self, BoardError> {
        if !(1..=MAX_BOARD_SIZE).contains(&size) {
            return Err(BoardError::InvalidSize {
                size,
                max: MAX_BOARD_SIZE,
            });
        }
        Ok(Self {
            size,
            tiles: BTreeMap::new(),
            next_id: 0,
            resting: vec![None; size * size],
            arriving: vec![None; size * size],
        })
    }

    /// Grid edge length
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileId, &Tile)> {
        self.tiles.iter().map(|(id, tile)| (*id, tile))
    }

    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    pub(crate) fn tile(&self, id: TileId) -> Result<Tile, BoardError> {
        self.tiles
            .get(&id)
            .copied()
            .ok_or_else(|| InvariantViolation::UnknownTile(id).into())
    }

    fn index(&self, x: usize, y: usize) -> Result<usize, BoardError> {
        if x >= self.size || y >= self.size {
            return Err(InvariantViolation::OutOfBounds {
                x,
                y,
                size: self.size,
            }
            .into());
        }
        Ok(y * self.size + x)
    }

    /// Add a resting tile. Fails if its cell is off-grid or already held.
    pub fn insert(&mut self, tile: Tile) -> Result<TileId, BoardError> {
        if tile.is_moving() || !tile.next.is_empty() {
            let (x, y) = tile.pos();
            return Err(InvariantViolation::StalePending { x, y }.into());
        }
        let (x, y) = tile.pos();
        let idx = self.index(x, y)?;
        if self.resting[idx].is_some() || self.arriving[idx].is_some() {
            return Err(InvariantViolation::DuplicateTile { x, y }.into());
        }
        let id = TileId(self.next_id);
        self.next_id += 1;
        self.tiles.insert(id, tile);
        if tile.value() > 0 {
            self.resting[idx] = Some(id);
        }
        Ok(id)
    }

    /// The resting tile whose current cell is `(x, y)`
    pub fn tile_at(&self, x: usize, y: usize) -> Option<TileId> {
        self.index(x, y).ok().and_then(|idx| self.resting[idx])
    }

    /// The tile that holds `(x, y)` now or will hold it once sliding ends.
    pub fn current_or_next_at(&self, x: usize, y: usize) -> Result<Option<TileId>, BoardError> {
        let idx = self.index(x, y)?;
        match (self.resting[idx], self.arriving[idx]) {
            (Some(_), Some(_)) => Err(InvariantViolation::DuplicateTile { x, y }.into()),
            (resting, arriving) => Ok(resting.or(arriving)),
        }
    }

    /// Start sliding a resting tile towards `next`.
    pub(crate) fn begin_slide(&mut self, id: TileId, next: TileData) -> Result<(), BoardError> {
        let tile = self.tile(id)?;
        let from = self.index(tile.current.x, tile.current.y)?;
        let to = self.index(next.x, next.y)?;
        if self.arriving[to].is_some() {
            return Err(InvariantViolation::DuplicateTile {
                x: next.x,
                y: next.y,
            }
            .into());
        }
        if self.resting[from] == Some(id) {
            self.resting[from] = None;
        }
        if let Some(tile) = self.tiles.get_mut(&id) {
            tile.begin_slide(next);
        }
        self.arriving[to] = Some(id);
        Ok(())
    }

    /// Mark a tile as absorbed by a merge landing on `(x, y)`.
    pub(crate) fn consume(&mut self, id: TileId, x: usize, y: usize) -> Result<(), BoardError> {
        let tile = self.tile(id)?;
        if tile.is_moving() {
            let idx = self.index(tile.next.x, tile.next.y)?;
            if self.arriving[idx] == Some(id) {
                self.arriving[idx] = None;
            }
        } else {
            let idx = self.index(tile.current.x, tile.current.y)?;
            if self.resting[idx] == Some(id) {
                self.resting[idx] = None;
            }
        }
        if let Some(tile) = self.tiles.get_mut(&id) {
            tile.consume(x, y);
        }
        Ok(())
    }

    /// Drop every pending slide without touching other counters.
    pub(crate) fn clear_pending(&mut self) -> Result<(), BoardError> {
        for tile in self.tiles.values_mut() {
            tile.clear_pending();
        }
        self.reindex()
    }

    /// Fails on the first tile that is sliding or still carries a pending state.
    pub fn ensure_settled(&self) -> Result<(), BoardError> {
        for tile in self.tiles.values() {
            let (x, y) = tile.pos();
            if tile.is_moving() {
                return Err(InvariantViolation::StillMoving { x, y }.into());
            }
            if !tile.next.is_empty() {
                return Err(InvariantViolation::StalePending { x, y }.into());
            }
        }
        Ok(())
    }

    pub fn any_moving(&self) -> bool {
        self.tiles.values().any(Tile::is_moving)
    }

    /// Advance every tile one frame, moving landed tiles into the resting index.
    pub(crate) fn tick(&mut self) -> Result<(), BoardError> {
        let size = self.size;
        let Self {
            tiles,
            resting,
            arriving,
            ..
        } = self;
        for (id, tile) in tiles.iter_mut() {
            let was_moving = tile.is_moving();
            let target = tile.next;
            tile.update();
            if !was_moving || tile.is_moving() {
                continue;
            }
            let idx = target.y * size + target.x;
            if arriving[idx] == Some(*id) {
                arriving[idx] = None;
            }
            if tile.value() > 0 {
                if resting[idx].is_some() {
                    return Err(InvariantViolation::DuplicateTile {
                        x: target.x,
                        y: target.y,
                    }
                    .into());
                }
                resting[idx] = Some(*id);
            }
        }
        Ok(())
    }

    /// Snap every tile to rest and rebuild the indexes.
    pub(crate) fn stop_animations(&mut self) -> Result<(), BoardError> {
        for tile in self.tiles.values_mut() {
            tile.stop_animation();
        }
        self.reindex()
    }

    /// Drop tiles whose value reached zero. The board must be settled.
    pub(crate) fn purge(&mut self) -> Result<usize, BoardError> {
        for tile in self.tiles.values() {
            let (x, y) = tile.pos();
            if tile.is_moving() {
                return Err(InvariantViolation::StillMoving { x, y }.into());
            }
            if tile.next.value != 0 {
                return Err(InvariantViolation::StalePending { x, y }.into());
            }
        }
        let before = self.tiles.len();
        self.tiles.retain(|_, tile| tile.value() > 0);
        self.reindex()?;
        Ok(before - self.tiles.len())
    }

    /// Cells with no resting tile, row-major
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.resting
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(idx, _)| (idx % self.size, idx / self.size))
            .collect()
    }

    fn reindex(&mut self) -> Result<(), BoardError> {
        self.resting.iter_mut().for_each(|slot| *slot = None);
        self.arriving.iter_mut().for_each(|slot| *slot = None);
        for (id, tile) in &self.tiles {
            let data = if tile.is_moving() {
                tile.next
            } else {
                tile.current
            };
            if data.value == 0 {
                continue;
            }
            let idx = self.index(data.x, data.y)?;
            let slot = if tile.is_moving() {
                &mut self.arriving[idx]
            } else {
                &mut self.resting[idx]
            };
            if slot.is_some() {
                return Err(InvariantViolation::DuplicateTile {
                    x: data.x,
                    y: data.y,
                }
                .into());
            }
            *slot = Some(*id);
        }
        Ok(())
    }
}
