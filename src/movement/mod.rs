//! Move resolution: where every tile ends up when the board is pushed in a
//! direction, and which tiles merge on the way.
//!
//! Cells are scanned starting from the wall the tiles move towards, so every
//! tile is resolved after the tiles in front of it. A tile slides one cell at
//! a time until it would leave the grid, hit a tile of a different value, or
//! hit a tile that is already merging this move. Meeting a tile of equal value
//! that is not mid-merge ends the slide with a merge into that tile's cell.

use tracing::debug;

use crate::arena::TileArena;
use crate::direction::Direction;
use crate::error::BoardError;
use crate::tile::TileData;

/// Resolve a move in place. Returns `true` iff at least one tile changes cell.
///
/// The arena must be settled; a sliding tile or leftover pending state is a
/// defect and nothing is touched.
///
/// Moving tiles get `next` set and their slide counter armed; merge partners
/// are marked consumed. When nothing moves every pending state is cleared.
pub fn resolve(arena: &mut TileArena, dir: Direction) -> Result<bool, BoardError> {
    arena.ensure_settled()?;
    let size = arena.size();
    let (vx, vy) = dir.vector();
    let xs = scan_order(size, vx);
    let ys = scan_order(size, vy);

    let mut moved = false;
    for &y in &ys {
        for &x in &xs {
            let Some(id) = arena.tile_at(x, y) else {
                continue;
            };
            let tile = arena.tile(id)?;

            let value = tile.value();
            let (mut dx, mut dy) = (x, y);
            while let Some((nx, ny)) = step(dx, dy, vx, vy, size) {
                let Some(other_id) = arena.current_or_next_at(nx, ny)? else {
                    dx = nx;
                    dy = ny;
                    moved = true;
                    continue;
                };
                let other = arena.tile(other_id)?;
                if other.value() != value || other.is_merging() {
                    break;
                }
                dx = nx;
                dy = ny;
                moved = true;
                break;
            }

            let mut next = TileData::new(value, dx, dy);
            if let Some(partner) = arena.current_or_next_at(dx, dy)? {
                if partner != id {
                    next.value = value + arena.tile(partner)?.value();
                    arena.consume(partner, dx, dy)?;
                }
            }
            if tile.current() != next {
                arena.begin_slide(id, next)?;
            }
        }
    }

    if !moved {
        arena.clear_pending()?;
    }
    debug!(
        direction = dir.as_str(),
        moved,
        tiles = arena.len(),
        "move resolved"
    );
    Ok(moved)
}

/// `0..size`, reversed when the direction component is positive
fn scan_order(size: usize, v: isize) -> Vec<usize> {
    if v > 0 {
        (0..size).rev().collect()
    } else {
        (0..size).collect()
    }
}

/// The neighbouring cell one step along `(vx, vy)`, if it is on the grid
fn step(x: usize, y: usize, vx: isize, vy: isize, size: usize) -> Option<(usize, usize)> {
    let nx = x.checked_add_signed(vx)?;
    let ny = y.checked_add_signed(vy)?;
    (nx < size && ny < size).then_some((nx, ny))
}
