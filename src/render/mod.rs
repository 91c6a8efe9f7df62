//! Renderer-facing view of the board.
//!
//! Nothing here draws. It turns board and tile state into pixel geometry a
//! renderer can consume directly: where each tile sits this frame, how large
//! it is, and in which order to paint.

use serde::{Deserialize, Serialize};

use crate::arena::TileId;
use crate::board::Board;
use crate::constants::{TILE_MARGIN, TILE_SIZE};
use crate::tile::{lerp, AnimationPhase, Tile};

/// Pixel geometry of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayout {
    pub tile_size: i32,
    pub tile_margin: i32,
}

impl Default for TileLayout {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            tile_margin: TILE_MARGIN,
        }
    }
}

impl TileLayout {
    /// Width and height of the whole board image
    pub fn board_pixels(&self, grid_size: usize) -> (i32, i32) {
        let n = grid_size as i32;
        let edge = n * self.tile_size + (n + 1) * self.tile_margin;
        (edge, edge)
    }

    /// Top-left pixel of cell `(x, y)`
    pub fn cell_origin(&self, x: usize, y: usize) -> (i32, i32) {
        let (i, j) = (x as i32, y as i32);
        (
            i * self.tile_size + (i + 1) * self.tile_margin,
            j * self.tile_size + (j + 1) * self.tile_margin,
        )
    }
}

/// Everything a renderer needs to paint one tile this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileSprite {
    pub id: TileId,
    pub value: u32,
    pub phase: AnimationPhase,
    /// Top-left pixel, interpolated while sliding
    pub x: i32,
    pub y: i32,
    /// Scale about the tile centre
    pub scale: f64,
}

impl TileSprite {
    pub fn from_tile(id: TileId, tile: &Tile, layout: &TileLayout) -> Self {
        let (x, y) = tile.pos();
        let (mut px, mut py) = layout.cell_origin(x, y);
        if tile.is_moving() {
            let (nx, ny) = tile.next_pos();
            let (tx, ty) = layout.cell_origin(nx, ny);
            let rate = tile.slide_rate();
            px = blend(px, tx, rate);
            py = blend(py, ty, rate);
        }
        Self {
            id,
            value: tile.value(),
            phase: tile.phase(),
            x: px,
            y: py,
            scale: tile.scale(),
        }
    }
}

impl Board {
    /// Pixel size of the board image for `layout`
    pub fn pixel_size(&self, layout: &TileLayout) -> (i32, i32) {
        layout.board_pixels(self.size())
    }
}

/// Sprites in paint order: resting tiles first, sliding tiles on top.
/// Empty tiles are skipped.
pub fn sprites(board: &Board, layout: &TileLayout) -> Vec<TileSprite> {
    let (moving, resting): (Vec<_>, Vec<_>) = board
        .tiles()
        .filter(|(_, tile)| tile.value() > 0)
        .partition(|(_, tile)| tile.is_moving());
    resting
        .into_iter()
        .chain(moving)
        .map(|(id, tile)| TileSprite::from_tile(id, tile, layout))
        .collect()
}

fn blend(a: i32, b: i32, rate: f64) -> i32 {
    lerp(a as f64, b as f64, rate) as i32
}
