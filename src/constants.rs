//! Centralized game constants for the 2048 board core.
//!
//! Animation timings are expressed in frame ticks: one tick is one call to
//! `Board::update` by the host loop.

// =====================================================
// Animation
// =====================================================

/// Frames a tile spends sliding from its origin to its destination
pub const MAX_MOVING_COUNT: u32 = 5;

/// Frames of the spawn-grow and merge-pop animations
pub const MAX_POPPING_COUNT: u32 = 6;

/// Peak scale reached halfway through a merge pop
pub const MERGE_POP_MAX_SCALE: f64 = 1.2;

// =====================================================
// Spawning
// =====================================================

/// A spawned tile is a 4 with probability 1 / SPAWN_FOUR_ONE_IN, else a 2
pub const SPAWN_FOUR_ONE_IN: u32 = 10;

/// Value of a regular spawned tile
pub const SPAWN_VALUE_COMMON: u32 = 2;

/// Value of a rare spawned tile
pub const SPAWN_VALUE_RARE: u32 = 4;

/// Tiles placed on a fresh board
pub const INITIAL_TILES: usize = 2;

// =====================================================
// Board
// =====================================================

/// Default grid edge length
pub const DEFAULT_BOARD_SIZE: usize = 4;

/// Smallest grid edge accepted by the config layer
pub const MIN_BOARD_SIZE: usize = 2;

/// Largest grid edge accepted by the config layer
pub const MAX_BOARD_SIZE: usize = 16;

// =====================================================
// Pixel layout (renderer collaborator)
// =====================================================

/// Edge of a single tile in pixels
pub const TILE_SIZE: i32 = 80;

/// Gap between tiles (and around the border) in pixels
pub const TILE_MARGIN: i32 = 4;
