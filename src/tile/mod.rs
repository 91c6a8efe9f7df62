//! Tiles and their per-frame animation state machine.
//!
//! A tile carries two snapshots: `current` (what is on the board now) and
//! `next` (where it is heading while it slides). Three counters drive the
//! animations; at most one of them is non-zero at any time.
//!
//! ```text
//! Idle ──move──► Sliding ──landed, merged──► MergePopping ──► Idle
//!                   │
//!                   └────landed, no merge──► Idle
//! spawn ─────────► SpawnGrowing ───────────► Idle
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_MOVING_COUNT, MAX_POPPING_COUNT, MERGE_POP_MAX_SCALE};

/// Value and cell of a tile. The all-zero value doubles as "no pending state".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileData {
    pub value: u32,
    pub x: usize,
    pub y: usize,
}

impl TileData {
    pub const EMPTY: TileData = TileData {
        value: 0,
        x: 0,
        y: 0,
    };

    pub fn new(value: u32, x: usize, y: usize) -> Self {
        Self { value, x, y }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    pub fn pos(&self) -> (usize, usize) {
        (self.x, self.y)
    }
}

/// Which animation a tile is playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationPhase {
    Idle,
    Sliding,
    SpawnGrowing,
    MergePopping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub(crate) current: TileData,
    pub(crate) next: TileData,
    pub(crate) moving_count: u32,
    pub(crate) start_popping_count: u32,
    pub(crate) popping_count: u32,
}

impl Tile {
    /// A freshly spawned tile, growing in from nothing
    pub fn new(value: u32, x: usize, y: usize) -> Self {
        Self {
            start_popping_count: MAX_POPPING_COUNT,
            ..Self::settled(value, x, y)
        }
    }

    /// A tile already at rest, with no animation armed
    pub fn settled(value: u32, x: usize, y: usize) -> Self {
        Self {
            current: TileData::new(value, x, y),
            next: TileData::EMPTY,
            moving_count: 0,
            start_popping_count: 0,
            popping_count: 0,
        }
    }

    pub fn pos(&self) -> (usize, usize) {
        self.current.pos()
    }

    pub fn next_pos(&self) -> (usize, usize) {
        self.next.pos()
    }

    pub fn value(&self) -> u32 {
        self.current.value
    }

    pub fn next_value(&self) -> u32 {
        self.next.value
    }

    pub fn current(&self) -> TileData {
        self.current
    }

    pub fn next(&self) -> TileData {
        self.next
    }

    pub fn is_moving(&self) -> bool {
        self.moving_count > 0
    }

    /// Sliding into a cell with a different resulting value (merge in flight)
    pub fn is_merging(&self) -> bool {
        self.is_moving() && self.current.value != self.next.value
    }

    pub fn phase(&self) -> AnimationPhase {
        if self.moving_count > 0 {
            AnimationPhase::Sliding
        } else if self.start_popping_count > 0 {
            AnimationPhase::SpawnGrowing
        } else if self.popping_count > 0 {
            AnimationPhase::MergePopping
        } else {
            AnimationPhase::Idle
        }
    }

    /// Number of animation counters currently running (0 or 1 when sound)
    pub(crate) fn active_counters(&self) -> usize {
        [self.moving_count, self.start_popping_count, self.popping_count]
            .iter()
            .filter(|c| **c > 0)
            .count()
    }

    /// Advance one frame.
    pub fn update(&mut self) {
        if self.moving_count > 0 {
            self.moving_count -= 1;
            if self.moving_count == 0 {
                if self.current.value != self.next.value && self.next.value > 0 {
                    self.popping_count = MAX_POPPING_COUNT;
                }
                self.current = self.next;
                self.next = TileData::EMPTY;
            }
        } else if self.start_popping_count > 0 {
            self.start_popping_count -= 1;
        } else if self.popping_count > 0 {
            self.popping_count -= 1;
        }
    }

    /// Snap to the end of any animation. Calling it again is a no-op.
    pub fn stop_animation(&mut self) {
        if self.moving_count > 0 {
            self.current = self.next;
            self.next = TileData::EMPTY;
        }
        self.moving_count = 0;
        self.start_popping_count = 0;
        self.popping_count = 0;
    }

    pub(crate) fn begin_slide(&mut self, next: TileData) {
        self.next = next;
        self.moving_count = MAX_MOVING_COUNT;
    }

    /// Absorbed by a merge: slides into `(x, y)` and vanishes on landing.
    pub(crate) fn consume(&mut self, x: usize, y: usize) {
        self.next = TileData::new(0, x, y);
        self.moving_count = MAX_MOVING_COUNT;
    }

    pub(crate) fn clear_pending(&mut self) {
        self.next = TileData::EMPTY;
        self.moving_count = 0;
    }

    /// Slide progress in `[0, 1)`; 0 when not sliding
    pub fn slide_rate(&self) -> f64 {
        if self.moving_count == 0 {
            return 0.0;
        }
        1.0 - self.moving_count as f64 / MAX_MOVING_COUNT as f64
    }

    /// Draw scale: ramps 0 → 1 while spawning, 1 → 1.2 → 1 while popping.
    pub fn scale(&self) -> f64 {
        match self.phase() {
            AnimationPhase::Idle | AnimationPhase::Sliding => 1.0,
            AnimationPhase::SpawnGrowing => {
                let rate =
                    1.0 - self.start_popping_count as f64 / MAX_POPPING_COUNT as f64;
                lerp(0.0, 1.0, rate)
            }
            AnimationPhase::MergePopping => {
                let max = MAX_POPPING_COUNT;
                let count = self.popping_count;
                // counters run downward: the top third grows, the rest shrinks back
                let rate = if max * 2 / 3 <= count {
                    1.0 - (count - max * 2 / 3) as f64 / (max / 3) as f64
                } else {
                    count as f64 / (max * 2 / 3) as f64
                };
                lerp(1.0, MERGE_POP_MAX_SCALE, rate)
            }
        }
    }
}

pub(crate) fn lerp(a: f64, b: f64, rate: f64) -> f64 {
    a * (1.0 - rate) + b * rate
}
