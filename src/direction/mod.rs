//! Move directions and the input collaborator seam.
//!
//! The board never reads devices itself: each frame it polls an
//! [`InputSource`] for at most one directional intent. Debouncing and
//! key-repeat handling belong to the source.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// One of the four cardinal move directions. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Unit offset `(dx, dy)` for one step in this direction
    pub fn vector(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        }
    }
}

/// Something that reports at most one fresh directional intent per frame.
///
/// Every `Some` is treated as a new move attempt.
pub trait InputSource {
    fn dir(&mut self) -> Option<Direction>;
}

/// A one-shot slot: yields its direction once, then nothing.
impl InputSource for Option<Direction> {
    fn dir(&mut self) -> Option<Direction> {
        self.take()
    }
}

/// Replays a fixed list of directions, one per poll.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    queue: VecDeque<Direction>,
    polls: u64,
}

impl ScriptedInput {
    pub fn new<I: IntoIterator<Item = Direction>>(moves: I) -> Self {
        Self {
            queue: moves.into_iter().collect(),
            polls: 0,
        }
    }

    pub fn push(&mut self, dir: Direction) {
        self.queue.push_back(dir);
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// How many times the board asked for input
    pub fn polls(&self) -> u64 {
        self.polls
    }
}

impl InputSource for ScriptedInput {
    fn dir(&mut self) -> Option<Direction> {
        self.polls += 1;
        self.queue.pop_front()
    }
}

/// Uniformly random directions from a seeded generator (autoplay)
#[derive(Debug, Clone)]
pub struct RandomInput {
    rng: Xoshiro256PlusPlus,
}

impl RandomInput {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    pub fn next_direction(&mut self) -> Direction {
        Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())]
    }
}

impl InputSource for RandomInput {
    fn dir(&mut self) -> Option<Direction> {
        Some(self.next_direction())
    }
}
