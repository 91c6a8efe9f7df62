//! The board: tile set, per-frame driver and post-move task sequencing.
//!
//! Every frame the host calls [`Board::update`] exactly once. The order of
//! work inside a frame is fixed:
//!
//! 1. every tile advances its animation counters
//! 2. if a task is pending, the front task runs and the frame ends
//! 3. otherwise the input source is polled and a move may start
//!
//! A move that changes the board queues [`Task::AwaitSettle`] followed by
//! [`Task::CommitAndSpawn`]. While either is queued, input is not even polled.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use tracing::{debug, trace, warn};

use crate::arena::{TileArena, TileId};
use crate::config::{ConfigError, GameConfig};
use crate::constants::INITIAL_TILES;
use crate::direction::{Direction, InputSource};
use crate::error::BoardError;
use crate::movement;
use crate::spawn;
use crate::tile::Tile;

/// A deferred step of the post-move pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    /// Re-checked every frame until no tile is sliding
    AwaitSettle,
    /// Runs once: drop consumed tiles, then spawn a new one
    CommitAndSpawn,
}

/// Outcome of running a task for one frame (failure travels as `Err`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Done,
}

/// What a single call to [`Board::update`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Nothing queued and no input
    Idle,
    /// Input arrived but would not change the board
    Blocked(Direction),
    /// A move started; the post-move tasks are queued
    Moved(Direction),
    /// Waiting for slides to finish
    Settling,
    /// The move was committed and a tile spawned
    Spawned(TileId),
}

/// Result of asking the board to move directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Unchanged,
    /// Rejected: a previous move is still in flight
    Busy,
}

#[derive(Debug, Clone)]
pub struct Board {
    arena: TileArena,
    tasks: VecDeque<Task>,
    rng: Xoshiro256PlusPlus,
}

impl Board {
    /// A fresh board with the two opening tiles placed at random.
    pub fn new(size: usize, seed: u64) -> Result<Self, BoardError> {
        Self::with_initial_tiles(size, seed, INITIAL_TILES)
    }

    /// A fresh board sized by a validated `config`.
    pub fn from_config(config: &GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_initial_tiles(
            config.board_size,
            seed,
            config.initial_tiles,
        )?)
    }

    fn with_initial_tiles(size: usize, seed: u64, count: usize) -> Result<Self, BoardError> {
        let mut board = Self::empty(size, seed)?;
        for _ in 0..count {
            spawn::spawn(&mut board.arena, &mut board.rng)?;
        }
        debug!(size, seed, tiles = board.arena.len(), "board created");
        Ok(board)
    }

    /// A settled board from a row-major grid (`0` = empty). Nothing is spawned.
    pub fn from_values(size: usize, values: &[u32], seed: u64) -> Result<Self, BoardError> {
        let mut board = Self::empty(size, seed)?;
        for (idx, &value) in values.iter().enumerate() {
            if value > 0 {
                board
                    .arena
                    .insert(Tile::settled(value, idx % size, idx / size))?;
            }
        }
        Ok(board)
    }

    fn empty(size: usize, seed: u64) -> Result<Self, BoardError> {
        Ok(Self {
            arena: TileArena::new(size)?,
            tasks: VecDeque::new(),
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        })
    }

    /// Grid edge length
    pub fn size(&self) -> usize {
        self.arena.size()
    }

    pub fn tiles(&self) -> impl Iterator<Item = (TileId, &Tile)> {
        self.arena.iter()
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.arena.get(id)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// No post-move task is queued; the next frame will accept input
    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn is_animating(&self) -> bool {
        self.arena
            .iter()
            .any(|(_, tile)| tile.active_counters() > 0)
    }

    /// Advance one frame.
    ///
    /// `Err(NoSpace)` is the end of the game; any other error is a defect and
    /// the host should stop driving the board.
    pub fn update<I: InputSource + ?Sized>(&mut self, input: &mut I) -> Result<Tick, BoardError> {
        self.arena.tick().inspect_err(log_defect)?;

        if let Some(task) = self.tasks.front().copied() {
            let status = self.run_task(task).inspect_err(log_defect)?;
            if status == TaskStatus::Done {
                trace!(?task, "task done");
                self.tasks.pop_front();
            }
            return Ok(match task {
                Task::AwaitSettle => Tick::Settling,
                Task::CommitAndSpawn => self.last_spawned().map_or(Tick::Settling, Tick::Spawned),
            });
        }

        let Some(dir) = input.dir() else {
            return Ok(Tick::Idle);
        };
        match self.move_tiles(dir)? {
            MoveOutcome::Moved => Ok(Tick::Moved(dir)),
            MoveOutcome::Unchanged | MoveOutcome::Busy => Ok(Tick::Blocked(dir)),
        }
    }

    /// Start a move immediately. Rejected with `Busy` while tasks are queued.
    pub fn move_tiles(&mut self, dir: Direction) -> Result<MoveOutcome, BoardError> {
        if !self.is_idle() {
            debug!(direction = dir.as_str(), "move rejected, board busy");
            return Ok(MoveOutcome::Busy);
        }
        self.arena.stop_animations().inspect_err(log_defect)?;
        if !movement::resolve(&mut self.arena, dir).inspect_err(log_defect)? {
            return Ok(MoveOutcome::Unchanged);
        }
        self.tasks.push_back(Task::AwaitSettle);
        self.tasks.push_back(Task::CommitAndSpawn);
        Ok(MoveOutcome::Moved)
    }

    /// Run one frame's worth of `task`.
    pub fn run_task(&mut self, task: Task) -> Result<TaskStatus, BoardError> {
        match task {
            Task::AwaitSettle => {
                if self.arena.any_moving() {
                    Ok(TaskStatus::Pending)
                } else {
                    Ok(TaskStatus::Done)
                }
            }
            Task::CommitAndSpawn => {
                let purged = self.arena.purge()?;
                let id = spawn::spawn(&mut self.arena, &mut self.rng)?;
                trace!(purged, spawned = ?id, "move committed");
                Ok(TaskStatus::Done)
            }
        }
    }

    fn last_spawned(&self) -> Option<TileId> {
        self.arena.iter().map(|(id, _)| id).max()
    }

    /// Run frames without input until the task queue drains.
    ///
    /// `Some(frames)` once idle, `None` if tasks are still queued after
    /// `max_ticks` frames.
    pub fn settle(&mut self, max_ticks: u32) -> Result<Option<u32>, BoardError> {
        let mut none: Option<Direction> = None;
        for ticks in 0..max_ticks {
            if self.is_idle() {
                return Ok(Some(ticks));
            }
            self.update(&mut none)?;
        }
        Ok(self.is_idle().then_some(max_ticks))
    }

    /// Would a move in `dir` change the board once the current move settles?
    pub fn can_move(&self, dir: Direction) -> bool {
        let mut probe = self.arena.clone();
        probe.stop_animations().is_ok()
            && probe.purge().is_ok()
            && movement::resolve(&mut probe, dir).unwrap_or(false)
    }

    /// At least one direction is still playable
    pub fn has_moves(&self) -> bool {
        Direction::ALL.iter().any(|dir| self.can_move(*dir))
    }

    /// Row-major values of tiles at their current cells (meaningful once idle)
    pub fn grid(&self) -> Vec<u32> {
        let size = self.size();
        let mut grid = vec![0; size * size];
        for (_, tile) in self.arena.iter() {
            let (x, y) = tile.pos();
            if tile.value() > 0 {
                grid[y * size + x] = tile.value();
            }
        }
        grid
    }

    pub fn highest_tile(&self) -> u32 {
        self.arena
            .iter()
            .map(|(_, tile)| tile.value().max(tile.next_value()))
            .max()
            .unwrap_or(0)
    }

    /// Digest of the full tile state including animation counters
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Sha3_256::new();
        hasher.update((self.size() as u64).to_le_bytes());
        for (id, tile) in self.arena.iter() {
            hasher.update(id.index().to_le_bytes());
            for data in [tile.current, tile.next] {
                hasher.update(data.value.to_le_bytes());
                hasher.update((data.x as u64).to_le_bytes());
                hasher.update((data.y as u64).to_le_bytes());
            }
            hasher.update(tile.moving_count.to_le_bytes());
            hasher.update(tile.start_popping_count.to_le_bytes());
            hasher.update(tile.popping_count.to_le_bytes());
        }
        hasher.update((self.tasks.len() as u64).to_le_bytes());
        let result = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&result[0..8]);
        u64::from_le_bytes(bytes)
    }
}

fn log_defect(err: &BoardError) {
    if err.is_defect() {
        warn!(error = %err, "board invariant violated");
    }
}
