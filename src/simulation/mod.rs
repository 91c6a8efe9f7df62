//! Parallel autoplay soak runs
//!
//! Plays many seeded games with random input across CPU cores and summarises
//! how they ended. Every frame goes through [`Board::update`], so the runs
//! double as a check that the board never reports a defect and that merges
//! conserve the tile sum.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use tracing::{info, warn};

use crate::board::{Board, Tick};
use crate::constants::{DEFAULT_BOARD_SIZE, MAX_MOVING_COUNT};
use crate::direction::RandomInput;
use crate::logging::TimingSpan;

/// Frames allowed per accepted move before a game is cut off
const FRAMES_PER_MOVE: u64 = 16 * (MAX_MOVING_COUNT as u64 + 2);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub game_count: u64,
    pub base_seed: u64,
    pub board_size: usize,
    pub max_moves: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            game_count: 1_000,
            base_seed: 42,
            board_size: DEFAULT_BOARD_SIZE,
            max_moves: 5_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    /// A spawn left the grid with no legal move
    NoMoves,
    /// Spawning found the grid full
    NoSpace,
    /// Cut off by `max_moves`
    MoveLimit,
    Defect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub seed: u64,
    pub outcome: GameOutcome,
    pub moves: u64,
    pub frames: u64,
    pub highest_tile: u32,
    pub tile_sum: u64,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimReport {
    pub total_games: u64,
    pub no_moves: u64,
    pub no_space: u64,
    pub move_limit: u64,
    pub defects: u64,
    pub avg_moves: f64,
    pub max_tile: u32,
    /// Highest tile reached -> number of games
    pub highest_tile_histogram: Vec<(u32, u64)>,
}

impl SimReport {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Per-game seed, stable across runs and thread counts
pub fn derive_seed(base_seed: u64, index: u64) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update(base_seed.to_le_bytes());
    hasher.update(index.to_le_bytes());
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[0..8]);
    u64::from_le_bytes(bytes)
}

/// Play one game to completion with uniformly random input
pub fn play_game(seed: u64, board_size: usize, max_moves: u64) -> GameRecord {
    let mut record = GameRecord {
        seed,
        outcome: GameOutcome::MoveLimit,
        moves: 0,
        frames: 0,
        highest_tile: 0,
        tile_sum: 0,
        error: None,
    };

    let mut board = match Board::new(board_size, seed) {
        Ok(board) => board,
        Err(err) => {
            record.outcome = if err.is_game_over() {
                GameOutcome::NoSpace
            } else {
                GameOutcome::Defect
            };
            record.error = Some(err.to_string());
            return record;
        }
    };
    let mut input = RandomInput::new(!seed);
    let mut expected_sum = grid_sum(&board);
    let frame_limit = max_moves.saturating_mul(FRAMES_PER_MOVE);

    while record.moves < max_moves && record.frames < frame_limit {
        record.frames += 1;
        match board.update(&mut input) {
            Ok(Tick::Moved(_)) => record.moves += 1,
            Ok(Tick::Spawned(id)) => {
                expected_sum += board.tile(id).map_or(0, |tile| u64::from(tile.value()));
                let sum = grid_sum(&board);
                if sum != expected_sum {
                    record.outcome = GameOutcome::Defect;
                    record.error = Some(format!(
                        "tile sum {} after commit, expected {}",
                        sum, expected_sum
                    ));
                    break;
                }
                if !board.has_moves() {
                    record.outcome = GameOutcome::NoMoves;
                    break;
                }
            }
            Ok(Tick::Idle | Tick::Blocked(_) | Tick::Settling) => {}
            Err(err) => {
                record.outcome = if err.is_game_over() {
                    GameOutcome::NoSpace
                } else {
                    GameOutcome::Defect
                };
                record.error = Some(err.to_string());
                break;
            }
        }
    }

    record.highest_tile = board.highest_tile();
    record.tile_sum = grid_sum(&board);
    record
}

fn grid_sum(board: &Board) -> u64 {
    board.grid().iter().map(|v| u64::from(*v)).sum()
}

/// Run `game_count` games in parallel with rayon
pub fn run_simulation(config: &SimConfig) -> SimReport {
    let _span = TimingSpan::new("run_simulation");
    let seeds: Vec<u64> = (0..config.game_count)
        .map(|i| derive_seed(config.base_seed, i))
        .collect();

    let records: Vec<GameRecord> = seeds
        .par_iter()
        .map(|seed| play_game(*seed, config.board_size, config.max_moves))
        .collect();

    let report = summarize(&records);
    info!(
        games = report.total_games,
        defects = report.defects,
        avg_moves = report.avg_moves,
        max_tile = report.max_tile,
        "simulation finished"
    );
    report
}

fn summarize(records: &[GameRecord]) -> SimReport {
    let mut report = SimReport {
        total_games: records.len() as u64,
        no_moves: 0,
        no_space: 0,
        move_limit: 0,
        defects: 0,
        avg_moves: 0.0,
        max_tile: 0,
        highest_tile_histogram: vec![],
    };
    if records.is_empty() {
        return report;
    }

    let mut histogram: BTreeMap<u32, u64> = BTreeMap::new();
    let mut total_moves = 0u64;
    for record in records {
        match record.outcome {
            GameOutcome::NoMoves => report.no_moves += 1,
            GameOutcome::NoSpace => report.no_space += 1,
            GameOutcome::MoveLimit => report.move_limit += 1,
            GameOutcome::Defect => {
                report.defects += 1;
                warn!(seed = record.seed, error = ?record.error, "defect during autoplay");
            }
        }
        total_moves += record.moves;
        report.max_tile = report.max_tile.max(record.highest_tile);
        *histogram.entry(record.highest_tile).or_insert(0) += 1;
    }
    report.avg_moves = total_moves as f64 / records.len() as f64;
    report.highest_tile_histogram = histogram.into_iter().collect();
    report
}
