//! End-to-end board flow tests
//!
//! Drives boards frame by frame through the public API, the way a host does:
//! - a move, the settle wait and the commit frame
//! - blocked input never queues work
//! - same seed and input give the same game
//! - input is never buffered while a move is in flight

use twenty48_core::board::{Board, Task, Tick};
use twenty48_core::constants::MAX_MOVING_COUNT;
use twenty48_core::direction::{Direction, ScriptedInput};
use twenty48_core::render::{sprites, TileLayout};
use twenty48_core::tile::AnimationPhase;

// ============================================================
// Helpers
// ============================================================

/// Run frames with no input until the board reports a spawn
fn run_to_spawn(board: &mut Board) -> Tick {
    let mut none: Option<Direction> = None;
    for _ in 0..32 {
        let tick = board.update(&mut none).unwrap();
        if matches!(tick, Tick::Spawned(_)) {
            return tick;
        }
    }
    panic!("board never committed");
}

fn occupied(board: &Board) -> usize {
    board.grid().iter().filter(|v| **v > 0).count()
}

// ============================================================
// 1. Single moves
// ============================================================

#[test]
fn pair_merges_on_small_board() {
    let mut board = Board::from_values(2, &[2, 2, 0, 0], 17).unwrap();
    let mut input = Some(Direction::Left);
    assert_eq!(
        board.update(&mut input).unwrap(),
        Tick::Moved(Direction::Left)
    );

    let Tick::Spawned(id) = run_to_spawn(&mut board) else {
        unreachable!()
    };
    let grid = board.grid();
    assert_eq!(grid[0], 4);
    assert_eq!(occupied(&board), 2);

    let spawned = board.tile(id).unwrap();
    assert_ne!(spawned.pos(), (0, 0));
    assert_eq!(spawned.phase(), AnimationPhase::SpawnGrowing);
}

#[test]
fn gap_merge_lands_against_far_wall() {
    let mut values = vec![0; 16];
    values[0] = 2;
    values[3] = 2;
    let mut board = Board::from_values(4, &values, 3).unwrap();
    let mut input = Some(Direction::Right);
    board.update(&mut input).unwrap();
    run_to_spawn(&mut board);

    let grid = board.grid();
    assert_eq!(grid[3], 4);
    assert_eq!(occupied(&board), 2);
}

#[test]
fn locked_checkerboard_blocks_every_direction() {
    let values: Vec<u32> = (0..16)
        .map(|i| if (i % 4 + i / 4) % 2 == 0 { 2 } else { 4 })
        .collect();
    let mut board = Board::from_values(4, &values, 0).unwrap();
    assert!(!board.has_moves());

    let mut input = ScriptedInput::new(Direction::ALL);
    for dir in Direction::ALL {
        assert_eq!(board.update(&mut input).unwrap(), Tick::Blocked(dir));
        assert_eq!(board.tasks().count(), 0);
    }
    assert_eq!(board.grid(), values);
    assert_eq!(board.tiles().count(), 16);
}

// ============================================================
// 2. Task sequencing
// ============================================================

#[test]
fn tasks_drain_in_order() {
    let mut board = Board::from_values(3, &[0, 0, 2, 0, 0, 0, 0, 0, 0], 5).unwrap();
    let mut input = Some(Direction::Left);
    board.update(&mut input).unwrap();
    assert_eq!(
        board.tasks().copied().collect::<Vec<_>>(),
        vec![Task::AwaitSettle, Task::CommitAndSpawn]
    );

    let mut none: Option<Direction> = None;
    for frame in 1..=MAX_MOVING_COUNT {
        assert_eq!(board.update(&mut none).unwrap(), Tick::Settling);
        let expected = if frame < MAX_MOVING_COUNT { 2 } else { 1 };
        assert_eq!(board.tasks().count(), expected, "frame {frame}");
    }
    assert!(matches!(board.update(&mut none).unwrap(), Tick::Spawned(_)));
    assert!(board.is_idle());
    assert_eq!(board.grid()[0], 2);
}

#[test]
fn input_is_not_buffered_while_busy() {
    let mut board = Board::from_values(2, &[0, 2, 0, 0], 9).unwrap();
    let mut input = ScriptedInput::new([Direction::Left]);
    board.update(&mut input).unwrap();

    // presses arriving mid-move are offered as one-shot slots and lost
    for _ in 0..MAX_MOVING_COUNT {
        let mut press = Some(Direction::Right);
        assert_eq!(board.update(&mut press).unwrap(), Tick::Settling);
        assert_eq!(press, Some(Direction::Right), "busy board must not poll");
    }
    run_to_spawn(&mut board);
    assert!(board.is_idle());
    assert_eq!(board.grid()[0], 2);
}

#[test]
fn sliding_tiles_paint_on_top() {
    let mut board = Board::from_values(2, &[2, 0, 0, 4], 1).unwrap();
    let mut input = Some(Direction::Up);
    board.update(&mut input).unwrap();
    board.update(&mut None::<Direction>).unwrap();

    let sprites = sprites(&board, &TileLayout::default());
    assert_eq!(sprites.len(), 2);
    assert_eq!(sprites[0].value, 2);
    assert_eq!(sprites[1].value, 4);
    assert_eq!(sprites[1].phase, AnimationPhase::Sliding);
}

// ============================================================
// 3. Determinism
// ============================================================

#[test]
fn same_seed_same_game() {
    let script = [
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Down,
    ]
    .repeat(10);
    let play = |seed: u64| {
        let mut board = Board::new(4, seed).unwrap();
        let mut input = ScriptedInput::new(script.clone());
        let mut ticks = Vec::new();
        for _ in 0..400 {
            ticks.push(board.update(&mut input).unwrap());
        }
        (ticks, board.grid(), board.fingerprint())
    };
    assert_eq!(play(2048), play(2048));
}
