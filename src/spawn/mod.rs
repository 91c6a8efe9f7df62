//! Random tile spawning.
//!
//! The random source is always passed in explicitly, so a seeded generator
//! reproduces the same sequence of spawns.

use rand::Rng;
use tracing::debug;

use crate::arena::{TileArena, TileId};
use crate::constants::{SPAWN_FOUR_ONE_IN, SPAWN_VALUE_COMMON, SPAWN_VALUE_RARE};
use crate::error::BoardError;
use crate::tile::Tile;

/// Place a 2 (or, one time in ten, a 4) on a uniformly chosen empty cell.
///
/// The board must be settled: only resting tiles count as occupying a cell.
/// A full grid yields [`BoardError::NoSpace`].
pub fn spawn<R: Rng + ?Sized>(arena: &mut TileArena, rng: &mut R) -> Result<TileId, BoardError> {
    arena.ensure_settled()?;

    let cells = arena.empty_cells();
    if cells.is_empty() {
        return Err(BoardError::NoSpace { size: arena.size() });
    }

    let (x, y) = cells[rng.gen_range(0..cells.len())];
    let value = random_value(rng);
    let id = arena.insert(Tile::new(value, x, y))?;
    debug!(x, y, value, "tile spawned");
    Ok(id)
}

fn random_value<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    if rng.gen_range(0..SPAWN_FOUR_ONE_IN) == 0 {
        SPAWN_VALUE_RARE
    } else {
        SPAWN_VALUE_COMMON
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{AnimationPhase, TileData};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn rng(seed: u64) -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(seed)
    }

    #[test]
    fn test_spawn_fills_grid_then_fails() {
        let mut arena = TileArena::new(3).unwrap();
        let mut rng = rng(1);
        for _ in 0..9 {
            spawn(&mut arena, &mut rng).unwrap();
        }
        assert!(arena.empty_cells().is_empty());
        assert_eq!(
            spawn(&mut arena, &mut rng).unwrap_err(),
            BoardError::NoSpace { size: 3 }
        );
        assert_eq!(arena.len(), 9);
    }

    #[test]
    fn test_spawn_uses_last_free_cell() {
        let mut arena = TileArena::new(2).unwrap();
        arena.insert(Tile::settled(2, 0, 0)).unwrap();
        arena.insert(Tile::settled(4, 1, 0)).unwrap();
        arena.insert(Tile::settled(8, 0, 1)).unwrap();
        let id = spawn(&mut arena, &mut rng(5)).unwrap();
        assert_eq!(arena.get(id).unwrap().pos(), (1, 1));
    }

    #[test]
    fn test_spawned_tile_is_growing() {
        let mut arena = TileArena::new(4).unwrap();
        let id = spawn(&mut arena, &mut rng(3)).unwrap();
        let tile = arena.get(id).unwrap();
        assert_eq!(tile.phase(), AnimationPhase::SpawnGrowing);
        assert!(tile.value() == 2 || tile.value() == 4);
    }

    #[test]
    fn test_spawn_refuses_unsettled_board() {
        let mut arena = TileArena::new(4).unwrap();
        let id = arena.insert(Tile::settled(2, 3, 3)).unwrap();
        arena.begin_slide(id, TileData::new(2, 0, 3)).unwrap();
        assert!(spawn(&mut arena, &mut rng(0)).unwrap_err().is_defect());
    }

    #[test]
    fn test_value_distribution() {
        let mut rng = rng(42);
        let fours = (0..10_000)
            .filter(|_| random_value(&mut rng) == SPAWN_VALUE_RARE)
            .count();
        assert!((800..1200).contains(&fours), "got {fours} fours");
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let mut a = TileArena::new(4).unwrap();
        let mut b = TileArena::new(4).unwrap();
        let (mut ra, mut rb) = (rng(99), rng(99));
        for _ in 0..8 {
            let ia = spawn(&mut a, &mut ra).unwrap();
            let ib = spawn(&mut b, &mut rb).unwrap();
            assert_eq!(a.get(ia), b.get(ib));
        }
    }
}
