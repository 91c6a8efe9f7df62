use criterion::{black_box, criterion_group, criterion_main, Criterion};
use twenty48_core::board::Board;
use twenty48_core::direction::{Direction, RandomInput};
use twenty48_core::render::{sprites, TileLayout};
use twenty48_core::simulation::{play_game, run_simulation, SimConfig};

fn busy_board() -> Board {
    let values = [
        2, 2, 4, 8, //
        0, 4, 4, 2, //
        16, 0, 16, 2, //
        2, 2, 2, 2, //
    ];
    Board::from_values(4, &values, 7).unwrap()
}

fn bench_moves(c: &mut Criterion) {
    c.bench_function("move_tiles_4x4", |b| {
        b.iter_batched(
            busy_board,
            |mut board| board.move_tiles(black_box(Direction::Left)).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });

    c.bench_function("has_moves_4x4", |b| {
        let board = busy_board();
        b.iter(|| black_box(&board).has_moves())
    });

    c.bench_function("move_and_settle_8x8", |b| {
        b.iter_batched(
            || Board::new(8, 11).unwrap(),
            |mut board| {
                let mut input = RandomInput::new(3);
                for _ in 0..64 {
                    board.update(&mut input).unwrap();
                }
                board.fingerprint()
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_render(c: &mut Criterion) {
    let layout = TileLayout::default();
    let mut board = busy_board();
    board.move_tiles(Direction::Right).unwrap();
    c.bench_function("sprites_4x4", |b| {
        b.iter(|| sprites(black_box(&board), &layout))
    });
}

fn bench_games(c: &mut Criterion) {
    c.bench_function("play_game_4x4", |b| {
        b.iter(|| play_game(black_box(42), 4, 5_000))
    });

    let mut group = c.benchmark_group("simulation");
    group.sample_size(10);
    group.bench_function("run_simulation_64", |b| {
        let config = SimConfig {
            game_count: 64,
            ..Default::default()
        };
        b.iter(|| run_simulation(black_box(&config)))
    });
    group.finish();
}

criterion_group!(benches, bench_moves, bench_render, bench_games);
criterion_main!(benches);
