use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lux_2048::core::BoardState;
use lux_2048::types::Direction;

fn mid_game() -> BoardState {
    BoardState::from_grid(
        [
            [2, 4, 8, 0],
            [32, 2, 2, 4],
            [8, 64, 4, 2],
            [2, 0, 16, 2],
        ],
        12345,
    )
}

fn bench_apply_move(c: &mut Criterion) {
    let state = mid_game();

    c.bench_function("apply_move_left", |b| {
        b.iter(|| {
            let mut board = state.clone();
            board.apply_move(black_box(Direction::Left))
        })
    });
}

fn bench_no_op_move(c: &mut Criterion) {
    // Fully packed left edge: the cheapest possible transition
    let state = BoardState::from_grid(
        [
            [2, 4, 0, 0],
            [8, 2, 0, 0],
            [4, 8, 0, 0],
            [2, 4, 0, 0],
        ],
        1,
    );

    c.bench_function("apply_move_noop", |b| {
        b.iter(|| {
            let mut board = state.clone();
            board.apply_move(black_box(Direction::Left))
        })
    });
}

fn bench_game_over_scan(c: &mut Criterion) {
    // Full board construction runs the adjacency scan
    c.bench_function("game_over_scan", |b| {
        b.iter(|| {
            BoardState::from_grid(
                black_box([
                    [2, 4, 8, 16],
                    [16, 8, 4, 2],
                    [2, 4, 8, 16],
                    [16, 8, 4, 2],
                ]),
                1,
            )
        })
    });
}

fn bench_restart(c: &mut Criterion) {
    let mut state = mid_game();

    c.bench_function("restart", |b| {
        b.iter(|| {
            state.restart();
        })
    });
}

criterion_group!(
    benches,
    bench_apply_move,
    bench_no_op_move,
    bench_game_over_scan,
    bench_restart
);
criterion_main!(benches);
