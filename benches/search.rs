use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use towers_ai::test_positions::{self, random_positions};
use towers_ai::{Board, Config, MinimaxAI, Side};

fn corpus() -> Vec<Board> {
    let mut boards = vec![
        Board::from_tfn(test_positions::START).unwrap(),
        Board::from_tfn(test_positions::MID_STACKS).unwrap(),
    ];
    boards.extend(random_positions(Side::A, 32, 30, 7777));
    boards
}

fn bench_move_generation(c: &mut Criterion) {
    let boards = corpus();

    c.bench_function("rules/legal_moves", |bch| {
        bch.iter(|| {
            let mut acc = 0usize;
            for bd in &boards {
                acc += bd.legal_moves(Side::A).len();
                acc += bd.legal_moves(Side::B).len();
            }
            black_box(acc)
        })
    });

    c.bench_function("rules/apply_undo", |bch| {
        let mut boards = boards.clone();
        bch.iter(|| {
            for bd in boards.iter_mut() {
                for mv in bd.legal_moves(bd.current_turn()) {
                    let logged = bd.apply_move_and_turn(&mv, 3).unwrap();
                    bd.undo_move(&logged);
                }
            }
            black_box(boards.len())
        })
    });
}

fn bench_search(c: &mut Criterion) {
    let board = Board::from_tfn(test_positions::MID_STACKS).unwrap();
    let mut config = Config::default();
    config.search.max_depth = 3;
    let ai = MinimaxAI::new();

    c.bench_function("search/mid_stacks_depth3", |bch| {
        bch.iter(|| black_box(ai.search(&board, &config).unwrap().stats.nodes))
    });
}

criterion_group!(benches, bench_move_generation, bench_search);
criterion_main!(benches);
