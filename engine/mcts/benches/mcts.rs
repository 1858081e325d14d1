//! MCTS benchmarks for performance profiling.
//!
//! Run with: `cargo bench -p mcts`
//!
//! These benchmarks measure:
//! - Full MCTS search with varying simulation counts
//! - Search from different game phases (opening, middlegame, near-mate)
//! - Tree operations (selection, backpropagation, policy extraction)
//! - Exploration settings (c_puct, root noise)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use engine_core::Game;
use games_chess::{Chess, ChessPosition};
use mcts::{MctsConfig, MctsSearch, MctsTree, UniformEvaluator};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

const MIDDLEGAME: &str = "r1bq1rk1/pp2bppp/2n1pn2/3p4/2PP4/2N1PN2/PP2BPPP/R2QKB1R w KQ - 0 8";
const NEAR_MATE: &str = "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1";

fn search_once(chess: &Chess, position: ChessPosition, config: MctsConfig) -> mcts::SearchResult {
    let evaluator = UniformEvaluator::new();
    let mut rng = ChaCha20Rng::seed_from_u64(42);
    let mut search = MctsSearch::new(chess, &evaluator, config, position).unwrap();
    search.run(&mut rng).unwrap()
}

// =============================================================================
// Full MCTS Search Benchmarks
// =============================================================================

fn bench_mcts_search_simulations(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_search_simulations");
    let chess = Chess::new();

    for sims in [50, 100, 200, 400, 800] {
        group.throughput(Throughput::Elements(sims as u64));
        group.bench_with_input(BenchmarkId::new("chess_opening", sims), &sims, |b, &sims| {
            let config = MctsConfig::for_testing().with_simulations(sims);
            b.iter(|| black_box(search_once(&chess, chess.initial_position(), config.clone())));
        });
    }

    group.finish();
}

fn bench_mcts_game_phases(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_game_phases");
    let chess = Chess::new();
    let config = MctsConfig::for_testing().with_simulations(200);

    let phases = [
        ("opening", chess.initial_position()),
        ("middlegame", ChessPosition::from_fen(MIDDLEGAME).unwrap()),
        ("near_mate", ChessPosition::from_fen(NEAR_MATE).unwrap()),
    ];

    for (name, position) in phases {
        group.bench_function(name, |b| {
            b.iter(|| black_box(search_once(&chess, position.clone(), config.clone())));
        });
    }

    group.finish();
}

// =============================================================================
// Tree Operation Benchmarks
// =============================================================================

fn bench_tree_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_tree_ops");

    // A root with 30 children, roughly a chess middlegame branching factor
    let build_tree = || {
        let mut tree = MctsTree::new(());
        let root = tree.root();
        for action in 0..30u16 {
            let child = tree.add_child(root, action * 64, 1.0 / 30.0);
            tree.get_mut(child).visit_count = (action as u32 * 7) % 13;
            tree.get_mut(child).value_sum = ((action as f32) - 15.0) / 30.0;
        }
        tree.get_mut(root).visit_count = 200;
        tree
    };

    group.bench_function("select_child_30", |b| {
        let tree = build_tree();
        b.iter(|| black_box(tree.select_child(tree.root(), 1.25, 0.0)));
    });

    group.bench_function("backpropagate_depth_20", |b| {
        let mut tree = MctsTree::new(());
        let mut path = vec![tree.root()];
        for depth in 0..20u16 {
            let parent = path[path.len() - 1];
            path.push(tree.add_child(parent, depth, 1.0));
        }
        b.iter(|| tree.backpropagate(black_box(&path), 0.5));
    });

    group.bench_function("root_policy", |b| {
        let tree = build_tree();
        let num_actions = games_chess::NUM_ACTIONS;
        b.iter(|| black_box(tree.root_policy(num_actions)));
    });

    group.finish();
}

// =============================================================================
// Configuration Comparison Benchmarks
// =============================================================================

fn bench_mcts_configs(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_configs");
    let chess = Chess::new();
    let position = ChessPosition::from_fen(MIDDLEGAME).unwrap();

    for c_puct in [0.5f32, 1.0, 2.5] {
        group.bench_with_input(
            BenchmarkId::new("c_puct", c_puct),
            &c_puct,
            |b, &c_puct| {
                let config = MctsConfig::for_testing()
                    .with_simulations(200)
                    .with_c_puct(c_puct);
                b.iter(|| black_box(search_once(&chess, position.clone(), config.clone())));
            },
        );
    }

    group.bench_function("root_noise", |b| {
        let config = MctsConfig::for_testing()
            .with_simulations(200)
            .with_root_noise(0.3, 0.25)
            .with_temperature(1.0);
        b.iter(|| black_box(search_once(&chess, position.clone(), config.clone())));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_mcts_search_simulations,
    bench_mcts_game_phases,
    bench_tree_operations,
    bench_mcts_configs,
);
criterion_main!(benches);
