use clap::{Parser, ValueEnum};
use puzzle_engine::config::{Budget, SolverConfig};
use puzzle_engine::hanoi::{HanoiAlgorithm, HanoiProblem, Peg};
use puzzle_engine::knights::{random_start, KnightAlgorithm, KnightBoard};
use puzzle_engine::queens::{QueensAlgorithm, QueensBoard};
use puzzle_engine::strategy::Strategy;
use puzzle_engine::tictactoe::{GridState, TicTacToeAlgorithm};
use puzzle_engine::timing::run_timed;
use puzzle_engine::tsp::{CityGraph, TspAlgorithm};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Times every algorithm over seeded puzzle instances")]
struct Args {
    /// Number of seeded instances per puzzle
    #[clap(short, long, default_value_t = 5)]
    instances: u64,

    #[clap(long, default_value_t = 0)]
    start_seed: u64,

    /// Cities per TSP instance
    #[clap(long, default_value_t = 10)]
    cities: usize,
}

/// Timings and a quality figure per algorithm; lower quality is better for
/// TSP (route length), higher elsewhere.
#[derive(Default)]
struct Tally {
    seconds: Vec<f64>,
    quality: Vec<f64>,
    failures: usize,
}

type Tallies = BTreeMap<String, Tally>;

fn measure<S: Strategy>(
    tallies: &mut Tallies,
    strategy: &S,
    state: &S::State,
    config: &SolverConfig,
    quality: impl Fn(&S::Output) -> f64,
) {
    let timed = run_timed(strategy, state, config);
    let tally = tallies.entry(strategy.record_name()).or_default();
    tally.seconds.push(timed.elapsed.as_secs_f64());
    match &timed.output {
        Ok(output) => tally.quality.push(quality(output)),
        Err(err) => {
            log::debug!("{} failed: {}", strategy.record_name(), err);
            tally.failures += 1;
        }
    }
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// A position a few random plies into the game.
fn opening(seed: u64) -> GridState {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut state = GridState::new();
    for _ in 0..4 {
        let moves = state.legal_moves();
        match moves.choose(&mut rng).map(|&mv| state.apply(mv)) {
            Some(Ok(next)) => state = next,
            _ => break,
        }
    }
    state
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let mut tallies = Tallies::new();

    println!(
        "Starting algorithm benchmark over {} instances per puzzle...",
        args.instances
    );

    for index in 0..args.instances {
        let seed = args.start_seed + index;
        let config = SolverConfig::new().with_seed(seed);
        println!("\nInstance {} (Seed: {})", index, seed);

        let state = opening(seed);
        for algorithm in TicTacToeAlgorithm::value_variants() {
            measure(&mut tallies, algorithm, &state, &config, |_| 1.0);
        }

        match CityGraph::random_with_seed(args.cities, seed) {
            Ok(graph) => {
                for algorithm in TspAlgorithm::value_variants() {
                    measure(&mut tallies, algorithm, &graph, &config, |tour| tour.length);
                }
            }
            Err(err) => eprintln!("Skipping TSP: {}", err),
        }

        let problem = HanoiProblem::new(10 + index as usize % 6, Peg::A, Peg::C);
        for algorithm in HanoiAlgorithm::value_variants() {
            measure(&mut tallies, algorithm, &problem, &config, |moves| moves.len() as f64);
        }

        for algorithm in QueensAlgorithm::value_variants() {
            measure(&mut tallies, algorithm, &QueensBoard::new(), &config, |solutions| {
                solutions.len() as f64
            });
        }

        let start = random_start(&mut config.rng());
        if let Ok(board) = KnightBoard::new(start) {
            let knight_config = config.clone().with_budget(Budget::Millis(2_000));
            for algorithm in KnightAlgorithm::value_variants() {
                measure(&mut tallies, algorithm, &board, &knight_config, |path| {
                    path.len() as f64
                });
            }
        }
        println!("  done");
    }

    println!("\n--- Benchmark Complete ---");
    println!("{:<36} {:>12} {:>14} {:>9}", "Algorithm", "Avg time (s)", "Avg quality", "Failures");
    for (name, tally) in &tallies {
        println!(
            "{:<36} {:>12.6} {:>14.2} {:>9}",
            name,
            average(&tally.seconds),
            average(&tally.quality),
            tally.failures
        );
    }
}
