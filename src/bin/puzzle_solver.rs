use clap::{Args, Parser, Subcommand};
use puzzle_engine::config::{Budget, SolverConfig};
use puzzle_engine::hanoi::{verify_solution, HanoiAlgorithm, HanoiProblem, Peg};
use puzzle_engine::knights::{random_start, verify_tour, KnightAlgorithm, KnightBoard};
use puzzle_engine::queens::{QueensAlgorithm, QueensBoard, BOARD_SIZE as QUEENS_BOARD_SIZE};
use puzzle_engine::strategy::Strategy;
use puzzle_engine::timing::{run_timed, PerformanceRecord};
use puzzle_engine::tictactoe::{GridState, TicTacToeAlgorithm};
use puzzle_engine::tsp::{check_route, dynamic_programming, CityGraph, TspAlgorithm};
use puzzle_engine::utils::{grid_from_str_array, parse_hanoi_moves, parse_knight_path};
use puzzle_engine::{Error, Result};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(flatten)]
    tuning: Tuning,

    /// Print the performance record as JSON instead of text
    #[clap(long, global = true)]
    json: bool,

    #[clap(subcommand)]
    puzzle: PuzzleCommand,
}

#[derive(Args, Debug)]
struct Tuning {
    /// Seed for the randomized algorithms
    #[clap(long, global = true)]
    seed: Option<u64>,

    /// Iteration (or search node) budget
    #[clap(long, global = true, conflicts_with = "millis")]
    iterations: Option<u64>,

    /// Wall-clock budget in milliseconds
    #[clap(long, global = true)]
    millis: Option<u64>,

    /// Minimax depth limit in plies
    #[clap(long, global = true)]
    depth: Option<u32>,

    #[clap(long, global = true)]
    population: Option<usize>,

    #[clap(long, global = true)]
    generations: Option<usize>,

    #[clap(long, global = true)]
    mutation_rate: Option<f64>,

    /// Maximum number of Eight Queens solutions to return
    #[clap(long, global = true)]
    limit: Option<usize>,
}

impl Tuning {
    fn to_config(&self) -> SolverConfig {
        SolverConfig {
            seed: self.seed,
            budget: self
                .iterations
                .map(Budget::Iterations)
                .or(self.millis.map(Budget::Millis)),
            depth_limit: self.depth,
            population_size: self.population,
            generations: self.generations,
            mutation_rate: self.mutation_rate,
            solution_limit: self.limit,
        }
    }
}

#[derive(Subcommand, Debug)]
enum PuzzleCommand {
    /// Choose the next move on a 5×5 board
    TicTacToe {
        #[clap(short, long, value_enum, default_value = "minimax")]
        algorithm: TicTacToeAlgorithm,

        /// Path to a board file (5 lines of `X`, `O` and `.`); empty board if omitted
        board_file: Option<PathBuf>,
    },
    /// Find a short round trip through random cities
    Tsp {
        #[clap(short, long, value_enum, default_value = "nearest-neighbor")]
        algorithm: TspAlgorithm,

        #[clap(long, default_value_t = 10)]
        cities: usize,

        /// Seed for generating the distance matrix
        #[clap(long, default_value_t = 0)]
        instance_seed: u64,

        #[clap(long, default_value_t = 0)]
        home: usize,

        /// Only visit these cities (comma separated indices) besides home
        #[clap(long, value_delimiter = ',')]
        select: Option<Vec<usize>>,

        /// A route to score against the exact optimum (comma separated city names)
        #[clap(long, value_delimiter = ',')]
        route: Option<Vec<String>>,
    },
    /// Move a tower of disks to another peg
    Hanoi {
        #[clap(short, long, value_enum, default_value = "recursive")]
        algorithm: HanoiAlgorithm,

        #[clap(short, long, default_value_t = 3)]
        disks: usize,

        #[clap(long, value_enum, default_value = "a")]
        source: Peg,

        #[clap(long, value_enum, default_value = "c")]
        target: Peg,

        /// A move list to check instead of only solving, e.g. "A->C, A->B"
        #[clap(long)]
        verify: Option<String>,
    },
    /// Place eight non-attacking queens
    Queens {
        #[clap(short, long, value_enum, default_value = "backtracking")]
        algorithm: QueensAlgorithm,

        /// Queens already on the board: one character per column, a 1-based
        /// row digit or `.` for an empty column
        #[clap(long)]
        placed: Option<String>,
    },
    /// Visit every square of the board with a knight
    Knights {
        #[clap(short, long, value_enum, default_value = "warnsdorff")]
        algorithm: KnightAlgorithm,

        /// 1-based start square, e.g. "1 1"; random when omitted
        #[clap(long)]
        start: Option<String>,

        /// A tour to check, as a list of 1-based squares
        #[clap(long)]
        verify: Option<String>,
    },
}

/// Runs one strategy, prints its performance record, and hands back the
/// solver's result.
fn report<S: Strategy>(
    strategy: &S,
    state: &S::State,
    config: &SolverConfig,
    json: bool,
    render: impl Fn(&S::Output) -> String,
) -> Result<S::Output> {
    let timed = run_timed(strategy, state, config);
    let artifact = match &timed.output {
        Ok(output) => render(output),
        Err(err) => format!("error: {}", err),
    };
    let record = PerformanceRecord::new(strategy, timed.elapsed, artifact);
    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("{} finished in {:.6}s", record.algorithm, record.elapsed_secs);
        println!("{}", record.artifact);
    }
    timed.output
}

fn read_board_file(path: &PathBuf) -> Result<GridState> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::parse(path.display().to_string(), format!("failed to read file: {}", e))
    })?;
    let lines: Vec<&str> = content
        .lines()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    grid_from_str_array(&lines)
}

fn parse_placed(text: &str) -> Result<QueensBoard> {
    if text.chars().count() != QUEENS_BOARD_SIZE {
        return Err(Error::parse(text, "expected one character per column"));
    }
    let mut rows = [None; QUEENS_BOARD_SIZE];
    for (col, ch) in text.chars().enumerate() {
        rows[col] = match ch {
            '.' => None,
            _ => match ch.to_digit(10) {
                Some(d @ 1..=8) => Some(d as u8 - 1),
                _ => return Err(Error::parse(text, format!("'{}' is not a row", ch))),
            },
        };
    }
    QueensBoard::from_rows(rows)
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.tuning.to_config();
    let json = cli.json;

    match cli.puzzle {
        PuzzleCommand::TicTacToe {
            algorithm,
            board_file,
        } => {
            let state = match board_file {
                Some(path) => read_board_file(&path)?,
                None => GridState::new(),
            };
            if !json {
                println!("Board ({} to move):\n{}\n", state.to_move(), state);
            }
            report(&algorithm, &state, &config, json, |(r, c)| {
                format!("move ({}, {})", r, c)
            })?;
        }
        PuzzleCommand::Tsp {
            algorithm,
            cities,
            instance_seed,
            home,
            select,
            route,
        } => {
            let mut graph = CityGraph::random_with_seed(cities, instance_seed)?.with_home(home)?;
            if let Some(chosen) = select {
                graph = graph.select(&chosen)?;
            }
            let tour = report(&algorithm, &graph, &config, json, |tour| {
                format!("{} (length {:.2})", tour.describe(&graph), tour.length)
            })?;
            if let Some(names) = route {
                let route = graph.route_from_names(&names)?;
                let reference = dynamic_programming(&graph).unwrap_or(tour);
                let verdict = check_route(&graph, &route, &reference)?;
                println!("submitted route: {:?}", verdict);
            }
        }
        PuzzleCommand::Hanoi {
            algorithm,
            disks,
            source,
            target,
            verify,
        } => {
            let problem = HanoiProblem::new(disks, source, target);
            report(&algorithm, &problem, &config, json, |moves| {
                let text: Vec<String> = moves.iter().map(|m| m.to_string()).collect();
                format!("{} moves: {}", moves.len(), text.join(", "))
            })?;
            if let Some(text) = verify {
                let moves = parse_hanoi_moves(&text)?;
                println!("submitted moves: {:?}", verify_solution(&problem, &moves)?);
            }
        }
        PuzzleCommand::Queens { algorithm, placed } => {
            let board = match placed {
                Some(text) => parse_placed(&text)?,
                None => QueensBoard::new(),
            };
            report(&algorithm, &board, &config, json, |solutions| {
                let codes: Vec<String> = solutions.iter().filter_map(|s| s.canonical()).collect();
                format!("{} solutions: {}", solutions.len(), codes.join(" "))
            })?;
        }
        PuzzleCommand::Knights {
            algorithm,
            start,
            verify,
        } => {
            let start = match start {
                Some(text) => match parse_knight_path(&text)?.as_slice() {
                    [square] => *square,
                    _ => return Err(Error::parse(text, "expected exactly one square")),
                },
                None => random_start(&mut config.rng()),
            };
            let board = KnightBoard::new(start)?;
            let tour = report(&algorithm, &board, &config, json, |path| {
                let squares: Vec<String> = path
                    .iter()
                    .map(|(r, c)| format!("({},{})", r + 1, c + 1))
                    .collect();
                squares.join(" ")
            })?;
            if !json {
                let mut finished = board.clone();
                for &square in &tour[1..] {
                    finished = finished.apply(square)?;
                }
                println!("\n{}", finished);
            }
            if let Some(text) = verify {
                let path = parse_knight_path(&text)?;
                println!("submitted tour: {:?}", verify_tour(start, &path)?);
            }
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
