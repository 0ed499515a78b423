use clap::Parser;
use puzzle_engine::config::{Budget, SolverConfig};
use puzzle_engine::strategy::Strategy;
use puzzle_engine::tictactoe::{GameStatus, GridState, Player, TicTacToeAlgorithm, GRID_SIZE};
use std::io::{self, Write};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Play 5×5 Tic-Tac-Toe (four in a row) against the engine")]
struct Args {
    /// Strategy the engine plays with
    #[clap(short, long, value_enum, default_value = "minimax")]
    algorithm: TicTacToeAlgorithm,

    /// Minimax depth limit in plies
    #[clap(long)]
    depth: Option<u32>,

    /// MCTS iterations per move
    #[clap(long)]
    iterations: Option<u64>,

    #[clap(long)]
    seed: Option<u64>,

    /// Let the engine play X and move first
    #[clap(long)]
    engine_first: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut config = SolverConfig::new();
    config.seed = args.seed;
    config.depth_limit = args.depth;
    config.budget = args.iterations.map(Budget::Iterations);
    let engine = if args.engine_first { Player::X } else { Player::O };

    let mut history: Vec<GridState> = Vec::new();
    let mut state = GridState::new();
    println!("Welcome to Tic-Tac-Toe! Four in a row wins. You play {}.", engine.opponent());

    loop {
        println!("---------------------");
        println!("{}", state);

        match state.status() {
            GameStatus::Win(player) if player == engine => {
                println!("\nThe engine ({}) wins.", player);
                break;
            }
            GameStatus::Win(player) => {
                println!("\nYou ({}) win!", player);
                break;
            }
            GameStatus::Draw => {
                println!("\nDraw.");
                break;
            }
            GameStatus::InProgress => {}
        }

        if state.to_move() == engine {
            match args.algorithm.solve(&state, &config) {
                Ok(mv) => {
                    println!("Engine ({}) plays {} {}", args.algorithm.name(), mv.0, mv.1);
                    match state.apply(mv) {
                        Ok(next) => state = next,
                        Err(err) => {
                            eprintln!("Engine produced an illegal move: {}", err);
                            break;
                        }
                    }
                }
                Err(err) => {
                    eprintln!("Engine failed: {}", err);
                    break;
                }
            }
            continue;
        }

        print!("Enter your move (row col), or 'u' to undo, 'q' to quit: ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            println!("Error reading input. Please try again.");
            continue;
        }

        let trimmed_input = input.trim();

        if trimmed_input == "q" {
            println!("Thanks for playing!");
            break;
        }

        if trimmed_input == "u" {
            // Undo the engine's reply together with your move.
            match history.pop() {
                Some(previous) => {
                    state = previous;
                    println!("Move undone.");
                }
                None => println!("Nothing to undo."),
            }
            continue;
        }

        let parts: Vec<&str> = trimmed_input.split_whitespace().collect();
        if parts.len() != 2 {
            println!("Invalid input format. Use 'row col', 'u', or 'q'.");
            continue;
        }
        match (parts[0].parse::<usize>(), parts[1].parse::<usize>()) {
            (Ok(r), Ok(c)) if r < GRID_SIZE && c < GRID_SIZE => match state.apply((r, c)) {
                Ok(next) => {
                    history.push(state);
                    state = next;
                }
                Err(err) => println!("{}", err),
            },
            (Ok(_), Ok(_)) => println!(
                "Invalid coordinates: Row and column must be between 0 and {}.",
                GRID_SIZE - 1
            ),
            _ => println!("Invalid input: Please enter numbers for row and column (e.g., '2 3')."),
        }
    }
}
