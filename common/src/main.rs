use clap::Parser;
use minesweeper_agent::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Watch the agent play a game of Minesweeper.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Number of rows.
    #[arg(long, default_value_t = 8)]
    height: usize,

    /// Number of columns.
    #[arg(long, default_value_t = 8)]
    width: usize,

    /// Number of mines.
    #[arg(long, default_value_t = 8)]
    mines: usize,

    /// Seed for the board and the agent's guesses.
    #[arg(long)]
    seed: Option<u64>,

    /// Pause between moves, in milliseconds.
    #[arg(long, default_value_t = 300)]
    delay_ms: u64,

    /// Maximum number of statements the agent keeps.
    #[arg(long, default_value_t = DEFAULT_STATEMENT_LIMIT)]
    statement_limit: usize,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "minesweeper_agent=info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    // --- 1. Initialization ---
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let mut game = Game::new(args.height, args.width, args.mines, &mut rng)?
        .with_statement_limit(args.statement_limit);
    let delay = Duration::from_millis(args.delay_ms);

    println!("--- Minesweeper Agent ---");
    println!("Strategy: play deduced safe cells, guess randomly otherwise.");
    println!("{game}");

    // --- 2. Game Loop ---
    let mut move_count = 0;
    while game.state == GameState::Playing {
        move_count += 1;
        println!("\n--- Move #{} ---", move_count);

        match game.step(&mut rng)? {
            Some(Move { cell, kind }) => {
                match kind {
                    MoveKind::Deduced => println!("Agent reveals known-safe cell {cell}."),
                    MoveKind::Guessed => {
                        println!("No safe move known. Agent guesses {cell}...")
                    }
                }
                println!("{game}");
                println!(
                    "Known safe: {}, known mines: {}, statements: {}",
                    game.agent.known_safe().len(),
                    game.agent.known_mines().len(),
                    game.agent.statements().len()
                );
            }
            None => {
                println!("No moves left for the agent to make.");
                break;
            }
        }

        thread::sleep(delay);
    }

    // --- 3. Final Result ---
    println!("\n--- Game Over ---");
    println!("{}", game.board);

    match game.state {
        GameState::Won => println!("Result: the agent flagged every mine!"),
        GameState::Lost => println!("Result: the agent hit a mine and lost."),
        GameState::Playing => println!("Result: the game ended unexpectedly."),
    }
    Ok(())
}
