use clap::Parser;
use log::{LevelFilter, error, info};
use minesweeper_ai::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::thread;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of rows on the board.
    #[arg(long, default_value_t = 8)]
    height: usize,

    /// Number of columns on the board.
    #[arg(long, default_value_t = 8)]
    width: usize,

    /// Number of mines to place.
    #[arg(short = 'm', long, default_value_t = 8)]
    mines: usize,

    /// Seed for mine placement and random moves. Random when omitted.
    #[arg(short = 'r', long = "random-seed")]
    seed: Option<u64>,

    /// Pause between moves, in milliseconds, to make the game watchable.
    #[arg(long = "delay-ms", default_value_t = 500)]
    delay_ms: u64,

    /// Cross-check every deduction against an exhaustive SAT analysis.
    #[arg(long, default_value_t = false)]
    verify: bool,

    /// Log each deduction the knowledge base makes.
    #[arg(short = 'v', long, default_value_t = false)]
    verbose: bool,

    /// Only print the final result.
    #[arg(short = 'q', long, default_value_t = false)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = run(&args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    // --- 1. Initialization ---
    let seed = args.seed.unwrap_or_else(rand::random);
    info!("seed {}", seed);

    let mut rng = StdRng::seed_from_u64(seed);
    let board = Board::random(args.height, args.width, args.mines, &mut rng)?;
    let mut game = Game::new(board, seed);

    if !args.quiet {
        println!("--- Knowledge-Based Minesweeper Bot ---");
        println!("Strategy: play cells proven safe, guess randomly otherwise.");
        println!("Mine layout (hidden from the bot):");
        print!("{}", game.board);
    }

    // --- 2. Game Loop ---
    let mut move_count = 0;
    while game.game_state == GameState::Playing {
        let Some(turn) = game.step()? else {
            if !args.quiet {
                println!("No cells left for the bot to probe.");
            }
            break;
        };
        move_count += 1;

        if args.verify {
            game.verify()?;
        }

        if !args.quiet {
            println!("\n--- Move #{} ---", move_count);
            match turn.kind {
                MoveKind::Safe => println!("Logic found a guaranteed safe cell."),
                MoveKind::Random => println!("No logically safe move found. Guessing..."),
            }
            println!("Bot reveals {}...", turn.cell);
            print_board(&game);
            thread::sleep(Duration::from_millis(args.delay_ms));
        }
    }

    // --- 3. Final Result ---
    println!("\n--- Game Over after {} moves ---", move_count);
    match game.game_state {
        GameState::Won => println!("Result: The bot flagged every mine and won!"),
        GameState::Lost => println!("Result: The bot hit a mine and lost."),
        GameState::Playing => println!("Result: The game ended unexpectedly."),
    }
    println!(
        "Known safe: {}, known mines: {}, open constraints: {}",
        game.knowledge.safes().len(),
        game.knowledge.mines().len(),
        game.knowledge.constraints().len()
    );
    Ok(())
}

fn print_board(game: &Game) {
    // Print header
    print!("   ");
    for col in 0..game.board.width {
        print!("{:^3}", col);
    }
    println!("\n  +{}", "---".repeat(game.board.width));

    // Print rows
    for row in 0..game.board.height {
        print!("{:^2}|", row);
        for col in 0..game.board.width {
            let cell = Cell::new(row, col);
            let display = if let Some(count) = game.revealed().get(&cell) {
                format!(" {} ", count)
            } else if game.board.flagged().contains(&cell) {
                " F ".to_string()
            } else if game.knowledge.safes().contains(&cell) {
                " . ".to_string()
            } else {
                " ■ ".to_string()
            };
            print!("{}", display);
        }
        println!();
    }
    println!();
}
