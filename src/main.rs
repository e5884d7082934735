// Entry point for the Minesweeper TUI application
// Parses the board parameters, validates them, and launches the main UI

use clap::Parser;
use std::error::Error;
use std::process;

// Module declarations
mod xtm_color; // Cross-platform color matching utilities
mod xtm_game; // Core game logic
mod xtm_ui; // Terminal UI rendering and event handling

use xtm_game::GameConfig;
use xtm_ui::run as run_ui;

/// A terminal-based classic Minesweeper game
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of board rows
    #[arg(long, default_value_t = 10)]
    rows: usize,

    /// Number of board columns
    #[arg(long, default_value_t = 10)]
    cols: usize,

    /// Number of bombs hidden in the board
    #[arg(long, default_value_t = 10)]
    bombs: usize,

    /// Draw the board with plain ASCII icons
    #[arg(long)]
    ascii: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    // Reject bad configurations before touching the terminal
    let cfg = GameConfig {
        rows: args.rows,
        cols: args.cols,
        bombs: args.bombs,
    };
    if let Err(e) = cfg.validate() {
        eprintln!("xtmines: {e}");
        process::exit(2);
    }

    run_ui(cfg, args.ascii)
}
