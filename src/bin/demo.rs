//! gocore-demo: a tiny CLI exercising the board, a playout batch, and the
//! shared MC ownermap end to end.
//!
//! ## Usage
//!
//! - `gocore-demo` - play a few moves and print the board
//! - `gocore-demo playout` - run one playout to completion and print the score
//! - `gocore-demo ownermap` - sample an ownermap and print bucket counts

use clap::{Parser, Subcommand};
use gocore::board::{Board, BoardConfig};
use gocore::config::{EngineConfig, PlayoutConfig};
use gocore::ownermap;
use gocore::patterns::Pat3Table;
use gocore::playout;
use gocore::spatial::SpatialContext;
use gocore::types::{BoardGeometry, Color};

/// gocore: board state, tactics, and playout policy for Go
#[derive(Parser)]
#[command(name = "gocore-demo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Board side length.
    #[arg(long, default_value_t = 9)]
    size: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a handful of moves and print the board.
    Board,
    /// Run one playout to completion and print the final score.
    Playout,
    /// Sample a Monte Carlo ownermap and print per-point bucket counts.
    Ownermap,
}

fn new_board(size: usize) -> Board {
    let geo = BoardGeometry::new(size);
    let spatial = SpatialContext::new(&geo, 1);
    Board::new(size, BoardConfig::default(), spatial)
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Board) {
        Commands::Board => run_board_demo(cli.size),
        Commands::Playout => run_playout_demo(cli.size),
        Commands::Ownermap => run_ownermap_demo(cli.size),
    }
}

fn run_board_demo(size: usize) {
    println!("=== Board demo ({size}x{size}) ===");
    let mut board = new_board(size);
    let geo = board.geo.clone();
    let corner1 = geo.stride + 1;
    let corner2 = geo.stride + 2;
    let center = (1 + size / 2) * geo.stride + 1 + size / 2;

    for pt in [corner1, corner2, center] {
        match board.play(pt) {
            Ok(played) => log::info!("played {played}"),
            Err(e) => log::warn!("rejected move at {pt}: {e}"),
        }
    }
    println!("{board}");
    println!("fast score (Black-positive): {:.1}", board.fast_score());
}

fn run_playout_demo(size: usize) {
    println!("=== Playout demo ({size}x{size}) ===");
    let mut board = new_board(size);
    let cfg = PlayoutConfig::default();
    let pat3 = Pat3Table::new();
    let mut rng = fastrand::Rng::with_seed(1);

    let score = playout::mc_playout(&mut board, &cfg, &pat3, &mut rng);
    println!("{board}");
    println!(
        "playout finished after {} moves, score from {:?}'s perspective: {:.1}",
        board.move_num(),
        Color::Black,
        score
    );
}

fn run_ownermap_demo(size: usize) {
    println!("=== Ownermap demo ({size}x{size}) ===");
    let engine = EngineConfig::default();
    let board = new_board(size);
    let pat3 = Pat3Table::new();

    let playouts = 200;
    let map = ownermap::estimate(&board, &engine.playout, &pat3, engine.seed, playouts);
    println!("sampled {} playouts", map.samples());

    let geo = board.geo.clone();
    let corner = geo.stride + 1;
    let center = (1 + size / 2) * geo.stride + 1 + size / 2;
    for (label, pt) in [("corner", corner), ("center", center)] {
        println!(
            "{label}: black={} white={}",
            map.bucket(pt, Color::Black),
            map.bucket(pt, Color::White)
        );
    }
}
