//! Kifu-Rust: record Go games as branching move trees.
//!
//! ## Usage
//!
//! - `kifu-rust` - Show a demo
//! - `kifu-rust shell [--drafts DIR]` - Start the text protocol on stdin/stdout
//! - `kifu-rust demo [--moves N] [--seed S]` - Record a random game
//! - `kifu-rust replay FILE [--main-line]` - Show a serialized game

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};

use kifu_rust::board::{Color, Point};
use kifu_rust::constants::N;
use kifu_rust::protocol::{RecordEngine, format_vertex};
use kifu_rust::session::GameSession;
use kifu_rust::store::{DraftStore, InMemoryDraftStore, JsonDraftStore};
use kifu_rust::tree::MoveTree;

/// Kifu-Rust: a branching Go game recorder
#[derive(Parser)]
#[command(name = "kifu-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the text protocol server on stdin/stdout
    Shell {
        /// Keep drafts as JSON files in this directory instead of in memory
        #[arg(long)]
        drafts: Option<PathBuf>,
    },
    /// Record a random game with a few side branches
    Demo {
        /// Number of moves to attempt
        #[arg(long, default_value_t = 40)]
        moves: usize,
        /// Seed for reproducible games
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Load a serialized game and print its board
    Replay {
        /// File holding a serialized move tree
        file: PathBuf,
        /// Show the end of the main line instead of the saved cursor
        #[arg(long)]
        main_line: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose)?;

    match cli.command {
        Some(Commands::Shell { drafts: Some(dir) }) => {
            let store = JsonDraftStore::open(&dir)
                .with_context(|| format!("opening draft directory {}", dir.display()))?;
            run_shell(store)
        }
        Some(Commands::Shell { drafts: None }) => run_shell(InMemoryDraftStore::new()),
        Some(Commands::Demo { moves, seed }) => run_demo(moves, seed),
        Some(Commands::Replay { file, main_line }) => run_replay(file, main_line),
        None => run_demo(40, None),
    }
}

fn init_logger(verbose: u8) -> Result<()> {
    use simplelog::*;

    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;
    debug!("Logger successfully initialized");
    Ok(())
}

fn run_shell<S: DraftStore>(store: S) -> Result<()> {
    info!("starting record protocol on a {N}x{N} board");
    let mut engine = RecordEngine::new(store);
    engine.run(io::stdin().lock(), io::stdout())?;
    Ok(())
}

fn run_demo(moves: usize, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let mut session = GameSession::new(InMemoryDraftStore::new());

    println!("Kifu-Rust: branching Go record\n");
    for _ in 0..moves {
        // Now and then take a move back so the record grows side branches.
        if rng.u8(..10) == 0 && session.previous_step() {
            continue;
        }
        let legal: Vec<Point> = session
            .board()
            .points()
            .filter(|&p| session.hover(Some(p)).is_some())
            .collect();
        if legal.is_empty() {
            break;
        }
        let point = legal[rng.usize(..legal.len())];
        session.play(point)?;
    }

    let tree = session.tree();
    println!("{}", session.board());
    println!(
        "Nodes: {}, depth: {}, black stones: {}, white stones: {}",
        tree.len(),
        tree.pointer().current_move_number,
        session.board().count(Color::Black),
        session.board().count(Color::White),
    );
    let json = tree.serialize()?;
    println!("Serialized record: {} bytes", json.len());
    Ok(())
}

fn run_replay(file: PathBuf, main_line: bool) -> Result<()> {
    let data =
        fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
    let mut tree = MoveTree::deserialize(&data)
        .with_context(|| format!("{} does not hold a valid move tree", file.display()))?;
    if main_line {
        while tree.next_step() {}
    }

    let moves: Vec<String> = tree
        .path_to_current()
        .iter()
        .filter_map(|node| node.stone())
        .map(|stone| format!("{} {}", stone.color, format_vertex(stone.point(), N)))
        .collect();
    println!("{}", tree.board(N));
    println!("Moves to here: {}", moves.join(", "));
    println!(
        "Current node: {} (move {}), {} nodes in total",
        tree.current_node().id(),
        tree.pointer().current_move_number,
        tree.len()
    );
    Ok(())
}
