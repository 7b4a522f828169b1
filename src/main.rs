//! sgf-go: inspect, normalize and edit SGF game records.
//!
//! ## Usage
//!
//! - `sgf-go check <files..>` - Parse files and report every problem
//! - `sgf-go render <file>` - Print a file as canonical SGF
//! - `sgf-go info <file>` - Show game info and tree shape
//! - `sgf-go new` - Print an empty game record
//! - `sgf-go demo` - Play a random game through the edit engine
//! - `sgf-go edit [file]` - Edit a game with text commands on stdin

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sgf_go::constants::DEFAULT_BOARD_SIZE;
use sgf_go::cursor::Cursor;
use sgf_go::engine::GoEngine;
use sgf_go::node::{Collection, Node};
use sgf_go::parser::{parse_file, parse_one};
use sgf_go::renderer::{render, render_tree};
use sgf_go::session::Session;
use sgf_go::values::{Coord, Move};

/// sgf-go: SGF game records for Go
#[derive(Parser)]
#[command(name = "sgf-go")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log more (repeat for trace output); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse SGF files and report every error found
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print a file as canonical SGF
    Render {
        file: PathBuf,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the game info and tree shape of every game in a file
    Info { file: PathBuf },
    /// Print an empty game record
    New {
        #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
        size: usize,
        /// Height, for rectangular boards
        #[arg(long)]
        height: Option<usize>,
    },
    /// Play a random game through the edit engine and print it
    Demo {
        #[arg(long, default_value_t = 9)]
        size: usize,
        #[arg(long, default_value_t = 40)]
        moves: usize,
        /// Random seed, for reproducible games
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Edit a game with text commands read from stdin
    Edit {
        /// Game to edit; a new one is started if omitted
        file: Option<PathBuf>,
        /// Board size of a new game
        #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
        size: usize,
        /// Save the result here when the session ends
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check { files } => run_check(&files),
        Commands::Render { file, output } => {
            let collection = load(&file)?;
            write_output(output.as_deref(), &render(&collection))
        }
        Commands::Info { file } => {
            let collection = load(&file)?;
            for (i, root) in collection.into_iter().enumerate() {
                print_info(i + 1, root);
            }
            Ok(())
        }
        Commands::New { size, height } => {
            let root = new_root(size, height.unwrap_or(size))?;
            print!("{}", render_tree(&root));
            Ok(())
        }
        Commands::Demo { size, moves, seed } => run_demo(size, moves, seed),
        Commands::Edit { file, size, output } => run_edit(file.as_deref(), size, output.as_deref()),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load(path: &Path) -> Result<Collection> {
    parse_file(path).with_context(|| format!("failed to load {}", path.display()))
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = text.len(), "wrote file");
        }
        None => print!("{text}"),
    }
    Ok(())
}

/// A root node for a new game, with the size checked like a parsed `SZ`.
fn new_root(width: usize, height: usize) -> Result<Node> {
    let root = Node::root(width, height);
    let text = render_tree(&root);
    parse_one(&text).with_context(|| format!("invalid board size {width}x{height}"))
}

fn run_check(files: &[PathBuf]) -> Result<()> {
    let mut failed = 0;
    for path in files {
        match parse_file(path) {
            Ok(collection) => {
                let nodes: usize = collection.iter().map(Node::count_nodes).sum();
                println!(
                    "ok    {}: {} game(s), {} node(s)",
                    path.display(),
                    collection.len(),
                    nodes
                );
            }
            Err(e) => {
                failed += 1;
                println!("error {}: {e}", path.display());
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} file(s) failed to parse", files.len());
    }
    Ok(())
}

fn print_info(number: usize, root: Node) {
    let nodes = root.count_nodes();
    let depth = root.depth();
    let info = Cursor::new(root).game_info();
    println!("== Game {number} ==");
    println!("Board: {}x{}", info.root_info.width, info.root_info.height);
    for p in info.to_properties() {
        let mut value = String::new();
        p.render_values(&mut value);
        println!("{}: {}", p.name(), value);
    }
    println!("Nodes: {nodes}, longest line: {} move(s)", depth - 1);
}

/// Play random legal moves from the empty board, passing when stuck.
fn run_demo(size: usize, moves: usize, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let mut engine = GoEngine::new(new_root(size, size)?);
    engine.modify_comment(|_| format!("Random game, {moves} moves"))?;

    for _ in 0..moves {
        let board = engine.cursor().board();
        let color = board.player_turn;
        let legal: Vec<Coord> = (0..board.height)
            .flat_map(|y| (0..board.width).map(move |x| Coord::new(x, y)))
            .filter(|&c| board.is_legal_move(color, c))
            .collect();
        let mv = if legal.is_empty() {
            warn!(?color, "no legal move, passing");
            Move::Pass
        } else {
            Move::Play(legal[rng.usize(..legal.len())])
        };
        engine.play_move(color, mv)?;
    }

    println!("{}", engine.cursor().board());
    let root = engine.into_root();
    print!("{}", render_tree(&root));
    Ok(())
}

fn run_edit(file: Option<&Path>, size: usize, output: Option<&Path>) -> Result<()> {
    let root = match file {
        Some(path) => {
            let mut collection = load(path)?;
            if collection.is_empty() {
                bail!("{} holds no game", path.display());
            }
            if collection.len() > 1 {
                warn!(games = collection.len(), "editing the first game only");
            }
            collection.remove(0)
        }
        None => new_root(size, size)?,
    };

    let mut session = Session::new(root);
    let stdin = io::stdin();
    session.run(stdin.lock(), io::stdout())?;

    let dirty = session.events().is_dirty();
    if let Some(path) = output {
        write_output(Some(path), &render_tree(&session.into_root()))?;
    } else if dirty {
        warn!("tree was modified but no --output was given; changes discarded");
    }
    Ok(())
}
