//! goscore: classify and score finished Go games.
//!
//! ## Usage
//!
//! - `goscore classify board.txt` - Print the status of every point
//! - `goscore score board.txt` - Print both scores and the result
//! - `goscore diff old.txt new.txt` - Compare two classification files
//! - `goscore random` - Print a random board

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use goscore::board::{Board, Color};
use goscore::classify::{
    Classification, ClassifyConfig, classify_with, diff_classification, diff_report,
};
use goscore::constants::{DEFAULT_KOMI, DEFAULT_SIZE};
use goscore::playout::random_board;
use goscore::score::{ScoringRule, game_result, score_classified};

/// goscore: life-and-death classification and scoring for Go
#[derive(Parser)]
#[command(name = "goscore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log every classification pass to stderr
    #[arg(long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a board diagram and print one status code per point
    Classify {
        /// Board diagram: `.` empty, `X`/`O` stones, `x`/`o` stones marked alive
        file: PathBuf,
    },
    /// Score a board diagram for both players
    Score {
        file: PathBuf,
        /// Points awarded to White
        #[arg(long, default_value_t = DEFAULT_KOMI)]
        komi: f64,
        /// Count stones and territory instead of territory and prisoners
        #[arg(long)]
        area: bool,
    },
    /// Compare two classification files written by `classify`
    Diff { old: PathBuf, new: PathBuf },
    /// Play a seeded random game and print the board
    Random {
        #[arg(long, default_value_t = DEFAULT_SIZE)]
        size: usize,
        #[arg(long, default_value_t = 120)]
        moves: usize,
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ClassifyConfig { trace: cli.trace };

    match cli.command {
        Commands::Classify { file } => {
            let board = read_board(&file)?;
            let classification = classify_with(&board, &config);
            println!("{}", classification.as_text());
            report_inconsistencies(&classification);
        }
        Commands::Score { file, komi, area } => {
            let mut board = read_board(&file)?;
            board.komi = komi;
            let rule = if area {
                ScoringRule::Area
            } else {
                ScoringRule::Territory
            };
            let classification = classify_with(&board, &config);
            report_inconsistencies(&classification);
            let black = score_classified(&board, &classification, Color::Black, rule)
                .context("scoring Black")?;
            let white = score_classified(&board, &classification, Color::White, rule)
                .context("scoring White")?;
            println!("Black: {black}");
            println!("White: {white}");
            println!("{}", game_result(black, white));
        }
        Commands::Diff { old, new } => {
            let old = read_classification(&old)?;
            let new = read_classification(&new)?;
            let diffs = diff_classification(&old, &new)?;
            println!("{}", diff_report(&diffs));
        }
        Commands::Random { size, moves, seed } => {
            let board = random_board(size, moves, seed)
                .with_context(|| format!("random {size}x{size} board"))?;
            print!("{board}");
        }
    }
    Ok(())
}

fn read_board(path: &Path) -> Result<Board> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    text.parse()
        .with_context(|| format!("parsing board {}", path.display()))
}

fn read_classification(path: &Path) -> Result<Classification> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Classification::from_text(&text)
        .with_context(|| format!("parsing classification {}", path.display()))
}

fn report_inconsistencies(classification: &Classification) {
    for problem in classification.inconsistencies() {
        eprintln!("warning: {problem}");
    }
}
