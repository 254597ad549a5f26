//! goscore: life-and-death classification and scoring for finished Go games.
//!
//! Given a board at the end of a game, the engine decides which groups are
//! alive, dead or in seki, which empty points belong to whom, and what the
//! score is. It works without further play, using a multi-pass heuristic
//! classifier over the group graph.
//!
//! ## Modules
//!
//! - [`board`] - Stones, adjacency, captures, ko and board text
//! - [`kind`] - Status tags for groups and cells
//! - [`group`] - Partition of the board into groups and regions
//! - [`analysis`] - Group graph queries for one classification run
//! - [`territory`], [`eyes`], [`endgame`] - The classification passes
//! - [`classify`] - The pass pipeline and its result
//! - [`score`] - Territory and area scoring
//! - [`playout`] - Seeded random games
//!
//! ## Example
//!
//! ```
//! use goscore::board::{Board, Color};
//! use goscore::score::{game_result, score_for_player};
//!
//! let board: Board = ". X O .
//!                     . X O .
//!                     . X O .
//!                     . X O ."
//!     .parse()
//!     .unwrap();
//! let black = score_for_player(&board, Color::Black).unwrap();
//! let white = score_for_player(&board, Color::White).unwrap();
//! println!("{}", game_result(black, white));
//! ```

/// Prints to stderr when the run was asked to trace.
macro_rules! trace {
    ($run:expr, $($arg:tt)*) => {
        if $run.trace {
            eprintln!($($arg)*);
        }
    };
}

pub mod analysis;
pub mod board;
pub mod classify;
pub mod constants;
pub mod endgame;
pub mod eyes;
pub mod group;
pub mod kind;
pub mod playout;
pub mod score;
pub mod sweep;
pub mod territory;
