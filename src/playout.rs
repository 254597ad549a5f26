//! Random games.
//!
//! Plays uniformly random moves for both colors, skipping own eyes, suicide
//! and the ko point. Used to generate boards for property tests and by the
//! `random` command.

use crate::board::{Board, BoardError, Color, Point};

/// Plays up to `moves` random moves from an empty board, Black first. Stops
/// early when both colors have to pass in a row.
pub fn random_board(size: usize, moves: usize, seed: u64) -> Result<Board, BoardError> {
    let mut board = Board::try_new(size)?;
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut color = Color::Black;
    let mut passes = 0;
    for _ in 0..moves {
        match choose_random_move(&board, color, &mut rng) {
            Some(p) => {
                board.place(p, color)?;
                passes = 0;
            }
            None => {
                passes += 1;
                if passes == 2 {
                    break;
                }
            }
        }
        color = color.opponent();
    }
    Ok(board)
}

/// A random legal point for `color` that does not fill its own eye.
fn choose_random_move(board: &Board, color: Color, rng: &mut fastrand::Rng) -> Option<Point> {
    let mut candidates: Vec<Point> = board
        .points()
        .filter(|&p| board.get(p).is_none() && board.is_eye(p) != Some(color))
        .collect();
    rng.shuffle(&mut candidates);
    candidates
        .into_iter()
        .find(|&p| Some(p) != board.ko() && !board.is_suicide(p, color))
}
