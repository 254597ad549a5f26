//! Scoring a classified board.
//!
//! Territory scoring counts surrounded points and prisoners: stones captured
//! during the game (the board's capture stacks) and stones left dead on the
//! board. Area scoring counts live stones and surrounded points.

use thiserror::Error;

use crate::board::{Board, Color};
use crate::classify::{Classification, classify};
use crate::kind::Kind;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ScoringRule {
    #[default]
    Territory,
    Area,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoreError {
    #[error("{coord} is still {kind}: classification is unresolved")]
    Unresolved { coord: String, kind: Kind },
}

/// Classifies `board` and scores it for `color` under the territory rule.
pub fn score_for_player(board: &Board, color: Color) -> Result<f64, ScoreError> {
    let classification = classify(board);
    score_classified(board, &classification, color, ScoringRule::Territory)
}

/// Scores an existing classification.
///
/// Fails if any cell is still `Empty` or a region, or belongs to a stone group
/// left plain `Black` or `White`.
pub fn score_classified(
    board: &Board,
    classification: &Classification,
    color: Color,
    rule: ScoringRule,
) -> Result<f64, ScoreError> {
    if let Some(p) = board
        .points()
        .find(|&p| classification.kind_at(p).is_unresolved())
    {
        return Err(ScoreError::Unresolved {
            coord: board.coord(p),
            kind: classification.kind_at(p),
        });
    }
    Ok(tally(board, classification, color, rule))
}

/// Like [`score_for_player`], but unresolved cells simply count for nobody.
pub fn estimate_for_player(board: &Board, color: Color) -> f64 {
    tally(board, &classify(board), color, ScoringRule::Territory)
}

fn tally(board: &Board, classification: &Classification, color: Color, rule: ScoringRule) -> f64 {
    let mut score = if color == Color::White { board.komi } else { 0.0 };
    let own_fill = Kind::stone_kind(color).fill_kind();
    for p in board.points() {
        let kind = classification.kind_at(p);
        let point = match rule {
            ScoringRule::Territory => territory_point(kind, color, own_fill, board.get(p).is_some()),
            ScoringRule::Area => area_point(kind, color),
        };
        score += f64::from(point);
    }
    if rule == ScoringRule::Territory {
        score -= board.captures(color).len() as f64;
    }
    score
}

fn territory_point(kind: Kind, color: Color, own_fill: Kind, occupied: bool) -> i32 {
    match kind {
        // Captured during the endgame and filled: the captive counts, the point does not.
        Kind::FillBlack | Kind::FillWhite | Kind::ReservedForBlack | Kind::ReservedForWhite => {
            i32::from(occupied && kind == own_fill)
        }
        Kind::DeadBlack | Kind::DeadWhite | Kind::RemovedBlack | Kind::RemovedWhite => {
            if kind.chip() == Some(color) { -1 } else { 1 }
        }
        Kind::BlackTerritory
        | Kind::WhiteTerritory
        | Kind::BlackSnapbackTerritory
        | Kind::WhiteSnapbackTerritory => i32::from(kind.fill_chip() == Some(color)),
        _ => 0,
    }
}

fn area_point(kind: Kind, color: Color) -> i32 {
    match kind {
        Kind::SafeBlack | Kind::SafeWhite | Kind::SekiBlack | Kind::SekiWhite => {
            i32::from(kind.chip() == Some(color))
        }
        Kind::DeadBlack | Kind::DeadWhite | Kind::RemovedBlack | Kind::RemovedWhite => {
            i32::from(kind.chip() != Some(color))
        }
        Kind::BlackTerritory
        | Kind::WhiteTerritory
        | Kind::BlackSnapbackTerritory
        | Kind::WhiteSnapbackTerritory => i32::from(kind.fill_chip() == Some(color)),
        _ => 0,
    }
}

/// `Black wins by X points`, `White wins by X points` or `Jigo`.
pub fn game_result(black: f64, white: f64) -> String {
    let margin = black - white;
    if margin > 0.0 {
        format!("Black wins by {margin} points")
    } else if margin < 0.0 {
        format!("White wins by {} points", -margin)
    } else {
        "Jigo".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(text: &str) -> Board {
        text.parse().expect("valid diagram")
    }

    #[test]
    fn test_game_result_text() {
        assert_eq!(game_result(10.0, 4.5), "Black wins by 5.5 points");
        assert_eq!(game_result(1.0, 6.5), "White wins by 5.5 points");
        assert_eq!(game_result(3.0, 3.0), "Jigo");
    }

    #[test]
    fn test_komi_goes_to_white() {
        let b = Board::new(5);
        assert_eq!(score_for_player(&b, Color::Black), Ok(0.0));
        assert_eq!(score_for_player(&b, Color::White), Ok(b.komi));
    }

    #[test]
    fn test_territory_and_prisoners() {
        let mut b = board(
            ". X . . .
             X X . . .
             . . . . .
             . . . . .
             . . . . .",
        );
        b.komi = 0.0;
        let black = b.point(1, 1);
        // Black captures a white stone at the corner elsewhere on the board.
        b.place(b.point(4, 4), Color::White).expect("empty");
        b.place(b.point(3, 4), Color::Black).expect("empty");
        b.place(b.point(4, 3), Color::Black).expect("empty");
        assert_eq!(b.captures(Color::White).len(), 1);
        assert_eq!(b.get(black), Some(Color::Black));

        let c = classify(&b);
        let white = score_classified(&b, &c, Color::White, ScoringRule::Territory);
        let black_score = score_classified(&b, &c, Color::Black, ScoringRule::Territory);
        // White lost a stone and owns nothing.
        assert_eq!(white, Ok(-1.0));
        assert!(black_score.is_ok_and(|s| s >= 1.0));
    }

    #[test]
    fn test_unresolved_cells_fail() {
        let b = Board::new(3);
        let c = Classification::from_text("???\n???\n???").expect("valid");
        assert!(matches!(
            score_classified(&b, &c, Color::Black, ScoringRule::Area),
            Err(ScoreError::Unresolved { kind: Kind::Empty, .. })
        ));
        assert_eq!(estimate_for_player(&b, Color::Black), 0.0);
    }

    #[test]
    fn test_undecided_group_fails() {
        let b = board(
            "O O .
             . . .
             . . .",
        );
        let c = Classification::from_text("OO.\n...\n...").expect("valid");
        assert_eq!(
            score_classified(&b, &c, Color::Black, ScoringRule::Territory),
            Err(ScoreError::Unresolved {
                coord: "A3".to_string(),
                kind: Kind::White,
            })
        );
        assert!(matches!(
            score_classified(&b, &c, Color::White, ScoringRule::Area),
            Err(ScoreError::Unresolved { kind: Kind::White, .. })
        ));
        // The estimate still counts what it can.
        assert_eq!(estimate_for_player(&b, Color::White), b.komi);
    }

    #[test]
    fn test_area_rule_counts_stones() {
        let mut b = board(
            ". X O .
             . X O .
             . X O .
             . X O .",
        );
        b.komi = 0.5;
        let c = classify(&b);
        let black = score_classified(&b, &c, Color::Black, ScoringRule::Area).expect("resolved");
        let white = score_classified(&b, &c, Color::White, ScoringRule::Area).expect("resolved");
        assert_eq!(black, 8.0);
        assert_eq!(white, 8.5);
        assert_eq!(game_result(black, white), "White wins by 0.5 points");
    }
}
