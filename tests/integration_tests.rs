//! Integration tests for goscore
//!
//! These exercise the public API end to end: board rules, the analysis passes
//! that can be driven one at a time, the full classifier, scoring, and the
//! classification diff used for regression files.

use goscore::analysis::Analysis;
use goscore::board::{Board, BoardError, Color};
use goscore::classify::{Classification, classify, diff_classification, diff_report};
use goscore::kind::Kind;
use goscore::playout::random_board;
use goscore::score::{
    ScoreError, ScoringRule, estimate_for_player, game_result, score_classified, score_for_player,
};

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

fn board(text: &str) -> Board {
    text.parse().expect("valid diagram")
}

/// An analysis with every empty group given its initial kind.
fn setup(b: &Board) -> Analysis<'_> {
    let mut a = Analysis::new(b, false);
    a.classify_empty_groups();
    a
}

/// Walls down the middle: two points each side, nothing neutral.
fn walls() -> Board {
    board(
        ". X O .
         . X O .
         . X O .
         . X O .",
    )
}

/// Black's wall with a dead white stone in its corner.
fn walls_with_dead_stone() -> Board {
    board(
        "O X O .
         . X O .
         . X O .
         . X O .",
    )
}

/// A handful of mid-game positions from seeded random play.
fn random_boards() -> Vec<Board> {
    [(5, 20), (7, 40), (9, 60), (9, 120)]
        .iter()
        .enumerate()
        .map(|(seed, &(size, moves))| {
            random_board(size, moves, seed as u64).expect("supported size")
        })
        .collect()
}

// =============================================================================
// Board rules
// =============================================================================

#[test]
fn test_single_stone_capture_sets_ko() {
    let mut b = board(
        ". X O .
         X O . O
         . X O .
         . . . .",
    );
    let ko = b.point(1, 1);
    let placement = b.place(b.point(2, 1), Color::Black).expect("empty point");
    assert_eq!(placement.stones_captured(), 1);
    assert!(!placement.suicide);
    assert_eq!(b.get(ko), None);
    assert_eq!(b.ko(), Some(ko));
    assert_eq!(b.captures(Color::White), &[ko]);
    assert!(b.captures(Color::Black).is_empty());
    // Retaking is legal shape-wise; the ko rule is the caller's concern.
    assert!(!b.is_suicide(ko, Color::White));
}

#[test]
fn test_surrounded_black_stone_goes_to_its_stack() {
    let mut b = board(
        ". O .
         O X O
         . . .",
    );
    let black = b.point(1, 1);
    assert_eq!(b.group_at(black).len(), 1);
    assert_eq!(b.liberties_at(black), 1);
    let placement = b.place(b.point(1, 2), Color::White).expect("empty point");
    assert_eq!(placement.captured, vec![vec![black]]);
    assert_eq!(b.captures(Color::Black).len(), 1);
    assert!(b.captures(Color::White).is_empty());
}

#[test]
fn test_place_rejects_occupied_point() {
    let mut b = board(
        ". X
         . .",
    );
    assert_eq!(
        b.place(1, Color::White),
        Err(BoardError::Occupied("B2".to_string()))
    );
    assert_eq!(b.place(4, Color::White), Err(BoardError::OutOfRange(4)));
}

#[test]
fn test_board_text_round_trip() {
    for b in random_boards() {
        let again: Board = b.to_string().parse().expect("printed board parses");
        assert!(b.points().all(|p| b.get(p) == again.get(p)));
    }
}

#[test]
fn test_rejects_unsupported_sizes() {
    assert_eq!(".".parse::<Board>(), Err(BoardError::UnsupportedSize(1)));
    assert!(matches!(
        ". .\n. X O".parse::<Board>(),
        Err(BoardError::Parse { line: 2, .. })
    ));
}

// =============================================================================
// Analysis passes
// =============================================================================

#[test]
fn test_corner_enclosed_by_black_is_territory() {
    let b = board(
        ". . . X .
         . . . X .
         . . . X .
         X X X X .
         . . . . .",
    );
    let a = setup(&b);
    let corner = a.group_of(0);
    assert_eq!(a.kind(corner), Kind::BlackTerritory);
    assert_eq!(a.size(corner), 9);
    assert_eq!(a.kind_at(b.point(4, 4)), Kind::BlackTerritory);
}

#[test]
fn test_gap_between_walls_becomes_outside_dame() {
    let b = board(
        ". X . O .
         . X . O .
         . X . O .
         . X . O .
         . X . O .",
    );
    let mut a = setup(&b);
    let gap = b.point(2, 0);
    assert_eq!(a.kind_at(gap), Kind::Dame);
    a.mark_as_territory();
    assert_eq!(a.kind_at(gap), Kind::OutsideDame);
    assert_eq!(a.kind_at(0), Kind::BlackTerritory);
    assert_eq!(a.kind_at(4), Kind::WhiteTerritory);
}

#[test]
fn test_self_atari_pass_marks_snapback() {
    let b = board(
        ". O . O .
         . O X O .
         . X O X .
         . . . . .
         . . . . .",
    );
    let mut a = setup(&b);
    let p = b.point(2, 0);
    a.mark_self_atari();
    assert_eq!(a.kind_at(p), Kind::WhiteSnapbackTerritory);
    assert_eq!(a.kind_at(b.point(2, 1)), Kind::DeadBlack);
}

#[test]
fn test_passes_keep_partition_intact() {
    for b in random_boards() {
        let mut a = setup(&b);
        assert!(a.part.covers_each_cell_once());
        a.mark_as_territory();
        assert!(a.part.covers_each_cell_once());
        a.mark_self_atari();
        assert!(a.part.covers_each_cell_once());
        a.mark_endgame_atari();
        a.remove_optional_fill();
        assert!(a.part.covers_each_cell_once());
    }
}

// =============================================================================
// Classification
// =============================================================================

#[test]
fn test_classification_covers_board() {
    for b in random_boards() {
        let c = classify(&b);
        assert_eq!(c.size(), b.size());
        assert_eq!(c.kinds().len(), b.area());
        for p in b.points() {
            let kind = c.kind_at(p);
            match b.get(p) {
                Some(color) => assert!(
                    kind.chip().is_none_or(|c| c == color),
                    "{} holds a {color} stone but is {kind}",
                    b.coord(p)
                ),
                None => assert!(!kind.is_stone_status(), "{} is empty but {kind}", b.coord(p)),
            }
        }
    }
}

#[test]
fn test_snapback_survives_full_classification() {
    let b = board(
        ". O . O . O X . .
         . O X O O O X . .
         . X O X O X X . .
         O O . O O X . . .
         . O O O X X . . .
         O O X X X . . . .
         X X X . . . . . .
         . . . . . . . . .
         . . . . . . . . .",
    );
    let c = classify(&b);
    let snapback = b.parse_coord("C9").expect("on board");
    assert_eq!(snapback, b.point(2, 0));
    assert_eq!(c.kind_at(snapback), Kind::WhiteSnapbackTerritory);
    assert!(c.kind_at(b.point(2, 1)).is_dead());
}

#[test]
fn test_classify_is_idempotent() {
    for b in random_boards() {
        let first = classify(&b);
        let second = classify(&b);
        assert_eq!(first, second);
        assert_eq!(
            score_for_player(&b, Color::Black),
            score_for_player(&b, Color::Black)
        );
    }
}

// =============================================================================
// Scoring
// =============================================================================

#[test]
fn test_result_with_komi() {
    let mut b = walls_with_dead_stone();
    b.komi = 6.5;
    let black = score_for_player(&b, Color::Black).expect("resolved");
    let white = score_for_player(&b, Color::White).expect("resolved");
    // Three points and a prisoner against four points less the dead stone.
    assert_eq!(black, 4.0);
    assert_eq!(white, 3.0 + 6.5);
    assert_eq!(game_result(black, white), "White wins by 5.5 points");

    let c = classify(&b);
    assert_eq!(c.kind_at(0), Kind::DeadWhite);
    assert_eq!(c.kind_at(b.point(0, 1)), Kind::BlackTerritory);
}

#[test]
fn test_undecided_groups_cannot_be_scored() {
    let b = random_board(9, 56, 14).expect("supported size");
    let c = classify(&b);
    assert!(
        c.kinds().iter().any(|k| matches!(k, Kind::Black | Kind::White)),
        "expected an undecided group"
    );
    assert!(matches!(
        score_for_player(&b, Color::Black),
        Err(ScoreError::Unresolved { .. })
    ));
    assert!(matches!(
        score_classified(&b, &c, Color::White, ScoringRule::Area),
        Err(ScoreError::Unresolved { .. })
    ));
    assert!(estimate_for_player(&b, Color::White).is_finite());
}

#[test]
fn test_area_score_never_exceeds_board() {
    for b in random_boards() {
        let c = classify(&b);
        let black = score_classified(&b, &c, Color::Black, ScoringRule::Area);
        let white = score_classified(&b, &c, Color::White, ScoringRule::Area);
        if let (Ok(black), Ok(white)) = (black, white) {
            assert!(black >= 0.0);
            assert!(black + white - b.komi <= b.area() as f64);
        }
    }
}

#[test]
fn test_area_score_splits_board_without_neutral_points() {
    for mut b in [walls(), walls_with_dead_stone()] {
        b.komi = 0.0;
        let c = classify(&b);
        let black = score_classified(&b, &c, Color::Black, ScoringRule::Area).expect("resolved");
        let white = score_classified(&b, &c, Color::White, ScoringRule::Area).expect("resolved");
        assert_eq!(black + white, b.area() as f64);
        assert_eq!(black, 8.0);
    }
}

// =============================================================================
// Comparing classifications
// =============================================================================

#[test]
fn test_diff_against_saved_classification() {
    let b = random_board(9, 80, 3).expect("supported size");
    let current = classify(&b);
    let saved = Classification::from_text(&current.as_text()).expect("own output parses");
    let diffs = diff_classification(&saved, &current).expect("same size");
    assert_eq!(diff_report(&diffs), "CS Compared ok");

    // Flip the top-left cell to something it cannot already be.
    let mut text = current.as_text();
    let replacement = if current.kind_at(0) == Kind::Dame { "b" } else { "." };
    text.replace_range(0..1, replacement);
    let edited = Classification::from_text(&text).expect("edited text parses");
    let diffs = diff_classification(&edited, &current).expect("same size");
    assert_eq!(diffs.len(), 1);
    assert!(diff_report(&diffs).starts_with("A9 was "));
}
