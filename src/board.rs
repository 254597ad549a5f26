//! Board state: stones, adjacency, captures and ko.
//!
//! Points are row-major indices with row 0 at the top. Coordinates in text use
//! a column letter (skipping `I`) and a row number counted from the bottom, so
//! `A1` is the bottom-left corner.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use thiserror::Error;

use crate::constants::{
    COLUMNS, DEFAULT_KOMI, GLYPH_BLACK, GLYPH_BLACK_ALIVE, GLYPH_EMPTY, GLYPH_WHITE,
    GLYPH_WHITE_ALIVE, MAX_SIZE, MIN_SIZE,
};
use crate::sweep::Marks;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// The other colour.
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Index into per-color arrays.
    pub fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Black => "Black",
            Color::White => "White",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type Point = usize;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("board size {0} is outside {min}..={max}", min = MIN_SIZE, max = MAX_SIZE)]
    UnsupportedSize(usize),
    #[error("point {0} is off the board")]
    OutOfRange(Point),
    #[error("{0} is already occupied")]
    Occupied(String),
    #[error("bad coordinate {0:?}")]
    BadCoordinate(String),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Text coordinate of `p` on a board of the given size.
pub fn coord_on(size: usize, p: Point) -> String {
    let (x, y) = (p % size, p / size);
    format!("{}{}", COLUMNS[x] as char, size - y)
}

/// Up to four neighbouring points, yielded in a fixed order.
#[derive(Clone, Copy, Debug)]
pub struct Adjacent {
    points: [Point; 4],
    len: usize,
    next: usize,
}

impl Adjacent {
    fn empty() -> Self {
        Self {
            points: [0; 4],
            len: 0,
            next: 0,
        }
    }

    fn push(&mut self, p: Point) {
        self.points[self.len] = p;
        self.len += 1;
    }
}

impl Iterator for Adjacent {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.next == self.len {
            return None;
        }
        let p = self.points[self.next];
        self.next += 1;
        Some(p)
    }
}

/// Outcome of a successful [`Board::place`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Placement {
    /// Each captured opponent group, in neighbour order.
    pub captured: Vec<Vec<Point>>,
    /// The placed stone's own group was left without liberties.
    pub suicide: bool,
}

impl Placement {
    /// Total stones removed by this placement.
    pub fn stones_captured(&self) -> usize {
        self.captured.iter().map(Vec::len).sum()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    size: usize,
    cells: Vec<Option<Color>>,
    alive: Vec<bool>,
    captures: [Vec<Point>; 2],
    ko: Option<Point>,
    pub komi: f64,
}

impl Board {
    /// Empty board. Panics if `size` is outside the supported range; use
    /// [`Board::try_new`] for sizes that come from input.
    pub fn new(size: usize) -> Self {
        match Self::try_new(size) {
            Ok(board) => board,
            Err(_) => panic!("board size {size} is outside {MIN_SIZE}..={MAX_SIZE}"),
        }
    }

    /// Empty board, or `UnsupportedSize` outside `MIN_SIZE..=MAX_SIZE`.
    pub fn try_new(size: usize) -> Result<Self, BoardError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(BoardError::UnsupportedSize(size));
        }
        Ok(Self {
            size,
            cells: vec![None; size * size],
            alive: vec![false; size * size],
            captures: [Vec::new(), Vec::new()],
            ko: None,
            komi: DEFAULT_KOMI,
        })
    }

    /// Number of lines in each direction.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of points, `size * size`.
    pub fn area(&self) -> usize {
        self.size * self.size
    }

    /// Every point in row-major order, top row first.
    pub fn points(&self) -> Range<Point> {
        0..self.area()
    }

    /// Point at column `x` and row `y`, row 0 at the top.
    pub fn point(&self, x: usize, y: usize) -> Point {
        y * self.size + x
    }

    /// Inverse of [`Board::point`].
    pub fn xy(&self, p: Point) -> (usize, usize) {
        (p % self.size, p / self.size)
    }

    /// Stone on `p`, if any.
    pub fn get(&self, p: Point) -> Option<Color> {
        self.cells[p]
    }

    /// Sets a point directly, without captures. Used to set up positions.
    pub fn set(&mut self, p: Point, stone: Option<Color>) {
        self.cells[p] = stone;
        if stone.is_none() {
            self.alive[p] = false;
        }
    }

    /// Reviewer annotation: the stone at `p` must be treated as alive.
    pub fn is_flagged_alive(&self, p: Point) -> bool {
        self.alive[p]
    }

    /// Sets the alive annotation. Ignored on empty points.
    pub fn flag_alive(&mut self, p: Point, alive: bool) {
        self.alive[p] = alive && self.cells[p].is_some();
    }

    /// Stones of `color` captured so far, in capture order.
    pub fn captures(&self, color: Color) -> &[Point] {
        &self.captures[color.index()]
    }

    /// Point the last single-stone capture made illegal to retake.
    pub fn ko(&self) -> Option<Point> {
        self.ko
    }

    pub fn is_edge(&self, p: Point) -> bool {
        let (x, y) = self.xy(p);
        x == 0 || y == 0 || x + 1 == self.size || y + 1 == self.size
    }

    /// Orthogonal neighbours: left, right, up, down.
    pub fn neighbors(&self, p: Point) -> Adjacent {
        let (x, y) = self.xy(p);
        let s = self.size;
        let mut adj = Adjacent::empty();
        if x > 0 {
            adj.push(p - 1);
        }
        if x + 1 < s {
            adj.push(p + 1);
        }
        if y > 0 {
            adj.push(p - s);
        }
        if y + 1 < s {
            adj.push(p + s);
        }
        adj
    }

    /// Diagonal neighbours that are on the board.
    pub fn diagonals(&self, p: Point) -> Adjacent {
        let (x, y) = self.xy(p);
        let s = self.size;
        let mut adj = Adjacent::empty();
        if x > 0 && y > 0 {
            adj.push(p - s - 1);
        }
        if x + 1 < s && y > 0 {
            adj.push(p - s + 1);
        }
        if x > 0 && y + 1 < s {
            adj.push(p + s - 1);
        }
        if x + 1 < s && y + 1 < s {
            adj.push(p + s + 1);
        }
        adj
    }

    /// Connected points reachable from `seed` through points whose content
    /// satisfies `same`. The seed is always included.
    pub fn flood_by(
        &self,
        seed: Point,
        marks: &mut Marks,
        same: impl Fn(Option<Color>) -> bool,
    ) -> Vec<Point> {
        let token = marks.fresh();
        marks.visit(seed, token);
        let mut stack = vec![seed];
        let mut out = Vec::new();
        while let Some(p) = stack.pop() {
            out.push(p);
            for n in self.neighbors(p) {
                if same(self.cells[n]) && marks.visit(n, token) {
                    stack.push(n);
                }
            }
        }
        out
    }

    /// Points with the same content as `seed`, connected to it.
    pub fn flood(&self, seed: Point, marks: &mut Marks) -> Vec<Point> {
        let content = self.cells[seed];
        self.flood_by(seed, marks, |c| c == content)
    }

    /// Chain of stones, or area of empty points, containing `p`.
    pub fn group_at(&self, p: Point) -> Vec<Point> {
        let mut marks = Marks::new(self.area());
        self.flood(p, &mut marks)
    }

    fn count_liberties(&self, group: &[Point], marks: &mut Marks) -> usize {
        let token = marks.fresh();
        let mut count = 0;
        for &p in group {
            for n in self.neighbors(p) {
                if self.cells[n].is_none() && marks.tag_new(n, token) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Liberties of the whole group containing `p`; zero for an empty point.
    pub fn liberties_at(&self, p: Point) -> usize {
        if self.cells[p].is_none() {
            return 0;
        }
        let mut marks = Marks::new(self.area());
        let group = self.flood(p, &mut marks);
        self.count_liberties(&group, &mut marks)
    }

    /// Places a stone and removes opponent groups left without liberties.
    ///
    /// The mover's own group is never removed, even with no liberties left.
    /// Capturing exactly one stone sets the ko point to where it stood.
    pub fn place(&mut self, p: Point, color: Color) -> Result<Placement, BoardError> {
        if p >= self.area() {
            return Err(BoardError::OutOfRange(p));
        }
        if self.cells[p].is_some() {
            return Err(BoardError::Occupied(self.coord(p)));
        }
        self.cells[p] = Some(color);

        let opp = color.opponent();
        let mut marks = Marks::new(self.area());
        let mut captured: Vec<Vec<Point>> = Vec::new();
        for n in self.neighbors(p) {
            if self.cells[n] != Some(opp) || captured.iter().any(|g| g.contains(&n)) {
                continue;
            }
            let group = self.flood(n, &mut marks);
            if self.count_liberties(&group, &mut marks) == 0 {
                captured.push(group);
            }
        }
        for group in &captured {
            for &q in group {
                self.cells[q] = None;
                self.alive[q] = false;
                self.captures[opp.index()].push(q);
            }
        }

        let placement = Placement {
            suicide: self.liberties_at(p) == 0,
            captured,
        };
        self.ko = match placement.captured.as_slice() {
            [single] if single.len() == 1 => Some(single[0]),
            _ => None,
        };
        Ok(placement)
    }

    /// Whether a stone of `color` at empty `p` would have no liberties and
    /// capture nothing.
    pub fn is_suicide(&self, p: Point, color: Color) -> bool {
        let mut marks = Marks::new(self.area());
        for n in self.neighbors(p) {
            let Some(c) = self.cells[n] else {
                return false;
            };
            let group = self.flood(n, &mut marks);
            let libs = self.count_liberties(&group, &mut marks);
            if (c == color && libs > 1) || (c != color && libs == 1) {
                return false;
            }
        }
        true
    }

    /// Color surrounding `p` on all sides, if any. May be a false eye.
    pub fn is_eyeish(&self, p: Point) -> Option<Color> {
        let mut eye_color = None;
        for n in self.neighbors(p) {
            let c = self.cells[n]?;
            match eye_color {
                None => eye_color = Some(c),
                Some(e) if e != c => return None,
                _ => {}
            }
        }
        eye_color
    }

    /// Color of the true eye at `p`: eyeish, with no opponent diagonal in the
    /// centre and at most one on the edge.
    pub fn is_eye(&self, p: Point) -> Option<Color> {
        let eye_color = self.is_eyeish(p)?;
        let tolerance = if self.is_edge(p) { 1 } else { 0 };
        let false_count = self
            .diagonals(p)
            .filter(|&d| self.cells[d] == Some(eye_color.opponent()))
            .count();
        if false_count > tolerance {
            return None;
        }
        Some(eye_color)
    }

    /// Eyeish, but too many opponent diagonals for a real eye.
    pub fn is_false_eye(&self, p: Point) -> bool {
        self.is_eyeish(p).is_some() && self.is_eye(p).is_none()
    }

    /// Human coordinate such as `A1` (bottom left, no `I` column).
    pub fn coord(&self, p: Point) -> String {
        coord_on(self.size, p)
    }

    /// Inverse of [`Board::coord`]. Case-insensitive column letter.
    pub fn parse_coord(&self, s: &str) -> Result<Point, BoardError> {
        let bad = || BoardError::BadCoordinate(s.to_string());
        let s = s.trim();
        let mut chars = s.chars();
        let letter = chars.next().ok_or_else(bad)?.to_ascii_uppercase();
        let x = COLUMNS[..self.size]
            .iter()
            .position(|&c| c as char == letter)
            .ok_or_else(bad)?;
        let row: usize = chars.as_str().parse().map_err(|_| bad())?;
        if row == 0 || row > self.size {
            return Err(bad());
        }
        Ok(self.point(x, self.size - row))
    }
}

impl FromStr for Board {
    type Err = BoardError;

    /// Parses a diagram: one line per row, top row first. Spaces are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<(usize, Vec<char>)> = s
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.chars().filter(|c| !c.is_whitespace()).collect()))
            .filter(|(_, row): &(usize, Vec<char>)| !row.is_empty())
            .collect();
        let size = rows.len();
        let mut board = Board::try_new(size)?;
        for (y, (line, row)) in rows.iter().enumerate() {
            if row.len() != size {
                return Err(BoardError::Parse {
                    line: *line,
                    message: format!("expected {size} points, found {}", row.len()),
                });
            }
            for (x, &ch) in row.iter().enumerate() {
                let p = board.point(x, y);
                let (stone, alive) = match ch {
                    GLYPH_EMPTY => (None, false),
                    GLYPH_BLACK => (Some(Color::Black), false),
                    GLYPH_WHITE => (Some(Color::White), false),
                    GLYPH_BLACK_ALIVE => (Some(Color::Black), true),
                    GLYPH_WHITE_ALIVE => (Some(Color::White), true),
                    _ => {
                        return Err(BoardError::Parse {
                            line: *line,
                            message: format!("unexpected character {ch:?}"),
                        });
                    }
                };
                board.set(p, stone);
                board.flag_alive(p, alive);
            }
        }
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size {
            for x in 0..self.size {
                let p = self.point(x, y);
                let ch = match (self.cells[p], self.alive[p]) {
                    (Some(Color::Black), false) => GLYPH_BLACK,
                    (Some(Color::Black), true) => GLYPH_BLACK_ALIVE,
                    (Some(Color::White), false) => GLYPH_WHITE,
                    (Some(Color::White), true) => GLYPH_WHITE_ALIVE,
                    (None, _) => GLYPH_EMPTY,
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(text: &str) -> Board {
        text.parse().expect("valid diagram")
    }

    #[test]
    fn test_empty_board() {
        let b = Board::new(9);
        assert_eq!(b.area(), 81);
        assert!(b.points().all(|p| b.get(p).is_none()));
        assert_eq!(b.ko(), None);
        assert_eq!(b.komi, DEFAULT_KOMI);
    }

    #[test]
    fn test_try_new_checks_size() {
        assert_eq!(Board::try_new(1), Err(BoardError::UnsupportedSize(1)));
        assert_eq!(Board::try_new(MAX_SIZE + 1), Err(BoardError::UnsupportedSize(MAX_SIZE + 1)));
        assert_eq!(Board::try_new(MIN_SIZE).map(|b| b.area()), Ok(MIN_SIZE * MIN_SIZE));
        assert_eq!(Board::try_new(9), Ok(Board::new(9)));
    }

    #[test]
    fn test_neighbors_corner_and_center() {
        let b = Board::new(5);
        assert_eq!(b.neighbors(0).collect::<Vec<_>>(), vec![1, 5]);
        assert_eq!(b.neighbors(12).collect::<Vec<_>>(), vec![11, 13, 7, 17]);
        assert_eq!(b.diagonals(0).collect::<Vec<_>>(), vec![6]);
        assert_eq!(b.diagonals(12).count(), 4);
    }

    #[test]
    fn test_coord_roundtrip() {
        let b = Board::new(19);
        for p in b.points() {
            let s = b.coord(p);
            assert_eq!(b.parse_coord(&s), Ok(p), "failed roundtrip for {s}");
        }
        assert_eq!(b.coord(b.point(0, 18)), "A1");
        assert_eq!(b.coord(b.point(8, 0)), "J19");
    }

    #[test]
    fn test_parse_coord_rejects_garbage() {
        let b = Board::new(9);
        assert!(b.parse_coord("I5").is_err());
        assert!(b.parse_coord("K1").is_err());
        assert!(b.parse_coord("A0").is_err());
        assert!(b.parse_coord("A10").is_err());
        assert!(b.parse_coord("").is_err());
    }

    #[test]
    fn test_capture_single_stone() {
        let mut b = Board::new(5);
        let center = b.point(2, 2);
        b.place(center, Color::Black).unwrap();
        b.place(b.point(1, 2), Color::White).unwrap();
        b.place(b.point(3, 2), Color::White).unwrap();
        b.place(b.point(2, 1), Color::White).unwrap();
        let result = b.place(b.point(2, 3), Color::White).unwrap();

        assert_eq!(result.captured, vec![vec![center]]);
        assert!(!result.suicide);
        assert_eq!(b.get(center), None);
        assert_eq!(b.captures(Color::Black), &[center]);
        assert!(b.captures(Color::White).is_empty());
    }

    #[test]
    fn test_ko_point_set_and_cleared() {
        let mut b = board(
            ". X O . .
             X O . O .
             . X O . .
             . . . . .
             . . . . .",
        );
        let result = b.place(b.point(2, 1), Color::Black).unwrap();
        assert_eq!(result.stones_captured(), 1);
        assert_eq!(b.ko(), Some(b.point(1, 1)));

        b.place(b.point(4, 4), Color::White).unwrap();
        assert_eq!(b.ko(), None);
    }

    #[test]
    fn test_two_group_capture_leaves_no_ko() {
        let mut b = board(
            ". O X .
             O X X .
             X . . .
             . . . .",
        );
        let result = b.place(b.point(0, 0), Color::Black).unwrap();
        assert_eq!(result.captured.len(), 2);
        assert_eq!(result.stones_captured(), 2);
        assert_eq!(b.ko(), None);
        assert_eq!(b.captures(Color::White).len(), 2);
    }

    #[test]
    fn test_occupied_and_out_of_range() {
        let mut b = Board::new(5);
        b.place(3, Color::Black).unwrap();
        assert_eq!(
            b.place(3, Color::White),
            Err(BoardError::Occupied("D5".to_string()))
        );
        assert_eq!(b.place(25, Color::White), Err(BoardError::OutOfRange(25)));
    }

    #[test]
    fn test_suicide_is_reported_not_removed() {
        let mut b = board(
            ". O .
             O . .
             . . .",
        );
        assert!(b.is_suicide(0, Color::Black));
        let result = b.place(0, Color::Black).unwrap();
        assert!(result.suicide);
        assert_eq!(b.get(0), Some(Color::Black));
    }

    #[test]
    fn test_group_liberties() {
        let b = board(
            ". . . .
             . X X .
             . X . .
             . . . .",
        );
        assert_eq!(b.group_at(b.point(1, 1)).len(), 3);
        assert_eq!(b.liberties_at(b.point(2, 1)), 7);
        assert_eq!(b.liberties_at(0), 0);
    }

    #[test]
    fn test_is_eye() {
        let b = board(
            ". X . . .
             X X . . .
             . . . . .
             . . . . .
             . . . . .",
        );
        assert_eq!(b.is_eyeish(0), Some(Color::Black));
        assert_eq!(b.is_eye(0), Some(Color::Black));
        assert_eq!(b.is_eye(b.point(2, 2)), None);

        let edge = board(
            "X . X . .
             . X O . .
             . . . . .
             . . . . .
             . . . . .",
        );
        let p = edge.point(1, 0);
        assert_eq!(edge.is_eyeish(p), Some(Color::Black));
        assert!(edge.is_eye(p).is_some());

        let center_false = board(
            ". X O . .
             X . X . .
             O X . . .
             . . . . .
             . . . . .",
        );
        let p = center_false.point(1, 1);
        assert_eq!(center_false.is_eyeish(p), Some(Color::Black));
        assert!(center_false.is_false_eye(p));
    }

    #[test]
    fn test_parse_and_display() {
        let text = "X . o\n. O .\nx . .\n";
        let b = board(text);
        assert_eq!(b.size(), 3);
        assert_eq!(b.get(0), Some(Color::Black));
        assert!(!b.is_flagged_alive(0));
        assert_eq!(b.get(2), Some(Color::White));
        assert!(b.is_flagged_alive(2));
        assert!(b.is_flagged_alive(6));

        let again: Board = b.to_string().parse().unwrap();
        assert_eq!(again, b);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "X".parse::<Board>(),
            Err(BoardError::UnsupportedSize(1))
        );
        assert!(matches!(
            "X .\n. ?".parse::<Board>(),
            Err(BoardError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            "X . .\n. .\n. . .".parse::<Board>(),
            Err(BoardError::Parse { line: 2, .. })
        ));
    }
}
