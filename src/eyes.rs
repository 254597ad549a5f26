//! Eye counting.
//!
//! A stone group's eyes come from the territories attached to it. Small
//! connected eye spaces are judged by shape; anything larger, or any space the
//! surrounding stones have not yet closed, falls back to a heuristic driven by
//! how much of the space is taken up by enemy stones.

use crate::analysis::Analysis;
use crate::board::Point;
use crate::constants::{
    MAX_INSIDE_CONNECTIONS, ONE_EYE_INTRON_FRACTION, SETTLED_EYE_SPACE, SHAPE_EYE_LIMIT,
    TWO_EYE_INTRON_FRACTION, UNCONNECTED_EYE_LIMIT,
};
use crate::group::GroupId;
use crate::kind::Kind;

/// How a small eye space plays out with the defender to move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Fate {
    /// Killable by a play at the vital point; one eye at most.
    Dead,
    /// Big or irregular enough for two eyes.
    Alive,
    /// Neither side can approach the introns.
    Seki,
}

/// An eye space: a region, a removed group, or part of one.
#[derive(Clone, Debug)]
pub struct Shape {
    pub kind: Kind,
    pub cells: Vec<Point>,
    member: Vec<bool>,
}

impl Shape {
    pub fn new(kind: Kind, cells: Vec<Point>, area: usize) -> Self {
        let mut member = vec![false; area];
        for &p in &cells {
            member[p] = true;
        }
        Self { kind, cells, member }
    }

    /// `p` is part of the space.
    pub fn contains(&self, p: Point) -> bool {
        self.member[p]
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The same space minus `removed`.
    fn without(&self, removed: &[Point]) -> Shape {
        let cells = self
            .cells
            .iter()
            .copied()
            .filter(|p| !removed.contains(p))
            .collect();
        Shape::new(self.kind, cells, self.member.len())
    }
}

impl Analysis<'_> {
    /// The eye space made of the cells of `g`.
    pub fn shape_of(&self, g: GroupId) -> Shape {
        Shape::new(self.kind(g), self.cells(g), self.board.area())
    }

    // =========================================================================
    // Shape geometry
    // =========================================================================

    /// Stone groups just outside the shape.
    fn shape_adjacent_groups(&self, shape: &Shape) -> Vec<GroupId> {
        let mut out = Vec::new();
        for &p in &shape.cells {
            for n in self.board.neighbors(p) {
                if shape.contains(n) {
                    continue;
                }
                let gr = self.group_of(n);
                if self.kind(gr).is_stone_status() && !out.contains(&gr) {
                    out.push(gr);
                }
            }
        }
        out
    }

    /// Stone groups with a stone inside a region shape.
    fn shape_embedded(&self, shape: &Shape) -> Vec<GroupId> {
        let mut out = Vec::new();
        if !shape.kind.is_region() {
            return out;
        }
        for &p in &shape.cells {
            if self.board.get(p).is_some() {
                let gr = self.group_of(p);
                if !out.contains(&gr) {
                    out.push(gr);
                }
            }
        }
        out
    }

    /// Cells of `start`'s component inside `shape`, avoiding `exclude`.
    fn connected_size(&self, start: Point, shape: &Shape, exclude: Option<&[Point]>) -> usize {
        let blocked = |p: Point| !shape.contains(p) || exclude.is_some_and(|e| e.contains(&p));
        if blocked(start) {
            return 0;
        }
        let mut seen = vec![false; self.board.area()];
        let mut stack = vec![start];
        seen[start] = true;
        let mut count = 0;
        while let Some(p) = stack.pop() {
            count += 1;
            for n in self.board.neighbors(p) {
                if !seen[n] && !blocked(n) {
                    seen[n] = true;
                    stack.push(n);
                }
            }
        }
        count
    }

    fn is_simply_connected(&self, points: &[Point]) -> bool {
        let Some(&first) = points.first() else {
            return true;
        };
        let set = Shape::new(Kind::Empty, points.to_vec(), self.board.area());
        self.connected_size(first, &set, None) == points.len()
    }

    /// Stones around the shape plus the outside points that connect them.
    fn outside_connected_border(&self, shape: &Shape, adjacent: &[GroupId]) -> Vec<Point> {
        let mut border = Vec::new();
        for &adj in adjacent.iter().rev() {
            border.extend(self.part.group(adj).cells.iter().copied());
        }
        for &adj in adjacent.iter().rev() {
            for conn in self.connections(adj).into_iter().rev() {
                if !shape.contains(conn.from) && !border.contains(&conn.from) {
                    border.push(conn.from);
                }
            }
        }
        border
    }

    /// Adds connection points inside the shape to `border` until the border
    /// stones join up. A result that splits the rest of the shape in two wins
    /// outright, otherwise the fewest points.
    fn inside_connected_border(
        &self,
        shape: &Shape,
        border: &mut Vec<Point>,
        candidates: &[Point],
        start: usize,
        depth: usize,
    ) -> Option<Vec<Point>> {
        let mut best: Option<Vec<Point>> = None;
        for (i, &p) in candidates.iter().enumerate().skip(start) {
            border.push(p);
            if self.is_simply_connected(border) {
                let found = border.clone();
                border.pop();
                return Some(found);
            }
            let candidate = if depth + 1 < MAX_INSIDE_CONNECTIONS {
                self.inside_connected_border(shape, border, candidates, i + 1, depth + 1)
            } else {
                None
            };
            border.pop();
            if let Some(c) = candidate {
                if self.is_two_eyed(shape, Some(&c)) {
                    return Some(c);
                }
                if best.as_ref().is_none_or(|b| c.len() < b.len()) {
                    best = Some(c);
                }
            }
        }
        best
    }

    /// Connection points of the bounding groups that lie inside the shape.
    fn inside_connection_points(&self, shape: &Shape, adjacent: &[GroupId]) -> Vec<Point> {
        let mut points = Vec::new();
        for &adj in adjacent.iter().rev() {
            for conn in self.connections(adj).into_iter().rev() {
                if shape.contains(conn.from) && !points.contains(&conn.from) {
                    points.push(conn.from);
                }
            }
        }
        points
    }

    /// Removing `border` leaves the shape in more than one piece.
    pub fn is_two_eyed(&self, shape: &Shape, border: Option<&[Point]>) -> bool {
        let outside = |p: &Point| border.is_none_or(|b| !b.contains(p));
        let rest: Vec<Point> = shape.cells.iter().copied().filter(outside).collect();
        match rest.last() {
            Some(&seed) => self.connected_size(seed, shape, border) < rest.len(),
            None => false,
        }
    }

    /// The bounding stones already form one chain once outside connections
    /// are filled.
    fn is_connected_shape(&self, shape: &Shape) -> bool {
        let adjacent = self.shape_adjacent_groups(shape);
        adjacent.len() <= 1
            || self.is_simply_connected(&self.outside_connected_border(shape, &adjacent))
    }

    // =========================================================================
    // Eye estimates
    // =========================================================================

    /// Whether a play inside leaves at most one eye: up to three points, a
    /// point touching all others, the square four, the bulky five and the
    /// rabbity six.
    pub fn is_nakade(&self, cells: &[Point]) -> bool {
        let n = cells.len();
        if n <= 3 {
            return true;
        }
        let inside = |p: Point| cells.contains(&p);
        let degree = |p: Point| self.board.neighbors(p).filter(|&q| inside(q)).count();
        if cells.iter().any(|&p| degree(p) == n - 1) {
            return true;
        }
        let size = self.board.size();
        let has_square = cells.iter().any(|&p| {
            let (x, y) = self.board.xy(p);
            x + 1 < size
                && y + 1 < size
                && inside(self.board.point(x + 1, y))
                && inside(self.board.point(x, y + 1))
                && inside(self.board.point(x + 1, y + 1))
        });
        match n {
            4 | 5 => has_square,
            6 => cells.iter().any(|&center| {
                if degree(center) != 4 {
                    return false;
                }
                let arms: Vec<Point> = self.board.neighbors(center).collect();
                cells
                    .iter()
                    .find(|&&p| p != center && !arms.contains(&p))
                    .is_some_and(|&extra| {
                        self.board.neighbors(extra).filter(|q| arms.contains(q)).count() == 2
                    })
            }),
            _ => false,
        }
    }

    /// Whether the enclosed stones of a killable shape are dead or in seki.
    /// Shapes that cannot be killed are `Alive`.
    pub fn shape_fate(&self, shape: &Shape) -> Fate {
        if !self.is_nakade(&shape.cells) {
            return Fate::Alive;
        }
        let empties: Vec<Point> = shape
            .cells
            .iter()
            .copied()
            .filter(|&p| self.board.get(p).is_none())
            .collect();
        let introns = self.shape_embedded(shape);
        let intron_stones: usize = introns.iter().map(|&g| self.size(g)).sum();
        // Two shared liberties that neither side can fill.
        let locked = empties.len() == 2
            && intron_stones >= 2
            && introns.iter().all(|&g| {
                let libs = self.liberties(g);
                libs.len() == 2 && libs.iter().all(|l| empties.contains(l))
            });
        if locked { Fate::Seki } else { Fate::Dead }
    }

    /// Eyes in a connected space, and whether it holds a seki.
    pub fn count_connected_eyes(&mut self, shape: &Shape) -> (usize, bool) {
        match shape.len() {
            0 => (0, false),
            1 | 2 => (1, false),
            n if n <= SHAPE_EYE_LIMIT => match self.shape_fate(shape) {
                Fate::Alive => (2, false),
                Fate::Seki => (1, true),
                Fate::Dead => (1, false),
            },
            _ => (self.h_count_eyes(shape), false),
        }
    }

    /// Eyes in a small space once the inside points that join its bounding
    /// groups are filled.
    pub fn count_unconnected_eyes(&mut self, shape: &Shape) -> (usize, bool) {
        if shape.len() > 1 && shape.len() < UNCONNECTED_EYE_LIMIT {
            let adjacent = self.shape_adjacent_groups(shape);
            let mut border = self.outside_connected_border(shape, &adjacent);
            let candidates = self.inside_connection_points(shape, &adjacent);
            if let Some(connected) =
                self.inside_connected_border(shape, &mut border, &candidates, 0, 0)
            {
                let smaller = shape.without(&connected);
                if self.is_two_eyed(&smaller, None) {
                    return (2, false);
                }
                return self.count_connected_eyes(&smaller);
            }
        }
        (self.h_count_eyes(shape), false)
    }

    /// Eyes judged from the share of the space taken by enemy stones and the
    /// territories those stones have of their own.
    pub fn h_count_eyes(&mut self, shape: &Shape) -> usize {
        let total = shape.len();
        let mut embedded_eyes = 0;
        let mut stones = 0;
        let mut inner_territory = 0;
        let mut bridged = false;
        let mut seen: Vec<GroupId> = Vec::new();
        for egroup in self.shape_embedded(shape).into_iter().rev() {
            let ek = self.kind(egroup);
            let counted = matches!(
                ek,
                Kind::Black
                    | Kind::White
                    | Kind::DeadBlack
                    | Kind::DeadWhite
                    | Kind::SafeBlack
                    | Kind::SafeWhite
                    | Kind::SekiBlack
                    | Kind::SekiWhite
            );
            if !counted {
                continue;
            }
            let size = self.size(egroup);
            if self.count_available_liberties(egroup) < 2 {
                if size > 1 {
                    embedded_eyes += if size > 4 { 2 } else { 1 };
                } else if !self.is_false_eye_capture(self.top(egroup)) {
                    embedded_eyes += 1;
                }
            }
            stones += size;
            for territory in self.territories(egroup).into_iter().rev() {
                if seen.contains(&territory) {
                    continue;
                }
                seen.push(territory);
                if self.border(territory).iter().all(|&p| shape.contains(p)) {
                    inner_territory += self.size(territory);
                } else if self.all_dead(territory) {
                    // Reaches outside through dead stones: no eyes from here.
                    bridged = true;
                }
            }
        }

        let total_f = total as f64;
        match total {
            0 => 0,
            1 => 1,
            _ if stones + 1 == total => {
                if stones > 4 { 2 } else { 1 }
            }
            _ if bridged => 0,
            _ if (inner_territory as f64) < total_f * TWO_EYE_INTRON_FRACTION => {
                let mut eyes = embedded_eyes;
                if (stones as f64) < total_f * ONE_EYE_INTRON_FRACTION {
                    eyes += 1;
                }
                if (stones as f64) < total_f * TWO_EYE_INTRON_FRACTION {
                    eyes += 1;
                }
                eyes
            }
            _ => 0,
        }
    }

    /// Every stone group embedded in the territory is dead or removed.
    fn all_dead(&self, territory: GroupId) -> bool {
        self.embedded_colored(territory)
            .into_iter()
            .all(|g| self.kind(g).is_dead())
    }

    // =========================================================================
    // Group safety
    // =========================================================================

    /// Eyes of `g` and of the groups it reaches through connections and
    /// captures, each group counted once per token. The flag reports a seki
    /// found in `g`'s own territories.
    pub fn count_eyes(&mut self, g: GroupId, token: u32) -> (usize, bool) {
        if !self.marks.visit_group(g.index(), token) {
            return (0, false);
        }
        let mut eyes = 0;
        let mut seki = false;
        for ter in self.territories(g).into_iter().rev() {
            if !self.marks.visit_group(ter.index(), token) {
                continue;
            }
            match self.kind(ter) {
                // Captures are not eyes when they are false.
                Kind::RemovedBlack | Kind::RemovedWhite => {
                    let shape = self.shape_of(ter);
                    eyes += self.count_unconnected_eyes(&shape).0;
                }
                Kind::BlackAndEmpty | Kind::WhiteAndEmpty => {
                    let shape = self.shape_of(ter);
                    let connected = self.is_connected_shape(&shape);
                    let (found, shape_seki) = if connected {
                        self.count_connected_eyes(&shape)
                    } else {
                        self.count_unconnected_eyes(&shape)
                    };
                    eyes += found;
                    if shape_seki {
                        self.part.group_mut(ter).seki = true;
                    }
                    seki |= self.part.group(ter).seki;
                    if connected && eyes >= 2 && shape.len() <= SETTLED_EYE_SPACE {
                        self.kill_embedded_groups(ter);
                    }
                }
                _ => {}
            }
        }

        if eyes < 2 {
            for conn in self.connections(g).into_iter().rev() {
                eyes += self.count_eyes(conn.to, token).0;
            }
        }
        if eyes < 2 {
            for adj in self.adjacent_groups(g).into_iter().rev() {
                if matches!(self.kind(adj), Kind::RemovedBlack | Kind::RemovedWhite) {
                    // Capturing joins us to everything around the captives.
                    for other in self.adjacent_groups(adj).into_iter().rev() {
                        eyes += self.count_eyes(other, token).0;
                    }
                }
            }
            if eyes < 2 && self.count_local_safe_liberties(g) > 2 {
                eyes += 1;
            }
        }
        (eyes, seki)
    }

    /// Safe kind for a group with two eyes, seki kind for a group in a seki or
    /// a race its neighbour cannot win either, otherwise `None`.
    pub fn classify_safety(&mut self, g: GroupId) -> Option<Kind> {
        let kind = self.kind(g);
        let token = self.marks.fresh();
        let (eyes, seki) = self.count_eyes(g, token);
        if seki && eyes < 2 {
            return Some(kind.seki_kind());
        }
        if eyes < 2 {
            for adj in self.adjacent_groups(g).into_iter().rev() {
                if self.kind(adj).is_dead() {
                    continue;
                }
                let token = self.marks.fresh();
                let (adj_eyes, adj_seki) = self.count_eyes(adj, token);
                if adj_seki || adj_eyes == eyes {
                    return Some(kind.seki_kind());
                }
            }
        }
        (eyes >= 2).then(|| kind.safe_kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn board(text: &str) -> Board {
        text.parse().expect("valid diagram")
    }

    fn cells(b: &Board, xy: &[(usize, usize)]) -> Vec<Point> {
        xy.iter().map(|&(x, y)| b.point(x, y)).collect()
    }

    fn prepared(b: &Board) -> Analysis<'_> {
        let mut a = Analysis::new(b, false);
        a.classify_empty_groups();
        a.mark_as_territory();
        a.add_territories();
        a
    }

    #[test]
    fn test_nakade_shapes() {
        let b = Board::new(7);
        let a = Analysis::new(&b, false);
        let straight_three = cells(&b, &[(1, 1), (2, 1), (3, 1)]);
        let square = cells(&b, &[(1, 1), (2, 1), (1, 2), (2, 2)]);
        let pyramid = cells(&b, &[(1, 1), (2, 1), (3, 1), (2, 2)]);
        let bulky = cells(&b, &[(1, 1), (2, 1), (1, 2), (2, 2), (3, 1)]);
        let crossed = cells(&b, &[(2, 1), (1, 2), (2, 2), (3, 2), (2, 3)]);
        let rabbity = cells(&b, &[(2, 1), (1, 2), (2, 2), (3, 2), (2, 3), (3, 3)]);
        for shape in [&straight_three, &square, &pyramid, &bulky, &crossed, &rabbity] {
            assert!(a.is_nakade(shape), "{shape:?} should be killable");
        }

        let straight_four = cells(&b, &[(1, 1), (2, 1), (3, 1), (4, 1)]);
        let rectangle = cells(&b, &[(1, 1), (2, 1), (3, 1), (1, 2), (2, 2), (3, 2)]);
        let bent_six = cells(&b, &[(1, 1), (2, 1), (3, 1), (4, 1), (4, 2), (5, 2)]);
        for shape in [&straight_four, &rectangle, &bent_six] {
            assert!(!a.is_nakade(shape), "{shape:?} should live");
        }
    }

    #[test]
    fn test_two_eyed_split() {
        let b = Board::new(5);
        let a = Analysis::new(&b, false);
        let line = Shape::new(Kind::WhiteAndEmpty, cells(&b, &[(0, 0), (1, 0), (2, 0)]), b.area());
        assert!(!a.is_two_eyed(&line, None));
        assert!(a.is_two_eyed(&line, Some(&[b.point(1, 0)])));
        assert!(!a.is_two_eyed(&line, Some(&[b.point(0, 0)])));
    }

    #[test]
    fn test_connected_eyes_by_size() {
        let b = Board::new(5);
        let mut a = Analysis::new(&b, false);
        let one = Shape::new(Kind::WhiteAndEmpty, vec![0], b.area());
        assert_eq!(a.count_connected_eyes(&one), (1, false));
        let square = Shape::new(
            Kind::WhiteAndEmpty,
            cells(&b, &[(0, 0), (1, 0), (0, 1), (1, 1)]),
            b.area(),
        );
        assert_eq!(a.count_connected_eyes(&square), (1, false));
        let row = Shape::new(
            Kind::WhiteAndEmpty,
            cells(&b, &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]),
            b.area(),
        );
        assert_eq!(a.count_connected_eyes(&row), (2, false));
    }

    #[test]
    fn test_heuristic_eyes_for_open_area() {
        let b = Board::new(5);
        let mut a = Analysis::new(&b, false);
        let all = Shape::new(Kind::WhiteAndEmpty, b.points().collect(), b.area());
        assert_eq!(a.h_count_eyes(&all), 2);
    }

    #[test]
    fn test_two_small_eyes_are_safe() {
        let b = board(
            ". X . X .
             X X X X X
             . . . . .
             . . . . .
             . . . . .",
        );
        let mut a = prepared(&b);
        let wall = a.group_of(1);
        assert_eq!(a.territories(wall).len(), 4);
        assert_eq!(a.classify_safety(wall), Some(Kind::SafeBlack));
    }

    #[test]
    fn test_one_eye_is_not_safe() {
        let b = board(
            ". X O . .
             X X O . .
             O O O . .
             . . . . .
             . . . . .",
        );
        let mut a = prepared(&b);
        let black = a.group_of(1);
        let white = a.group_of(2);
        assert_eq!(a.classify_safety(black), None);
        assert_eq!(a.classify_safety(white), Some(Kind::SafeWhite));
    }

    #[test]
    fn test_shared_liberties_in_square_are_seki() {
        let b = board(
            ". O X . O
             O . X . O
             X X X . O
             . . . . O
             O O O O O",
        );
        let mut a = Analysis::new(&b, false);
        a.classify_empty_groups();
        let black = a.group_of(b.point(2, 0));
        let square = a.part.black_region(0).expect("corner is not black");
        assert_eq!(a.size(square), 4);
        a.part.group_mut(black).territories.push(square);

        let shape = a.shape_of(square);
        assert_eq!(a.shape_fate(&shape), Fate::Seki);
        assert_eq!(a.count_connected_eyes(&shape), (1, true));
        assert_eq!(a.classify_safety(black), Some(Kind::SekiBlack));

        a.re_classify_as_safe(black, Some(Kind::SekiBlack));
        assert_eq!(a.kind(black), Kind::SekiBlack);
        assert_eq!(a.kind_at(b.point(1, 0)), Kind::SekiWhite);
        assert_eq!(a.kind_at(b.point(0, 1)), Kind::SekiWhite);
        assert_eq!(a.kind_at(0), Kind::Dame);
        assert_eq!(a.kind_at(b.point(1, 1)), Kind::Dame);
    }

    #[test]
    fn test_single_intron_in_square_is_dead() {
        let b = board(
            ". O X . O
             . . X . O
             X X X . O
             . . . . O
             O O O O O",
        );
        let a = Analysis::new(&b, false);
        let square = a.part.black_region(0).expect("corner is not black");
        assert_eq!(a.shape_fate(&a.shape_of(square)), Fate::Dead);
    }
}
