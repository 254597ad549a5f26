//! Partition of the board into groups and regions.
//!
//! A [`Partition`] owns every group built for one classification run. Colored
//! groups are maximal chains of one stone color, empty groups maximal chains
//! of empty points. Regions overlay them: a black region is a maximal area of
//! points that are not Black (so it may become Black territory), and likewise
//! for White. Regions live in the same arena but are never cells' own groups.
//!
//! Groups refer to each other by [`GroupId`], an index into the arena.

use crate::board::{Board, Color, Point};
use crate::kind::Kind;
use crate::sweep::Marks;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub(crate) usize);

impl GroupId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Where a chipped group came from and what it was before.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChipLink {
    /// Group the cell was split out of. `None` when a singleton was relabelled.
    pub parent: Option<GroupId>,
    pub kind: Kind,
    /// The singleton was taken off the empty-group list when relabelled.
    pub delisted: bool,
}

#[derive(Clone, Debug)]
pub struct Group {
    pub kind: Kind,
    pub cells: Vec<Point>,
    /// Why the group has its current kind.
    pub reason: &'static str,
    pub chip: Option<ChipLink>,
    /// Liberties this group gains from captures decided during the run.
    pub killed_liberties: usize,
    /// Point filled by the endgame atari pass, at most one per pass.
    pub atari_fill: Option<Point>,
    /// Territories (regions or removed groups) this group borders.
    pub territories: Vec<GroupId>,
    /// A region's eye count found a seki.
    pub seki: bool,
}

impl Group {
    fn new(kind: Kind, cells: Vec<Point>, reason: &'static str) -> Self {
        Self {
            kind,
            cells,
            reason,
            chip: None,
            killed_liberties: 0,
            atari_fill: None,
            territories: Vec::new(),
            seki: false,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Representative cell.
    pub fn top(&self) -> Point {
        self.cells[0]
    }

    /// Group this chip was split from, if it is a chip with a parent.
    pub fn parent(&self) -> Option<GroupId> {
        self.chip.and_then(|link| link.parent)
    }
}

#[derive(Clone, Debug)]
pub struct Partition {
    groups: Vec<Group>,
    cell_group: Vec<GroupId>,
    black_region: Vec<Option<GroupId>>,
    white_region: Vec<Option<GroupId>>,
    colored: Vec<GroupId>,
    empty: Vec<GroupId>,
}

impl Partition {
    /// Splits `board` into colored and empty groups, then builds regions.
    pub fn build(board: &Board, marks: &mut Marks) -> Self {
        let area = board.area();
        let mut part = Self {
            groups: Vec::new(),
            cell_group: vec![GroupId(usize::MAX); area],
            black_region: vec![None; area],
            white_region: vec![None; area],
            colored: Vec::new(),
            empty: Vec::new(),
        };

        for p in board.points() {
            if part.cell_group[p].0 != usize::MAX {
                continue;
            }
            let cells = board.flood(p, marks);
            let kind = match board.get(p) {
                Some(c) => Kind::stone_kind(c),
                None => Kind::Empty,
            };
            let id = part.push(Group::new(kind, cells, "initial"));
            for &c in &part.groups[id.0].cells {
                part.cell_group[c] = id;
            }
            if kind == Kind::Empty {
                part.empty.push(id);
            } else {
                part.colored.push(id);
            }
        }
        let groups = &part.groups;
        part.colored.sort_by_key(|g| groups[g.0].len());

        for p in board.points() {
            if board.get(p) != Some(Color::Black) && part.black_region[p].is_none() {
                let cells = board.flood_by(p, marks, |c| c != Some(Color::Black));
                let id = part.push(Group::new(Kind::WhiteAndEmpty, cells, "region"));
                for &c in &part.groups[id.0].cells {
                    part.black_region[c] = Some(id);
                }
            }
            if board.get(p) != Some(Color::White) && part.white_region[p].is_none() {
                let cells = board.flood_by(p, marks, |c| c != Some(Color::White));
                let id = part.push(Group::new(Kind::BlackAndEmpty, cells, "region"));
                for &c in &part.groups[id.0].cells {
                    part.white_region[c] = Some(id);
                }
            }
        }
        part
    }

    fn push(&mut self, group: Group) -> GroupId {
        let id = GroupId(self.groups.len());
        self.groups.push(group);
        id
    }

    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id.0]
    }

    pub fn group_mut(&mut self, id: GroupId) -> &mut Group {
        &mut self.groups[id.0]
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Every group id, regions and chips included.
    pub fn ids(&self) -> impl Iterator<Item = GroupId> + use<> {
        (0..self.groups.len()).map(GroupId)
    }

    /// The group a cell belongs to (never a region).
    pub fn group_of(&self, p: Point) -> GroupId {
        self.cell_group[p]
    }

    /// Kind of the group holding `p`.
    pub fn kind_of(&self, p: Point) -> Kind {
        self.groups[self.cell_group[p].0].kind
    }

    /// Potential Black territory containing `p`, if `p` is not Black.
    pub fn black_region(&self, p: Point) -> Option<GroupId> {
        self.black_region[p]
    }

    /// Potential White territory containing `p`, if `p` is not White.
    pub fn white_region(&self, p: Point) -> Option<GroupId> {
        self.white_region[p]
    }

    /// Region of the territory `kind` containing `p`.
    pub fn region_for(&self, p: Point, kind: Kind) -> Option<GroupId> {
        match kind.family() {
            Some(Color::Black) => self.black_region[p],
            Some(Color::White) => self.white_region[p],
            None => None,
        }
    }

    /// `p` is in `id`, which may be a region.
    pub fn contains(&self, id: GroupId, p: Point) -> bool {
        match self.groups[id.0].kind {
            Kind::WhiteAndEmpty => self.black_region[p] == Some(id),
            Kind::BlackAndEmpty => self.white_region[p] == Some(id),
            _ => self.cell_group[p] == id,
        }
    }

    /// Colored groups, smallest first.
    pub fn colored(&self) -> &[GroupId] {
        &self.colored
    }

    /// Empty groups, in discovery order, without delisted singletons.
    pub fn empty(&self) -> &[GroupId] {
        &self.empty
    }

    /// Every region, black regions and white regions interleaved in the order found.
    pub fn regions(&self) -> Vec<GroupId> {
        self.ids().filter(|&g| self.groups[g.0].kind.is_region()).collect()
    }

    /// Splits `p` out of its group with a new kind. A singleton is relabelled in
    /// place and leaves the empty-group list.
    pub fn chip(&mut self, p: Point, kind: Kind, reason: &'static str) -> GroupId {
        let id = self.cell_group[p];
        if self.groups[id.0].len() == 1 {
            let delisted = match self.empty.iter().position(|&g| g == id) {
                Some(i) => {
                    self.empty.remove(i);
                    true
                }
                None => self.groups[id.0].chip.is_some_and(|link| link.delisted),
            };
            self.relink(id, kind, reason, delisted);
            return id;
        }

        let prior = self.groups[id.0].kind;
        self.groups[id.0].cells.retain(|&c| c != p);
        let mut group = Group::new(kind, vec![p], reason);
        group.chip = Some(ChipLink {
            parent: Some(id),
            kind: prior,
            delisted: false,
        });
        let new = self.push(group);
        self.cell_group[p] = new;
        new
    }

    /// Changes a group's kind without recording anything to revert to.
    pub fn set_kind(&mut self, id: GroupId, kind: Kind, reason: &'static str) {
        let group = &mut self.groups[id.0];
        group.kind = kind;
        group.reason = reason;
    }

    /// Relabels a whole group, remembering its previous kind for [`revert`].
    ///
    /// [`revert`]: Partition::revert
    pub fn relabel(&mut self, id: GroupId, kind: Kind, reason: &'static str) {
        let delisted = self.groups[id.0].chip.is_some_and(|link| link.delisted);
        self.relink(id, kind, reason, delisted);
    }

    fn relink(&mut self, id: GroupId, kind: Kind, reason: &'static str, delisted: bool) {
        let group = &mut self.groups[id.0];
        group.chip = Some(ChipLink {
            parent: group.parent(),
            kind: group.kind,
            delisted,
        });
        group.kind = kind;
        group.reason = reason;
    }

    /// Undoes a chip: merges the cell back into its parent, or restores the
    /// saved kind of a relabelled group.
    pub fn revert(&mut self, id: GroupId) {
        let Some(link) = self.groups[id.0].chip.take() else {
            return;
        };
        match link.parent {
            Some(parent) => {
                let cells = std::mem::take(&mut self.groups[id.0].cells);
                for &c in &cells {
                    self.cell_group[c] = parent;
                }
                self.groups[parent.0].cells.extend(cells);
                self.groups[id.0].kind = self.groups[parent.0].kind;
                self.groups[id.0].reason = "merged back";
            }
            None => {
                let group = &mut self.groups[id.0];
                group.kind = link.kind;
                group.reason = "unchipped";
                if link.delisted {
                    self.empty.push(id);
                }
            }
        }
    }

    /// Every cell is in exactly one non-region group, and that group lists it.
    pub fn covers_each_cell_once(&self) -> bool {
        let mut seen = vec![0usize; self.cell_group.len()];
        for g in &self.groups {
            if g.kind.is_region() {
                continue;
            }
            for &c in &g.cells {
                seen[c] += 1;
            }
        }
        seen.iter().all(|&n| n == 1)
            && self
                .cell_group
                .iter()
                .enumerate()
                .all(|(p, g)| self.groups[g.0].cells.contains(&p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(text: &str) -> (Board, Partition) {
        let board: Board = text.parse().unwrap();
        let mut marks = Marks::new(board.area());
        let part = Partition::build(&board, &mut marks);
        (board, part)
    }

    #[test]
    fn test_build_groups() {
        let (board, part) = setup(
            ". X .
             X X O
             . O .",
        );
        assert!(part.covers_each_cell_once());
        assert_eq!(part.colored().len(), 3);
        assert_eq!(part.empty().len(), 4);

        let black = part.group_of(board.point(1, 1));
        assert_eq!(part.group(black).kind, Kind::Black);
        assert_eq!(part.group(black).len(), 3);
        // Smallest first.
        let sizes: Vec<usize> = part.colored().iter().map(|&g| part.group(g).len()).collect();
        assert_eq!(sizes, vec![1, 1, 3]);
    }

    #[test]
    fn test_regions() {
        let (board, part) = setup(
            ". X .
             X X O
             . O .",
        );
        let corner = board.point(0, 0);
        let far = board.point(2, 2);
        let r = part.black_region(corner).unwrap();
        assert_eq!(part.group(r).kind, Kind::WhiteAndEmpty);
        assert_eq!(part.group(r).len(), 1);
        // Everything right of and below the black stones.
        let big = part.black_region(far).unwrap();
        assert_eq!(part.group(big).len(), 5);
        assert!(part.contains(big, board.point(2, 1)));
        assert!(!part.contains(big, corner));
        assert_eq!(part.black_region(board.point(1, 1)), None);
        assert!(part.white_region(board.point(1, 1)).is_some());
    }

    #[test]
    fn test_chip_and_revert() {
        let (board, mut part) = setup(
            ". . .
             . X .
             . . .",
        );
        let empty = part.group_of(0);
        assert_eq!(part.group(empty).len(), 8);

        let chip = part.chip(0, Kind::FillBlack, "test");
        assert_ne!(chip, empty);
        assert_eq!(part.kind_of(0), Kind::FillBlack);
        assert_eq!(part.group(empty).len(), 7);
        assert!(part.covers_each_cell_once());

        part.revert(chip);
        assert_eq!(part.group_of(0), empty);
        assert_eq!(part.group(empty).len(), 8);
        assert!(part.covers_each_cell_once());
        assert_eq!(part.kind_of(board.point(1, 1)), Kind::Black);
    }

    #[test]
    fn test_chip_singleton_relabels() {
        let (board, mut part) = setup(
            ". X .
             X X X
             . . .",
        );
        let corner = part.group_of(0);
        assert!(part.empty().contains(&corner));

        let chip = part.chip(0, Kind::ReservedForBlack, "test");
        assert_eq!(chip, corner);
        assert!(!part.empty().contains(&corner));
        assert_eq!(part.kind_of(0), Kind::ReservedForBlack);

        part.revert(chip);
        assert_eq!(part.kind_of(0), Kind::Empty);
        assert!(part.empty().contains(&corner));
        assert_eq!(part.kind_of(board.point(2, 0)), Kind::Empty);
    }
}
