//! Group graph queries for one classification run.
//!
//! An [`Analysis`] pairs a read-only board with the partition and sweep marks
//! of a single run. The queries here answer questions about the group graph as
//! the run currently sees it: liberties, borders, connections between groups
//! of one color through a shared liberty, and how many safe liberties a group
//! can count on once the forced fills around it are played.
//!
//! Nothing is cached. Chips split groups while the run progresses, so every
//! query walks the current cells. A chipped group answers liberty and
//! connection questions for the group it was split from.

use crate::board::{Board, Color, Point};
use crate::group::{GroupId, Partition};
use crate::kind::Kind;
use crate::sweep::Marks;

/// A liberty `from` shared with another group `to` of the same color.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Connection {
    pub from: Point,
    pub to: GroupId,
}

/// How outside dame are treated when counting safe liberties.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConnectCode {
    /// Outside dame never connect.
    None,
    /// Connect to groups already reached through another outside dame; when
    /// several unreached groups compete, count the least promising one.
    Double,
    /// Every outside dame connects.
    All,
}

pub struct Analysis<'a> {
    pub board: &'a Board,
    pub part: Partition,
    pub marks: Marks,
    pub trace: bool,
    /// Regions whose embedded groups are being killed, innermost last.
    pub(crate) killing: Vec<GroupId>,
    changes: usize,
}

impl<'a> Analysis<'a> {
    /// Builds the group partition of `board`. Every group starts unclassified.
    pub fn new(board: &'a Board, trace: bool) -> Self {
        let mut marks = Marks::new(board.area());
        let part = Partition::build(board, &mut marks);
        Self {
            board,
            part,
            marks,
            trace,
            killing: Vec::new(),
            changes: 0,
        }
    }

    /// Status changes since the last call.
    pub fn take_changes(&mut self) -> usize {
        std::mem::take(&mut self.changes)
    }

    /// Current status of group `g`.
    pub fn kind(&self, g: GroupId) -> Kind {
        self.part.group(g).kind
    }

    /// Current status of the group holding `p`.
    pub fn kind_at(&self, p: Point) -> Kind {
        self.part.kind_of(p)
    }

    /// Group holding `p`, chips included.
    pub fn group_of(&self, p: Point) -> GroupId {
        self.part.group_of(p)
    }

    /// Number of points in `g`.
    pub fn size(&self, g: GroupId) -> usize {
        self.part.group(g).len()
    }

    /// First point of `g` in row-major order; names the group in traces.
    pub fn top(&self, g: GroupId) -> Point {
        self.part.group(g).top()
    }

    /// Points of `g`, seed first.
    pub fn cells(&self, g: GroupId) -> Vec<Point> {
        self.part.group(g).cells.clone()
    }

    /// Liberties `g` gains from neighbours already marked captured.
    pub fn killed_liberties(&self, g: GroupId) -> usize {
        self.part.group(g).killed_liberties
    }

    /// Territories attached to `g` by the safety pass.
    pub fn territories(&self, g: GroupId) -> Vec<GroupId> {
        self.part.group(g).territories.clone()
    }

    // =========================================================================
    // Status changes
    // =========================================================================

    /// Changes the status of `g` for good, counting and tracing the change.
    pub fn set_kind(&mut self, g: GroupId, kind: Kind, reason: &'static str) {
        let old = self.kind(g);
        if old != kind {
            self.changes += 1;
            trace!(
                self,
                "  {} {} -> {} ({reason})",
                self.board.coord(self.top(g)),
                old,
                kind
            );
        }
        self.part.set_kind(g, kind, reason);
    }

    /// Like [`set_kind`](Self::set_kind), but the old kind can be restored.
    pub fn relabel(&mut self, g: GroupId, kind: Kind, reason: &'static str) {
        if self.kind(g) != kind {
            self.changes += 1;
            trace!(
                self,
                "  {} {} -> {} ({reason}, revertible)",
                self.board.coord(self.top(g)),
                self.kind(g),
                kind
            );
        }
        self.part.relabel(g, kind, reason);
    }

    /// Splits `p` out of its group as a one-point group of `kind`.
    pub fn chip(&mut self, p: Point, kind: Kind, reason: &'static str) -> GroupId {
        self.changes += 1;
        trace!(
            self,
            "  {} chipped from {} as {} ({reason})",
            self.board.coord(p),
            self.kind_at(p),
            kind
        );
        self.part.chip(p, kind, reason)
    }

    /// Undoes a chip or relabel of `g`.
    pub fn revert(&mut self, g: GroupId) {
        self.changes += 1;
        trace!(self, "  {} reverted from {}", self.board.coord(self.top(g)), self.kind(g));
        self.part.revert(g);
    }

    // =========================================================================
    // Group graph
    // =========================================================================

    /// Empty points next to the group.
    pub fn liberties(&self, g: GroupId) -> Vec<Point> {
        let group = self.part.group(g);
        if let Some(parent) = group.parent() {
            return self.liberties(parent);
        }
        let mut libs = Vec::new();
        for &p in &group.cells {
            for n in self.board.neighbors(p) {
                if self.board.get(n).is_none() && !libs.contains(&n) {
                    libs.push(n);
                }
            }
        }
        libs
    }

    pub fn is_liberty(&self, g: GroupId, p: Point) -> bool {
        self.liberties(g).contains(&p)
    }

    /// Every point next to the group, empty or not.
    pub fn border(&self, g: GroupId) -> Vec<Point> {
        let mut border = Vec::new();
        for &p in &self.part.group(g).cells {
            for n in self.board.neighbors(p) {
                if !self.part.contains(g, n) && !border.contains(&n) {
                    border.push(n);
                }
            }
        }
        border
    }

    /// Liberties shared with other groups of the same stone color.
    pub fn connections(&self, g: GroupId) -> Vec<Connection> {
        let group = self.part.group(g);
        if let Some(parent) = group.parent() {
            return self.connections(parent);
        }
        let Some(color) = group.kind.chip() else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for from in self.liberties(g) {
            for n in self.board.neighbors(from) {
                if self.board.get(n) != Some(color) {
                    continue;
                }
                let conn = Connection {
                    from,
                    to: self.group_of(n),
                };
                if conn.to != g && !out.contains(&conn) {
                    out.push(conn);
                }
            }
        }
        out
    }

    /// A group of the same color, other than `g`, next to `p`.
    pub fn friendly_neighbor(&self, g: GroupId, p: Point) -> Option<GroupId> {
        let color = self.kind(g).chip()?;
        self.board
            .neighbors(p)
            .map(|n| self.group_of(n))
            .find(|&gr| gr != g && self.kind(gr).chip() == Some(color))
    }

    /// Stone groups bordering `g`.
    pub fn adjacent_groups(&self, g: GroupId) -> Vec<GroupId> {
        self.adjacent_by(g, Kind::is_stone_status)
    }

    /// Empty groups bordering `g`, chips included.
    pub fn adjacent_empty_groups(&self, g: GroupId) -> Vec<GroupId> {
        self.adjacent_by(g, |k| !k.is_stone_status())
    }

    fn adjacent_by(&self, g: GroupId, keep: fn(Kind) -> bool) -> Vec<GroupId> {
        let mut out = match self.part.group(g).parent() {
            Some(parent) => self.adjacent_by(parent, keep),
            None => Vec::new(),
        };
        for n in self.border(g) {
            let gr = self.group_of(n);
            if gr != g && keep(self.kind(gr)) && !out.contains(&gr) {
                out.push(gr);
            }
        }
        out.retain(|&x| x != g);
        out
    }

    /// Stone groups with a stone inside the region.
    pub fn embedded_colored(&self, region: GroupId) -> Vec<GroupId> {
        self.embedded_by(region, true)
    }

    /// Empty groups with a point inside the region.
    pub fn embedded_empty(&self, region: GroupId) -> Vec<GroupId> {
        self.embedded_by(region, false)
    }

    fn embedded_by(&self, region: GroupId, stones: bool) -> Vec<GroupId> {
        let mut out = Vec::new();
        if !self.kind(region).is_region() {
            return out;
        }
        for &p in &self.part.group(region).cells {
            if self.board.get(p).is_some() == stones {
                let gr = self.group_of(p);
                if !out.contains(&gr) {
                    out.push(gr);
                }
            }
        }
        out
    }

    // =========================================================================
    // Counting
    // =========================================================================

    /// Real liberties plus those gained by captures decided so far.
    pub fn count_liberties(&self, g: GroupId) -> usize {
        self.liberties(g).len() + self.killed_liberties(g)
    }

    /// At least two empty neighbours, ignoring captures.
    pub fn has_two_real_liberties(&self, g: GroupId) -> bool {
        self.liberties(g).len() >= 2
    }

    /// Border points of `g` that belong to `other`.
    pub fn count_shared_border(&self, g: GroupId, other: GroupId) -> usize {
        self.border(g)
            .into_iter()
            .filter(|&p| self.part.contains(other, p))
            .count()
    }

    /// `g` is entirely surrounded by `other`.
    pub fn is_inside(&self, g: GroupId, other: GroupId) -> bool {
        self.count_shared_border(g, other) == self.border(g).len()
    }

    /// Credits `g` with the border it shares with a captured `victim`.
    pub fn add_killed_liberties(&mut self, g: GroupId, victim: GroupId) {
        let shared = self.count_shared_border(g, victim);
        self.part.group_mut(g).killed_liberties += shared;
    }

    /// Liberties that stay empty, following forced fills into friendly groups.
    pub fn count_available_liberties(&mut self, g: GroupId) -> usize {
        let token = self.marks.fresh();
        self.available_liberties(g, token)
    }

    fn available_liberties(&mut self, g: GroupId, token: u32) -> usize {
        let color = self.kind(g).chip();
        let mut count = 0;
        for lib in self.liberties(g) {
            if !self.marks.tag_new(lib, token) {
                continue;
            }
            let k = self.kind_at(lib);
            if k.is_now_empty() {
                count += 1;
            } else if k.is_now_connected(color) {
                for n in self.board.neighbors(lib) {
                    if color.is_some() && self.board.get(n) == color {
                        let next = self.group_of(n);
                        count += self.available_liberties(next, token);
                    }
                }
            }
        }
        count
    }

    /// Own territory liberties, without following anything.
    pub fn count_local_safe_liberties(&self, g: GroupId) -> usize {
        let territory = self.kind(g).territory_kind();
        self.liberties(g)
            .into_iter()
            .filter(|&lib| {
                let k = self.kind_at(lib);
                k.is_safe_territory() && k == territory
            })
            .count()
    }

    /// The only point of `g` bordering `other`, if exactly one does.
    pub fn single_common_border(&self, g: GroupId, other: GroupId) -> Option<Point> {
        let border = self.border(other);
        let mut some = None;
        for &p in &self.part.group(g).cells {
            if border.contains(&p) {
                if some.is_some() {
                    return None;
                }
                some = Some(p);
            }
        }
        some
    }

    /// The one liberty of `g` left unfilled at the end of the game, if there is
    /// exactly one. `atari` seeds the answer; liberties shared with `common`
    /// do not count.
    pub fn single_unfilled_liberty(
        &self,
        g: GroupId,
        atari: Option<Point>,
        common: Option<GroupId>,
    ) -> Option<Point> {
        if self.killed_liberties(g) > 0 {
            return None;
        }
        let color = self.kind(g).chip();
        let mut single = atari;
        for lib in self.liberties(g) {
            let k = self.kind_at(lib);
            if k.is_fill() {
                if k.fill_chip() == color {
                    return None;
                }
                continue;
            }
            let removed = matches!(k, Kind::RemovedBlack | Kind::RemovedWhite);
            if (k.is_stone_status() && !removed) || k.is_region() {
                continue;
            }
            if single.is_none() || single == Some(lib) {
                if common.is_none_or(|c| !self.is_liberty(c, lib)) {
                    single = Some(lib);
                }
            } else {
                return None;
            }
        }
        single
    }

    /// A liberty of `other` that is not a liberty of `g`.
    pub fn unshared_liberty(&self, g: GroupId, other: GroupId) -> Option<Point> {
        let mine = self.liberties(g);
        self.liberties(other).into_iter().find(|lib| !mine.contains(lib))
    }

    /// Some liberty other than `cut` is the group's own territory.
    pub fn has_one_safe_liberty(&self, g: GroupId, cut: Option<Point>) -> bool {
        let color = self.kind(g).chip();
        self.liberties(g).into_iter().any(|lib| {
            let k = self.kind_at(lib);
            let territory = matches!(
                k,
                Kind::BlackTerritory
                    | Kind::WhiteTerritory
                    | Kind::BlackSnapbackTerritory
                    | Kind::WhiteSnapbackTerritory
            );
            Some(lib) != cut && territory && k.fill_chip() == color
        })
    }

    // =========================================================================
    // Safe liberties
    // =========================================================================

    /// Safe liberties of `g` and of the groups it joins through forced fills
    /// and connections, ignoring `cutter`. Each group counts once per token.
    pub fn count_safe_liberties(
        &mut self,
        g: GroupId,
        token: u32,
        cutter: Option<Point>,
        connect: ConnectCode,
    ) -> usize {
        if !self.marks.visit_group(g.index(), token) {
            return 0;
        }
        let color = self.kind(g).chip();
        let mut libs = self.killed_liberties(g);
        libs += self.count_adjacent_safe_liberties(g, token, cutter, connect);
        if libs > 2 {
            return libs;
        }
        let connections = self.connections(g);

        // Already filled connections first; empty ones may cost a liberty.
        for conn in &connections {
            let from_kind = self.kind_at(conn.from);
            if Some(conn.from) != cutter
                && self.marks.group(conn.to.index()) != token
                && from_kind.is_now_connected(color)
            {
                self.marks.visit_group(conn.to.index(), token);
                libs += self.count_extra_liberties(g, token, conn.from)
                    + self.count_adjacent_safe_liberties(conn.to, token, cutter, connect);
            }
        }
        for conn in &connections {
            let from_kind = self.kind_at(conn.from);
            if Some(conn.from) != cutter
                && self.marks.group(conn.to.index()) != token
                && from_kind.is_now_empty()
            {
                self.marks.visit_group(conn.to.index(), token);
                let plus = self.count_extra_liberties(g, token, conn.from)
                    + self.count_adjacent_safe_liberties(conn.to, token, cutter, connect);
                if plus > 0 {
                    libs += plus;
                    // Filling a safe liberty to connect uses it up, once.
                    if from_kind.is_safe_liberty(color) && self.marks.tag_new(conn.from, token) {
                        libs -= 1;
                    }
                }
            }
        }
        libs
    }

    fn count_extra_liberties(&mut self, g: GroupId, token: u32, from: Point) -> usize {
        let k = self.kind_at(from);
        if !(k.is_fill() || k.is_reserved()) || k.fill_chip() != self.kind(g).chip() {
            return 0;
        }
        let mut libs = 0;
        for n in self.board.neighbors(from) {
            if self.kind_at(n).is_now_empty() && self.marks.visit(n, token) {
                libs += 1;
            }
        }
        libs
    }

    /// Safe liberties the group does not already have marked.
    pub fn count_new_safe_liberties(&self, g: GroupId, token: u32, cutter: Option<Point>) -> usize {
        let color = self.kind(g).chip();
        self.liberties(g)
            .into_iter()
            .filter(|&lib| {
                Some(lib) != cutter
                    && self.marks.cell(lib) != token
                    && self.kind_at(lib).is_safe_liberty(color)
            })
            .count()
    }

    /// Safe liberties of `g`, including those reached through its own forced
    /// fills and, depending on `connect`, through outside dame.
    pub fn count_adjacent_safe_liberties(
        &mut self,
        g: GroupId,
        token: u32,
        cutter: Option<Point>,
        connect: ConnectCode,
    ) -> usize {
        self.marks.visit_group(g.index(), token);
        let color = self.kind(g).chip();
        let mut libs = self.killed_liberties(g);
        for lib in self.liberties(g) {
            if Some(lib) == cutter || !self.marks.visit(lib, token) {
                continue;
            }
            let k = self.kind_at(lib);
            if k.is_safe_liberty(color) {
                libs += 1;
            } else if k.is_fill() || k.is_reserved() {
                libs += self.fill_safe_liberties(g, token, cutter, lib, connect);
            }
        }

        let mut candidates = 0;
        let mut candidate: Option<(GroupId, usize)> = None;
        let mut connected = None;
        for conn in self.connections(g) {
            if self.kind_at(conn.from) != Kind::OutsideDame
                || Some(conn.from) == cutter
                || self.marks.group(conn.to.index()) == token
            {
                continue;
            }
            let to_top = self.top(conn.to);
            let reached = self.marks.tag(to_top) == token;
            if connect == ConnectCode::All || (reached && connect != ConnectCode::None) {
                self.marks.visit_group(conn.to.index(), token);
                connected = Some(conn.to);
                libs += self.count_adjacent_safe_liberties(conn.to, token, cutter, connect);
            } else if connect != ConnectCode::None {
                candidates += 1;
                let safe = self.count_new_safe_liberties(conn.to, token, cutter);
                if candidate.is_none_or(|(_, best)| safe < best) {
                    candidate = Some((conn.to, safe));
                }
            }
            self.marks.set_tag(to_top, token);
        }
        if let Some((worst, _)) = candidate {
            if candidates > 1 && Some(worst) != connected {
                libs += self.count_adjacent_safe_liberties(worst, token, cutter, connect);
            }
        }
        libs
    }

    /// Safe liberties gained by playing the group's own forced fill at `fill`:
    /// the fill's safe neighbours and the friendly groups it joins.
    pub fn fill_safe_liberties(
        &mut self,
        g: GroupId,
        token: u32,
        cutter: Option<Point>,
        fill: Point,
        connect: ConnectCode,
    ) -> usize {
        let color = self.kind(g).chip();
        if self.kind_at(fill).fill_chip() != color {
            return 0;
        }
        let mut libs = 0;
        for n in self.board.neighbors(fill) {
            let next = self.group_of(n);
            if next == g {
                continue;
            }
            let k = self.kind(next);
            if k.is_safe_liberty(color) && self.marks.visit(n, token) {
                libs += 1;
            }
            let joins = matches!(
                k,
                Kind::Black
                    | Kind::White
                    | Kind::SafeBlack
                    | Kind::SafeWhite
                    | Kind::DeadBlack
                    | Kind::DeadWhite
            );
            if joins && k.chip() == color && self.marks.visit_group(next.index(), token) {
                libs += self.count_adjacent_safe_liberties(next, token, cutter, connect);
            }
        }
        libs
    }

    // =========================================================================
    // Hypothetical stones
    // =========================================================================

    /// Liberties a stone of `color` would have at empty `p`, counting captures
    /// it would make as one liberty each.
    pub fn hypothetical_liberties(&mut self, p: Point, color: Color) -> usize {
        let token = self.marks.fresh();
        self.marks.set_tag(p, token);
        let mut count = 0;
        for n in self.board.neighbors(p) {
            match self.board.get(n) {
                None => {
                    if self.kind_at(n).is_now_empty() && self.marks.tag_new(n, token) {
                        count += 1;
                    }
                }
                Some(c) if c == color => {
                    for lib in self.liberties(self.group_of(n)) {
                        if self.kind_at(lib).is_now_empty() && self.marks.tag_new(lib, token) {
                            count += 1;
                        }
                    }
                }
                Some(_) => {
                    let enemy = self.group_of(n);
                    if self.kind(enemy).is_dead() || self.liberties(enemy) == [p] {
                        count += 1;
                    }
                }
            }
        }
        count
    }

    /// Forced fill at an outside dame where a stone of one color would be
    /// self-atari while the other color keeps two liberties.
    pub fn guarded_cell(&mut self, p: Point) -> Option<Kind> {
        let black = self.hypothetical_liberties(p, Color::Black);
        let white = self.hypothetical_liberties(p, Color::White);
        let guard = if white <= 1 && black >= 2 {
            Color::Black
        } else if black <= 1 && white >= 2 {
            Color::White
        } else {
            return None;
        };
        let short = self.board.neighbors(p).any(|n| {
            self.board.get(n) == Some(guard) && self.count_liberties(self.group_of(n)) <= 2
        });
        let kind = Kind::stone_kind(guard);
        Some(if short { kind.fill_kind() } else { kind.reserved_kind() })
    }

    /// Opponent groups a stone of `color` at `p` would capture at the end of
    /// the game.
    pub fn capturable_at(&self, p: Point, color: Color) -> Vec<GroupId> {
        let mut victims = Vec::new();
        for n in self.board.neighbors(p) {
            if self.board.get(n) != Some(color.opponent()) {
                continue;
            }
            let g = self.group_of(n);
            let live = matches!(
                self.kind(g),
                Kind::Black | Kind::White | Kind::DeadBlack | Kind::DeadWhite
            );
            if live
                && !victims.contains(&g)
                && self.single_unfilled_liberty(g, None, None) == Some(p)
            {
                victims.push(g);
            }
        }
        victims
    }

    /// A stone of `color` at `p` would capture more than one stone.
    pub fn is_multiple_capture(&self, p: Point, color: Color) -> bool {
        let stones: usize = self
            .capturable_at(p, color)
            .into_iter()
            .map(|g| self.size(g))
            .sum();
        stones > 1
    }

    /// Marks what a stone of `color` at `p` captures as removed and credits the
    /// liberties to the surrounding groups. Returns how many of `p`'s
    /// neighbours were captured.
    pub fn kill_if_capture(&mut self, p: Point, color: Color) -> usize {
        let victims = self.capturable_at(p, color);
        if victims.is_empty() {
            return 0;
        }
        let removed = Kind::stone_kind(color.opponent()).removed_kind();
        for &v in &victims {
            self.set_kind(v, removed, "captured by endgame fill");
        }
        let kills = self
            .board
            .neighbors(p)
            .filter(|&n| victims.contains(&self.group_of(n)))
            .count();
        for &v in &victims {
            for adj in self.adjacent_groups(v) {
                self.add_killed_liberties(adj, v);
            }
        }
        kills
    }

    pub fn kill_if_multiple_capture(&mut self, p: Point, color: Color) -> bool {
        if !self.is_multiple_capture(p, color) {
            return false;
        }
        self.kill_if_capture(p, color);
        true
    }

    /// The capturing stone could be taken back at once.
    pub fn capture_will_be_atari(&mut self, p: Point, color: Color) -> bool {
        self.hypothetical_liberties(p, color) <= 1
    }

    /// `p` holds a stone sitting in the opponent's false eye.
    pub fn is_false_eye_capture(&self, p: Point) -> bool {
        self.board
            .get(p)
            .is_some_and(|s| self.board.is_eyeish(p) == Some(s.opponent()))
            && self.board.is_false_eye(p)
    }
}
