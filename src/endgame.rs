//! Endgame forced fills.
//!
//! A finished game still has points that one side must fill before scoring:
//! the last liberty of a group short of liberties, the cut that would kill,
//! outside dame where a stone would be self-atari. These passes mark such
//! points as `Fill*` or `ReservedFor*` so the territory they break up is not
//! counted, and kill the stones those fills capture.

use crate::analysis::{Analysis, ConnectCode};
use crate::board::{Color, Point};
use crate::group::GroupId;
use crate::kind::Kind;

/// Neighbours of one color around a single empty point.
#[derive(Default)]
struct SideLiberties {
    libs: usize,
    has_one: bool,
    multiple: bool,
    groups: Vec<GroupId>,
    unshared: Option<Point>,
}

impl Analysis<'_> {
    /// Empty points, top row first.
    pub(crate) fn empty_points(&self) -> Vec<Point> {
        self.board
            .points()
            .filter(|&p| self.board.get(p).is_none())
            .collect()
    }

    // =========================================================================
    // Self atari
    // =========================================================================

    /// Guarded outside dame become fills, stones left in atari next to outside
    /// dame die, and single dame points one side cannot fill are reserved for
    /// the other.
    pub fn mark_self_atari(&mut self) {
        for p in self.empty_points().into_iter().rev() {
            if self.kind_at(p) != Kind::OutsideDame {
                continue;
            }
            if let Some(guard) = self.guarded_cell(p) {
                if let Some(color) = guard.fill_chip() {
                    let kind = if self.kill_if_multiple_capture(p, color) {
                        guard.fill_kind()
                    } else {
                        guard
                    };
                    let reason = match color {
                        Color::Black => "white would self atari",
                        Color::White => "black would self atari",
                    };
                    self.chip(p, kind, reason);
                }
            }
            for n in self.board.neighbors(p) {
                if self.board.get(n).is_none() {
                    continue;
                }
                let gr = self.group_of(n);
                let k = self.kind(gr);
                if matches!(k, Kind::Black | Kind::White) && self.count_liberties(gr) <= 1 {
                    self.set_kind(gr, k.dead_kind(), "atari at endgame");
                }
            }
        }
        for g in self.part.empty().to_vec().into_iter().rev() {
            self.mark_point_self_atari(g);
        }
    }

    fn mark_point_self_atari(&mut self, g: GroupId) {
        if self.size(g) != 1 {
            return;
        }
        let dame_like = matches!(
            self.kind(g),
            Kind::OutsideDame | Kind::Dame | Kind::BlackDame | Kind::WhiteDame | Kind::FalseEye
        );
        if !dame_like {
            return;
        }
        let p = self.top(g);
        let mut sides: [SideLiberties; 2] = Default::default();
        for n in self.board.neighbors(p) {
            let Some(color) = self.board.get(n) else {
                continue;
            };
            let gr = self.group_of(n);
            let side = &mut sides[color.index()];
            if side.groups.contains(&gr) {
                continue;
            }
            let count = self.count_liberties(gr);
            side.libs += count;
            side.has_one |= count == 1;
            side.multiple |= count >= 3;
            if let Some(&first) = side.groups.first() {
                if count <= 2 {
                    let unshared = self.unshared_liberty(first, gr);
                    match side.unshared {
                        None => side.unshared = unshared,
                        Some(_) => side.multiple |= unshared != side.unshared,
                    }
                }
            }
            side.groups.push(gr);
        }

        let [black, white] = sides;
        for (me, other, color) in [(&black, &white, Color::Black), (&white, &black, Color::White)] {
            if me.libs > 2 || other.libs <= 2 {
                continue;
            }
            let Some(&first) = me.groups.first() else {
                continue;
            };
            if !self.can_connect_or_kill(first) {
                return;
            }
            let taker = Kind::stone_kind(color.opponent());
            if me.libs == 1 {
                if !self.can_kill_two(first) {
                    self.set_kind(first, Kind::stone_kind(color).dead_kind(), "snap back");
                    self.set_kind(g, taker.snapback_kind(), "snap back");
                }
            } else if !me.has_one
                && other.groups.len() >= 2
                && (other.multiple || other.groups.len() == 2)
            {
                self.relabel(g, taker.reserved_kind(), "self atari");
            }
            return;
        }
    }

    /// Shares a liberty with a friendly group or can capture something now.
    fn can_connect_or_kill(&mut self, g: GroupId) -> bool {
        !self.connections(g).is_empty() || self.capturable_neighbors(g) > 0
    }

    fn can_kill_two(&mut self, g: GroupId) -> bool {
        self.capturable_neighbors(g) >= 2
    }

    fn capturable_neighbors(&mut self, g: GroupId) -> usize {
        let mut n = 0;
        for gr in self.adjacent_groups(g).into_iter().rev() {
            let k = self.kind(gr);
            let open = matches!(k, Kind::Black | Kind::White | Kind::DeadBlack | Kind::DeadWhite);
            if open && self.count_available_liberties(gr) <= 1 {
                n += 1;
            }
        }
        n
    }

    // =========================================================================
    // Forced atari
    // =========================================================================

    /// The point `g` must fill, or capture at, to avoid being taken once the
    /// dame are gone.
    pub fn endgame_atari(&mut self, g: GroupId) -> Option<Point> {
        let token = self.marks.fresh();
        if self.count_adjacent_safe_liberties(g, token, None, ConnectCode::Double) >= 2 {
            return None;
        }
        let kind = self.kind(g);
        let color = kind.chip()?;
        let plain = matches!(kind, Kind::Black | Kind::White);
        let mut atari = None;
        let mut outside_connection = None;
        let mut outside_fills = 0;

        for lib in self.liberties(g).into_iter().rev() {
            let k = self.kind_at(lib);
            match k {
                Kind::BlackTerritory | Kind::WhiteTerritory => {
                    if atari.is_some() {
                        return None;
                    }
                    atari = Some(lib);
                }
                Kind::BlackDame | Kind::WhiteDame | Kind::SafeBlack | Kind::SafeWhite => {
                    if plain && k.family() == Some(color) && self.friendly_neighbor(g, lib).is_some()
                    {
                        if atari.is_some() {
                            return None;
                        }
                        atari = Some(lib);
                    }
                }
                Kind::FillBlack | Kind::FillWhite | Kind::ReservedForBlack | Kind::ReservedForWhite => {
                    let token = self.marks.fresh();
                    if self.fill_safe_liberties(g, token, None, lib, ConnectCode::Double) >= 2 {
                        return None;
                    }
                }
                Kind::Dame => {
                    if self.friendly_neighbor(g, lib).is_some() {
                        if atari.is_some() {
                            return None;
                        }
                    } else {
                        outside_connection = None;
                    }
                    atari = Some(lib);
                }
                Kind::OutsideDame => {
                    outside_fills += 1;
                    if self.can_connect_and_be_safe(g, lib) {
                        if outside_connection.is_some() {
                            return None;
                        }
                        outside_connection = Some(lib);
                    }
                }
                Kind::BlackSnapbackTerritory | Kind::WhiteSnapbackTerritory => return None,
                _ => {}
            }
        }
        // Never fill a real eye.
        if atari.is_some_and(|p| self.board.is_eye(p).is_some()) {
            atari = None;
        }

        if atari.is_none() {
            for enemy in self.adjacent_groups(g).into_iter().rev() {
                match self.kind(enemy) {
                    Kind::Black | Kind::White | Kind::DeadBlack | Kind::DeadWhite => {
                        if let Some(unfilled) = self.single_unfilled_liberty(enemy, None, None) {
                            atari = Some(unfilled);
                        }
                    }
                    Kind::RemovedBlack | Kind::RemovedWhite => {
                        atari = self.single_common_border(enemy, g);
                    }
                    _ => {}
                }
            }
        }

        let mut atari = atari?;
        if let Some(cap) = self.can_capture(g, None) {
            // A lone capture that is retaken at once is no escape.
            let worth = self.is_multiple_capture(cap, color) || !self.capture_will_be_atari(cap, color);
            return worth.then_some(cap);
        }
        if !self.escapes_atari(g, atari, None) {
            if outside_fills == 0 {
                if self.board.get(atari).is_none() && self.board.is_false_eye(atari) {
                    self.chip(atari, Kind::FalseEye, "endgame atari");
                }
                return None;
            }
            if let Some(outside) = self.can_atari_outside(g) {
                atari = outside;
            }
        }
        if self.count_available_liberties(g) == 1 && self.all_dead_attackers(g) {
            return None;
        }
        Some(atari)
    }

    /// An enemy stone with two liberties that a stone of ours could put in
    /// atari from outside our own liberties.
    fn can_atari_outside(&mut self, g: GroupId) -> Option<Point> {
        let color = self.kind(g).chip()?;
        for enemy in self.adjacent_groups(g).into_iter().rev() {
            if self.size(enemy) != 1 || self.count_available_liberties(enemy) != 2 {
                continue;
            }
            for lib in self.liberties(enemy).into_iter().rev() {
                if !self.is_liberty(g, lib) && self.hypothetical_liberties(lib, color) >= 2 {
                    return Some(lib);
                }
            }
        }
        None
    }

    /// Nothing alive presses on the group.
    pub fn all_dead_attackers(&self, g: GroupId) -> bool {
        for adj in self.adjacent_groups(g).into_iter().rev() {
            match self.kind(adj) {
                Kind::DeadBlack | Kind::DeadWhite => {}
                Kind::RemovedBlack | Kind::RemovedWhite => return true,
                _ => return false,
            }
        }
        true
    }

    /// The best capture available to `g` right now: larger groups first, and
    /// captures on territory points only when nothing else is left.
    pub fn can_capture(&self, g: GroupId, cutter: Option<Point>) -> Option<Point> {
        let mut best: Option<(Point, usize, bool)> = None;
        for enemy in self.adjacent_groups(g).into_iter().rev() {
            let Some(lib) = self.single_unfilled_liberty(enemy, None, None) else {
                continue;
            };
            if cutter.is_some_and(|c| self.is_liberty(enemy, c)) {
                continue;
            }
            let k = self.kind_at(lib);
            let second_choice = k.is_safe_territory();
            let usable = second_choice
                || matches!(
                    k,
                    Kind::Dame
                        | Kind::BlackDame
                        | Kind::WhiteDame
                        | Kind::OutsideDame
                        | Kind::FalseEye
                        | Kind::ReservedForBlack
                        | Kind::ReservedForWhite
                );
            if !usable {
                continue;
            }
            let size = self.size(enemy);
            let better = best.is_none_or(|(_, best_size, best_second)| {
                size > best_size || (!second_choice && best_second)
            });
            if better {
                best = Some((lib, size, second_choice));
            }
        }
        best.map(|(lib, _, _)| lib)
    }

    /// Playing at `connector` leaves `g` with two liberties, joins a safe
    /// group, or captures.
    fn escapes_atari(&mut self, g: GroupId, connector: Point, cutter: Option<Point>) -> bool {
        let color = self.kind(g).chip();
        let token = self.marks.fresh();
        let mut libs = 0;
        for n in self.board.neighbors(connector) {
            if Some(n) == cutter {
                continue;
            }
            let gr = self.group_of(n);
            if gr == g {
                continue;
            }
            let k = self.kind(gr);
            match k {
                Kind::Dame
                | Kind::BlackTerritory
                | Kind::WhiteTerritory
                | Kind::FalseEye
                | Kind::BlackSnapbackTerritory
                | Kind::WhiteSnapbackTerritory
                | Kind::RemovedBlack
                | Kind::RemovedWhite
                | Kind::BlackDame
                | Kind::WhiteDame => {
                    libs += 1;
                    if libs >= 2 {
                        return true;
                    }
                }
                Kind::Black | Kind::White | Kind::DeadBlack | Kind::DeadWhite => {
                    if k.chip() == color {
                        libs += self.count_safe_liberties(gr, token, cutter, ConnectCode::Double);
                        if libs > 1 {
                            return true;
                        }
                    } else if self.size(gr) > 1 && self.count_available_liberties(gr) <= 1 {
                        return true;
                    }
                }
                Kind::SafeBlack | Kind::SafeWhite | Kind::SekiBlack | Kind::SekiWhite => {
                    if k.chip() == color {
                        return true;
                    }
                }
                _ => {}
            }
        }
        false
    }

    /// A friendly group next to `c` keeps a safe liberty other than `c`.
    fn can_connect_and_be_safe(&self, g: GroupId, c: Point) -> bool {
        let color = self.kind(g).chip();
        self.board.neighbors(c).any(|n| {
            let gr = self.group_of(n);
            gr != g
                && color.is_some()
                && self.kind(gr).chip() == color
                && self.has_one_safe_liberty(gr, Some(c))
        })
    }

    // =========================================================================
    // Cut and kill
    // =========================================================================

    /// A safe liberty where an enemy cut would leave `g` unable to live.
    pub fn endgame_cut(&mut self, g: GroupId) -> Option<Point> {
        if self.all_dead_attackers(g) {
            return None;
        }
        let libs = self.liberties(g);
        if libs.len() <= 1 {
            return None;
        }
        let color = self.kind(g).chip();
        for lib in libs.into_iter().rev() {
            if self.kind_at(lib).is_safe_liberty(color) && self.test_cut_and_kill(g, lib) {
                return Some(lib);
            }
        }
        None
    }

    fn test_cut_and_kill(&mut self, g: GroupId, cutter: Point) -> bool {
        let Some(color) = self.kind(g).chip() else {
            return false;
        };
        if self.hypothetical_liberties(cutter, color.opponent()) < 2 {
            return false;
        }
        let token = self.marks.fresh();
        if self.count_safe_liberties(g, token, Some(cutter), ConnectCode::Double) >= 2 {
            return false;
        }

        // Liberties left around the cut, counting what each remaining safe
        // liberty leads to.
        let token = self.marks.fresh();
        self.marks.visit(cutter, token);
        let mut libs = 0;
        for lib in self.liberties(g).into_iter().rev() {
            if lib == cutter {
                continue;
            }
            self.marks.visit(lib, token);
            if !self.kind_at(lib).is_safe_liberty(Some(color)) {
                continue;
            }
            for next in self.board.neighbors(lib) {
                if next == cutter {
                    continue;
                }
                let ngr = self.group_of(next);
                let nk = self.kind(ngr);
                match nk {
                    Kind::FillBlack | Kind::FillWhite => {
                        if nk.fill_chip() == Some(color) {
                            libs += self.killed_liberties(ngr);
                        }
                    }
                    Kind::Black
                    | Kind::White
                    | Kind::SafeBlack
                    | Kind::SafeWhite
                    | Kind::DeadBlack
                    | Kind::DeadWhite => {
                        if self.marks.visit_group(ngr.index(), token) {
                            libs += self.count_adjacent_safe_liberties(
                                ngr,
                                token,
                                Some(cutter),
                                ConnectCode::All,
                            );
                        }
                    }
                    _ => {
                        if nk.is_safe_liberty(Some(color)) {
                            libs += 1;
                        }
                    }
                }
            }
        }
        if libs > 2 {
            return false;
        }
        for conn in self.connections(g).into_iter().rev() {
            if conn.from != cutter && self.kind_at(conn.from).is_now_empty_or_connected(Some(color)) {
                libs += self.count_safe_liberties(conn.to, token, Some(cutter), ConnectCode::All);
            }
        }
        libs < 2 && self.can_capture(g, Some(cutter)).is_none()
    }

    /// Gives every undecided or safe stone group at most one forced fill: the
    /// atari phase runs to a fixed point, then the cut phase does.
    pub fn mark_endgame_atari(&mut self) {
        for g in self.part.colored().to_vec() {
            self.part.group_mut(g).atari_fill = None;
        }
        for cut_phase in [false, true] {
            loop {
                let mut changed = false;
                for g in self.part.colored().to_vec().into_iter().rev() {
                    let kind = self.kind(g);
                    let eligible = matches!(
                        kind,
                        Kind::Black | Kind::White | Kind::SafeBlack | Kind::SafeWhite
                    );
                    if !eligible || self.part.group(g).atari_fill.is_some() {
                        continue;
                    }
                    let found = if cut_phase {
                        self.endgame_cut(g)
                    } else {
                        self.endgame_atari(g)
                    };
                    let (Some(atari), Some(color)) = (found, kind.chip()) else {
                        continue;
                    };
                    // Captures first: the fill may take stones off a removed cell.
                    let kills = self.kill_if_capture(atari, color);
                    let reason = if cut_phase {
                        "avoid cut and kill"
                    } else {
                        "endgame atari fill"
                    };
                    let fill = self.chip(atari, kind.fill_kind(), reason);
                    self.part.group_mut(g).atari_fill = Some(atari);
                    self.part.group_mut(fill).killed_liberties += kills;
                    changed = true;
                }
                if !changed {
                    break;
                }
            }
        }
    }

    // =========================================================================
    // Late passes
    // =========================================================================

    /// Territory points where an enemy stone would put two of the owner's
    /// groups in atari at once must be filled by the owner.
    pub fn mark_double_atari(&mut self) {
        for p in self.empty_points().into_iter().rev() {
            if self.double_atari_at(p, Kind::BlackTerritory, Color::White) {
                self.chip(p, Kind::FillBlack, "prevent double atari");
            } else if self.double_atari_at(p, Kind::WhiteTerritory, Color::Black) {
                self.chip(p, Kind::FillWhite, "prevent double atari");
            }
        }
    }

    fn double_atari_at(&mut self, p: Point, territory: Kind, color: Color) -> bool {
        if self.kind_at(p) != territory || self.hypothetical_liberties(p, color) < 2 {
            return false;
        }
        let mut libs = 0;
        let mut danger: Vec<GroupId> = Vec::new();
        for n in self.board.neighbors(p) {
            let gr = self.group_of(n);
            match self.board.get(n) {
                None => libs += 1,
                Some(c) if c == color => libs += self.count_liberties(gr).saturating_sub(1),
                Some(_) => {
                    if danger.contains(&gr) {
                        continue;
                    }
                    let token = self.marks.fresh();
                    if self.count_adjacent_safe_liberties(gr, token, Some(p), ConnectCode::Double) < 2
                    {
                        danger.push(gr);
                    }
                }
            }
        }
        libs >= 2 && danger.len() >= 2
    }

    /// A forced fill that would leave more than one of the filler's stones
    /// in atari is a capture instead.
    pub fn mark_endgame_kills(&mut self) {
        for p in self.empty_points().into_iter().rev() {
            let g = self.group_of(p);
            let kind = self.kind(g);
            if self.size(g) != 1 || !kind.is_fill() {
                continue;
            }
            let Some(filler) = kind.fill_chip() else {
                continue;
            };
            let mut caught = Vec::new();
            let mut stones = 0;
            for adj in self.adjacent_groups(g).into_iter().rev() {
                let ak = self.kind(adj);
                let live = matches!(
                    ak,
                    Kind::Black
                        | Kind::White
                        | Kind::SafeBlack
                        | Kind::SafeWhite
                        | Kind::SekiBlack
                        | Kind::SekiWhite
                );
                if live && ak.chip() == Some(filler) && self.count_liberties(adj) == 1 {
                    caught.push(adj);
                    stones += self.size(adj);
                }
            }
            if stones > 1 {
                for &c in &caught {
                    let removed = self.kind(c).removed_kind();
                    self.set_kind(c, removed, "endgame capture");
                }
                let taker = Kind::stone_kind(filler.opponent()).dame_kind();
                self.set_kind(g, taker, "opposite fill");
            }
        }
    }

    /// Reverts fills that split the other player's territory for nothing, and
    /// reserved points split out of larger groups.
    pub fn remove_optional_fill(&mut self) {
        for p in self.empty_points().into_iter().rev() {
            let g = self.group_of(p);
            let kind = self.kind(g);
            let Some(parent) = self.part.group(g).chip.and_then(|link| link.parent) else {
                continue;
            };
            if kind.is_reserved() {
                self.revert(g);
                continue;
            }
            if !kind.is_fill() {
                continue;
            }
            let parent_kind = self.kind(parent);
            if !parent_kind.is_safe_territory() || parent_kind.fill_chip() == kind.fill_chip() {
                continue;
            }
            self.revert(g);
            for n in self.board.neighbors(p) {
                let nk = self.kind_at(n);
                let captive = matches!(nk, Kind::RemovedBlack | Kind::RemovedWhite)
                    || (nk.is_safe_territory() && self.board.get(n).is_some());
                if captive && nk.fill_chip() == parent_kind.fill_chip() {
                    let ng = self.group_of(n);
                    self.set_kind(ng, parent_kind.safe_kind(), "resurrected");
                }
            }
        }
    }
}
