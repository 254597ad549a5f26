//! Territory claims.
//!
//! Empty groups start out as one player's territory when only that player's
//! stones touch them and as dame otherwise. The passes here then decide which
//! dame can be claimed by killing the stones embedded in a region, attach
//! regions to the groups that border them, and settle small territories next to
//! groups found to be safe.

use crate::analysis::Analysis;
use crate::board::Color;
use crate::constants::{
    ATARI_INTRONS, COMPLEX_TERRITORY_GROUP, DAME_BORDER_FRACTION, LARGE_DAME, LARGE_REGION,
    LARGE_REGION_INTRONS, ONE_EYED_REGION, REGION_INTRON_DIVISOR, SAFE_INTRON_FRACTION,
    SEKI_TERRITORY_LIMIT, SETTLE_TERRITORY_LIMIT, SMALL_DAME_REGION, SMALL_EMBEDDED_GROUP,
    SMALL_OPPOSITE_REGION, SMALL_TERRITORY, TINY_TERRITORY,
};
use crate::group::GroupId;
use crate::kind::Kind;

impl Analysis<'_> {
    // =========================================================================
    // Initial classification
    // =========================================================================

    /// Territory of the only color touching the group, or dame.
    pub fn classify_empty_group(&self, g: GroupId) -> Kind {
        let mut black = false;
        let mut white = false;
        for &p in &self.part.group(g).cells {
            for n in self.board.neighbors(p) {
                match self.board.get(n) {
                    Some(Color::Black) => black = true,
                    Some(Color::White) => white = true,
                    None => {}
                }
                if black && white {
                    return Kind::Dame;
                }
            }
        }
        match (black, white) {
            (true, false) => Kind::BlackTerritory,
            (false, true) => Kind::WhiteTerritory,
            _ => Kind::Dame,
        }
    }

    /// Gives every empty group its initial kind from the stones it touches.
    pub fn classify_empty_groups(&mut self) {
        for g in self.part.empty().to_vec().into_iter().rev() {
            let kind = self.classify_empty_group(g);
            self.set_kind(g, kind, "initial");
        }
    }

    // =========================================================================
    // Reachability
    // =========================================================================

    /// A live stone group of the color opposing `for_kind` stops the search.
    fn is_boundary_territory(&self, g: GroupId, for_kind: Kind) -> bool {
        let kind = self.kind(g);
        let live = matches!(
            kind,
            Kind::Black
                | Kind::White
                | Kind::SafeBlack
                | Kind::SafeWhite
                | Kind::SekiBlack
                | Kind::SekiWhite
        );
        live && kind.chip().map(Color::opponent) == for_kind.fill_chip()
    }

    /// Searches outward from `g` for territory of kind `for_kind`, or a safe
    /// group of that color, without crossing the opposing color's live stones.
    /// Territory inside `not_inside` does not count.
    pub fn can_reach_territory(
        &mut self,
        g: GroupId,
        token: u32,
        for_kind: Kind,
        not_inside: Option<GroupId>,
    ) -> Option<GroupId> {
        if !self.marks.visit_group(g.index(), token) || self.is_boundary_territory(g, for_kind) {
            return None;
        }
        let kind = self.kind(g);
        if (kind.is_safe() || kind.is_seki()) && kind.chip() == for_kind.fill_chip() {
            return Some(g);
        }

        if kind.is_stone_status() {
            for lib in self.liberties(g).into_iter().rev() {
                let k = self.group_of(lib);
                if self.marks.group(k.index()) != token
                    && (self.kind(k) == for_kind || self.h_is_territory(k, for_kind))
                    && not_inside.is_none_or(|r| !self.part.contains(r, self.top(k)))
                {
                    return Some(k);
                }
            }
            for conn in self.connections(g).into_iter().rev() {
                if let Some(found) = self.can_reach_territory(conn.to, token, for_kind, not_inside) {
                    return Some(found);
                }
            }
        }

        for enemy in self.adjacent_groups(g).into_iter().rev() {
            if let Some(found) = self.can_reach_territory(enemy, token, for_kind, not_inside) {
                return Some(found);
            }
        }
        None
    }

    /// Searches out from `g` for a group of kind `for_kind`, or for a live group
    /// of its colour.
    pub fn reach_territory(&mut self, g: GroupId, for_kind: Kind) -> Option<GroupId> {
        let token = self.marks.fresh();
        self.can_reach_territory(g, token, for_kind, None)
    }

    /// A large dame whose border is mostly stones of `for_kind`'s color.
    fn h_is_territory(&self, g: GroupId, for_kind: Kind) -> bool {
        if self.size(g) <= LARGE_DAME || self.kind(g) != Kind::Dame {
            return false;
        }
        let border = self.border(g);
        let color = for_kind.fill_chip();
        let own = border
            .iter()
            .filter(|&&p| color.is_some() && self.board.get(p) == color)
            .count();
        (border.len() as f64 * DAME_BORDER_FRACTION) < own as f64
    }

    // =========================================================================
    // Closure heuristics
    // =========================================================================

    /// A bounding group short of liberties that the region does not enclose.
    pub fn has_insecure_boundary(&self, region: GroupId) -> Option<GroupId> {
        self.adjacent_groups(region)
            .into_iter()
            .rev()
            .find(|&gr| !self.has_two_real_liberties(gr) && !self.is_inside(gr, region))
    }

    /// Empty members of the region with no neighbour of `color`.
    fn non_adjacent_members(&self, region: GroupId, color: Color) -> usize {
        self.part
            .group(region)
            .cells
            .iter()
            .filter(|&&p| {
                self.board.get(p).is_none()
                    && !self.board.neighbors(p).any(|n| self.board.get(n) == Some(color))
            })
            .count()
    }

    /// Whether the region could be closed off as territory, judged by how many
    /// of its introns are alive and whether `empty` has room of its own.
    pub fn h_can_make_territory(&mut self, region: GroupId, empty: GroupId) -> bool {
        if self.has_insecure_boundary(region).is_some() {
            return false;
        }
        let kind = self.kind(region);
        let Some(intron) = kind.intron_color() else {
            return false;
        };
        let mut embedded = 0;
        let mut atari_size = 0;
        let mut atari_groups = 0;
        for gr in self.embedded_colored(region) {
            let size = self.size(gr);
            // Real liberties: a throw-in that will be captured back is not atari.
            if self.count_liberties(gr) == 1 {
                atari_size += size;
                atari_groups += 1;
            }
            embedded += size;
        }
        let size = self.size(region);
        let live = embedded - atari_size;
        let closable = (size >= LARGE_REGION && live <= LARGE_REGION_INTRONS)
            || atari_size > ATARI_INTRONS
            || atari_groups > 1
            || live * REGION_INTRON_DIVISOR < size;
        if !closable {
            return false;
        }
        if self.non_adjacent_members(region, intron) >= 1 {
            return true;
        }
        // No room apart from shared liberties: a potential seki unless the
        // empty group reaches territory outside.
        let token = self.marks.fresh();
        self.can_reach_territory(empty, token, kind.territory_kind(), Some(region))
            .is_some()
    }

    /// `kind` is `BlackTerritory` or `WhiteTerritory`.
    pub fn can_make_territory(&mut self, empty: GroupId, kind: Kind) -> bool {
        match self.part.region_for(self.top(empty), kind) {
            Some(region) => self.h_can_make_territory(region, empty),
            None => false,
        }
    }

    // =========================================================================
    // Killing introns
    // =========================================================================

    /// Kills the embedded groups of the `color_kind` region containing `g`.
    pub fn kill_embedded_for(&mut self, g: GroupId, color_kind: Kind) -> bool {
        match self.part.region_for(self.top(g), color_kind) {
            Some(region) => self.kill_embedded_groups(region),
            None => false,
        }
    }

    /// Claims a region: embedded stones that cannot live on their own die and
    /// the dame inside become territory. Does nothing when live introns fill
    /// half the region. Returns whether anything changed.
    pub fn kill_embedded_groups(&mut self, region: GroupId) -> bool {
        // Eye counting inside can come back to the same region.
        if self.killing.contains(&region) {
            return false;
        }
        self.killing.push(region);
        let progress = self.kill_embedded_in(region);
        self.killing.pop();
        progress
    }

    fn kill_embedded_in(&mut self, region: GroupId) -> bool {
        let colored = self.embedded_colored(region);
        let safe_size: usize = colored
            .iter()
            .filter(|&&co| self.kind(co).is_safe() || self.kind(co).is_seki())
            .map(|&co| self.size(co))
            .sum();
        if safe_size as f64 >= self.size(region) as f64 * SAFE_INTRON_FRACTION {
            return false;
        }

        let mut progress = false;
        for &co in colored.iter().rev() {
            let kind = self.kind(co);
            if !matches!(kind, Kind::Black | Kind::White) {
                continue;
            }
            if self.size(co) < SMALL_EMBEDDED_GROUP
                || self.classify_safety(co) != Some(kind.safe_kind())
            {
                self.set_kind(co, kind.dead_kind(), "endgame no safety");
                self.un_fill_dead(co);
                progress = true;
            }
        }

        let territory = self.kind(region).territory_kind();
        for em in self.embedded_empty(region).into_iter().rev() {
            let k = self.kind(em);
            if k.is_dame() || k == Kind::FalseEye {
                self.set_kind(em, territory, "safe after killing introns");
                progress = true;
            }
        }
        progress
    }

    /// Undoes fills made on behalf of a group that turned out dead, and brings
    /// back the enemy stones its fills had captured.
    pub fn un_fill_dead(&mut self, g: GroupId) {
        let kind = self.kind(g);
        let chip = kind.chip();
        for empty in self.adjacent_empty_groups(g).into_iter().rev() {
            let k = self.kind(empty);
            match k {
                Kind::BlackTerritory
                | Kind::WhiteTerritory
                | Kind::BlackSnapbackTerritory
                | Kind::WhiteSnapbackTerritory => {
                    if k.fill_chip() == chip {
                        self.set_kind(empty, k.opposite(), "safe adj to dead");
                    }
                }
                Kind::FillBlack | Kind::FillWhite if k.fill_chip() != chip => {}
                Kind::FillBlack
                | Kind::FillWhite
                | Kind::ReservedForBlack
                | Kind::ReservedForWhite
                | Kind::FalseEye => {
                    let territory = kind.territory_kind().opposite();
                    self.set_kind(empty, territory, "unnecessary fill becomes territory");
                }
                _ => {}
            }
        }
        for enemy in self.adjacent_groups(g).into_iter().rev() {
            let ek = self.kind(enemy);
            if matches!(ek, Kind::RemovedBlack | Kind::RemovedWhite) && ek.chip() != chip {
                self.set_kind(enemy, ek.safe_kind(), "undead");
            }
        }
    }

    // =========================================================================
    // Territory pass
    // =========================================================================

    /// Tiny territories that reach no friend but could be the opponent's
    /// become dame again.
    pub fn repair_initial_kinds(&mut self) {
        for g in self.part.empty().to_vec().into_iter().rev() {
            let kind = self.kind(g);
            if !kind.is_safe_territory() || self.size(g) > TINY_TERRITORY {
                continue;
            }
            if self.reach_territory(g, kind).is_none()
                && self.can_make_territory(g, kind.opposite())
            {
                self.set_kind(g, Kind::Dame, "reclassify not territory");
            }
        }
    }

    /// Decides dame groups by which colors' territory they reach, claiming
    /// regions where the closure heuristic allows. Runs to a fixed point and
    /// reports whether any region was claimed.
    pub fn mark_as_territory(&mut self) -> bool {
        self.repair_initial_kinds();
        let mut any_change = false;
        loop {
            let mut some_change = false;
            for g in self.part.empty().to_vec().into_iter().rev() {
                if !matches!(self.kind(g), Kind::Dame | Kind::BlackDame | Kind::WhiteDame) {
                    continue;
                }
                let black = self.reach_territory(g, Kind::BlackTerritory).is_some();
                let white = self.reach_territory(g, Kind::WhiteTerritory).is_some();
                let claim = match (black, white) {
                    (true, true) => {
                        self.set_kind(g, Kind::OutsideDame, "black and white");
                        None
                    }
                    (true, false) => {
                        if self.can_make_territory(g, Kind::BlackTerritory) {
                            Some(Kind::Black)
                        } else {
                            self.set_kind(g, Kind::BlackDame, "Black can fill");
                            None
                        }
                    }
                    (false, true) => {
                        if self.can_make_territory(g, Kind::WhiteTerritory) {
                            Some(Kind::White)
                        } else {
                            self.set_kind(g, Kind::WhiteDame, "White can fill");
                            None
                        }
                    }
                    // Two groups locked in a race to capture.
                    (false, false) => {
                        let can_white = self.can_make_territory(g, Kind::WhiteTerritory);
                        let can_black = self.can_make_territory(g, Kind::BlackTerritory);
                        match (can_black, can_white) {
                            (true, false) => Some(Kind::Black),
                            (false, true) => Some(Kind::White),
                            _ => None,
                        }
                    }
                };
                if let Some(color_kind) = claim {
                    if self.kill_embedded_for(g, color_kind) {
                        some_change = true;
                    }
                }
            }
            any_change |= some_change;
            if !some_change {
                return any_change;
            }
        }
    }

    // =========================================================================
    // Safety pass
    // =========================================================================

    /// Lists `region` as a territory of every stone group bordering it.
    fn attach_territory(&mut self, region: GroupId) {
        for adj in self.adjacent_groups(region).into_iter().rev() {
            let territories = &mut self.part.group_mut(adj).territories;
            if !territories.contains(&region) {
                territories.push(region);
            }
        }
    }

    /// Attaches each territory, dame region and removed group to its bordering
    /// groups so eyes can be counted.
    pub fn add_territories(&mut self) {
        for g in self.part.empty().to_vec().into_iter().rev() {
            let top = self.top(g);
            let black = self.part.black_region(top);
            let white = self.part.white_region(top);
            let (own, other) = match self.kind(g) {
                Kind::WhiteTerritory | Kind::WhiteSnapbackTerritory => (white, black),
                Kind::BlackTerritory | Kind::BlackSnapbackTerritory => (black, white),
                Kind::Dame
                | Kind::BlackDame
                | Kind::WhiteDame
                | Kind::ReservedForBlack
                | Kind::ReservedForWhite => {
                    if let (Some(white), Some(black)) = (white, black) {
                        // Guess which side the dame belongs to.
                        let (ws, bs) = (self.size(white), self.size(black));
                        if ws < bs || (ws == bs && ws <= SMALL_DAME_REGION) {
                            self.attach_territory(white);
                        } else if bs < ws || bs <= SMALL_DAME_REGION {
                            self.attach_territory(black);
                        }
                    }
                    continue;
                }
                _ => continue,
            };
            let Some(own) = own else { continue };
            self.attach_territory(own);
            // Small one-eyed shapes also count for the surrounding group.
            if self.size(own) < SMALL_TERRITORY {
                if let Some(other) = other {
                    if self.size(other) < SMALL_OPPOSITE_REGION {
                        self.attach_territory(other);
                    }
                }
            }
        }
        for g in self.part.colored().to_vec().into_iter().rev() {
            if matches!(self.kind(g), Kind::RemovedBlack | Kind::RemovedWhite) {
                self.attach_territory(g);
            }
        }
    }

    /// Drops territories holding a large embedded group that lives on its own.
    fn remove_complex_territories(&mut self, g: GroupId) {
        let territories = self.territories(g);
        let mut kept = Vec::with_capacity(territories.len());
        for &territory in &territories {
            let mut complex = false;
            for emb in self.embedded_colored(territory).into_iter().rev() {
                if self.size(emb) > COMPLEX_TERRITORY_GROUP
                    && self.classify_safety(emb).is_some_and(|k| k.is_safe() || k.is_seki())
                {
                    complex = true;
                    break;
                }
            }
            if !complex {
                kept.push(territory);
            }
        }
        self.part.group_mut(g).territories = kept;
    }

    /// A safe or seki group reachable through connections that stay open.
    fn can_reach_safe_group(&mut self, g: GroupId, token: u32) -> Option<GroupId> {
        if !self.marks.visit_group(g.index(), token) {
            return None;
        }
        let kind = self.kind(g);
        match kind {
            Kind::SafeBlack | Kind::SafeWhite | Kind::SekiBlack | Kind::SekiWhite => Some(g),
            Kind::Black | Kind::White | Kind::DeadBlack | Kind::DeadWhite => {
                for conn in self.connections(g).into_iter().rev() {
                    if self.kind_at(conn.from).is_now_empty_or_connected(kind.chip()) {
                        if let Some(safe) = self.can_reach_safe_group(conn.to, token) {
                            return Some(safe);
                        }
                    }
                }
                None
            }
            _ => None,
        }
    }

    /// Applies a safety verdict: seki neutralizes small shared territories,
    /// safety settles small territories around the group.
    pub fn re_classify_as_safe(&mut self, g: GroupId, verdict: Option<Kind>) {
        let Some(kind) = verdict else { return };
        if kind.is_seki() {
            self.set_kind(g, kind, "seki");
            self.reclassify_as_seki(g);
        } else if kind.is_safe() {
            self.set_kind(g, kind, "safe");
            let adjacent = self.adjacent_groups(g);
            self.reclassify_as_territory(g, &adjacent);
            let empties = self.adjacent_empty_groups(g);
            self.reclassify_as_territory(g, &empties);
        }
    }

    fn reclassify_as_territory(&mut self, g: GroupId, around: &[GroupId]) {
        let kind = self.kind(g);
        for &x in around.iter().rev() {
            let Some(ter) = self.part.region_for(self.top(x), kind) else {
                continue;
            };
            if self.size(ter) >= SETTLE_TERRITORY_LIMIT {
                continue;
            }
            let all_safe = self
                .adjacent_groups(ter)
                .into_iter()
                .all(|a| self.kind(a).is_safe());
            if all_safe {
                self.kill_embedded_groups(ter);
            }
        }
    }

    fn reclassify_as_seki(&mut self, g: GroupId) {
        for territory in self.territories(g).into_iter().rev() {
            if self.size(territory) >= SEKI_TERRITORY_LIMIT {
                continue;
            }
            for enemy in self.embedded_colored(territory).into_iter().rev() {
                let seki = self.kind(enemy).seki_kind();
                self.set_kind(enemy, seki, "seki in territory");
            }
            for empty in self.embedded_empty(territory).into_iter().rev() {
                self.set_kind(empty, Kind::Dame, "dame in seki");
            }
        }
    }

    /// Counts eyes for every undecided stone group and promotes those that
    /// have two, or connect to a group that does.
    pub fn mark_safe_territories(&mut self) {
        let colored = self.part.colored().to_vec();
        for &g in colored.iter().rev() {
            self.remove_complex_territories(g);
        }
        for &g in colored.iter().rev() {
            if matches!(self.kind(g), Kind::Black | Kind::White) {
                let verdict = self.classify_safety(g);
                self.re_classify_as_safe(g, verdict);
            }
        }
        for &g in colored.iter().rev() {
            if matches!(self.kind(g), Kind::Black | Kind::White) {
                let token = self.marks.fresh();
                if let Some(safe) = self.can_reach_safe_group(g, token) {
                    let kind = self.kind(safe);
                    self.set_kind(g, kind, "connect to safe");
                }
            }
        }
    }

    /// Groups still undecided inside a large opponent region die with the
    /// region's other introns.
    pub fn kill_one_eyed(&mut self) {
        for g in self.part.colored().to_vec().into_iter().rev() {
            let top = self.top(g);
            let region = match self.kind(g) {
                Kind::Black => self.part.white_region(top),
                Kind::White => self.part.black_region(top),
                _ => None,
            };
            if let Some(region) = region {
                if self.size(region) > ONE_EYED_REGION {
                    self.kill_embedded_groups(region);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn board(text: &str) -> Board {
        text.parse().expect("valid diagram")
    }

    fn setup(b: &Board) -> Analysis<'_> {
        let mut a = Analysis::new(b, false);
        a.classify_empty_groups();
        a
    }

    const CORNER_INTRON: &str = ". . X . .
                                 . O X . .
                                 . . X . .
                                 X X X . .
                                 . . . . .";

    #[test]
    fn test_classify_empty_group() {
        let b = board(
            ". X . .
             X X . O
             . . O .
             . . . .",
        );
        let a = setup(&b);
        assert_eq!(a.kind_at(0), Kind::BlackTerritory);
        assert_eq!(a.kind_at(b.point(3, 0)), Kind::Dame);
        assert_eq!(a.kind_at(b.point(3, 2)), Kind::Dame);

        let empty = Board::new(3);
        let a = setup(&empty);
        assert_eq!(a.kind_at(4), Kind::Dame);
    }

    #[test]
    fn test_reach_territory_stops_at_opponent_stones() {
        let b = board(CORNER_INTRON);
        let mut a = setup(&b);
        let corner = a.group_of(0);
        assert_eq!(a.kind(corner), Kind::Dame);
        assert!(a.reach_territory(corner, Kind::BlackTerritory).is_some());
        assert!(a.reach_territory(corner, Kind::WhiteTerritory).is_none());
    }

    #[test]
    fn test_can_make_territory_with_small_intron() {
        let b = board(CORNER_INTRON);
        let mut a = setup(&b);
        let corner = a.group_of(0);
        assert!(a.can_make_territory(corner, Kind::BlackTerritory));
    }

    #[test]
    fn test_mark_as_territory_kills_intron() {
        let b = board(CORNER_INTRON);
        let mut a = setup(&b);
        assert!(a.mark_as_territory());
        assert_eq!(a.kind_at(b.point(1, 1)), Kind::DeadWhite);
        assert_eq!(a.kind_at(0), Kind::BlackTerritory);
        assert_eq!(a.kind_at(b.point(4, 4)), Kind::BlackTerritory);
        // Nothing left to claim.
        assert!(!a.mark_as_territory());
    }

    #[test]
    fn test_insecure_boundary() {
        let b = board(
            ". X . .
             X X . .
             . . . .
             . . . .",
        );
        let a = setup(&b);
        let region = a.part.black_region(0).expect("corner is not black");
        assert!(a.has_insecure_boundary(region).is_none());

        // Both black stones are in atari and the corner does not enclose them.
        let b = board(
            ". X O .
             X O . .
             O . . .
             . . . .",
        );
        let a = setup(&b);
        let region = a.part.black_region(0).expect("corner is not black");
        assert!(a.has_insecure_boundary(region).is_some());
    }

    #[test]
    fn test_add_territories_attaches_regions() {
        let b = board(CORNER_INTRON);
        let mut a = setup(&b);
        a.mark_as_territory();
        a.add_territories();
        let wall = a.group_of(2);
        let territories = a.territories(wall);
        let corner = a.part.black_region(0).expect("corner region");
        let open = a.part.black_region(b.point(4, 4)).expect("open region");
        assert!(territories.contains(&corner));
        assert!(territories.contains(&open));
        assert_eq!(territories.len(), 2);
    }

    #[test]
    fn test_mark_safe_territories_two_regions() {
        let b = board(CORNER_INTRON);
        let mut a = setup(&b);
        a.mark_as_territory();
        a.add_territories();
        a.mark_safe_territories();
        assert_eq!(a.kind_at(2), Kind::SafeBlack);
        assert_eq!(a.kind_at(b.point(1, 1)), Kind::DeadWhite);
    }

    #[test]
    fn test_un_fill_dead_returns_fills() {
        let b = board(
            ". O X .
             O X . .
             X . . .
             . . . .",
        );
        let mut a = setup(&b);
        let corner = a.group_of(0);
        a.set_kind(corner, Kind::FillWhite, "test");
        let white = a.group_of(1);
        a.set_kind(white, Kind::DeadWhite, "test");
        a.un_fill_dead(white);
        assert_eq!(a.kind_at(0), Kind::BlackTerritory);
    }

    #[test]
    fn test_kill_one_eyed_large_region() {
        let b = board(
            ". . . . . .
             . . . . . .
             . . O . . .
             . . . . . .
             X X X X X X
             . . . . . .",
        );
        let mut a = setup(&b);
        a.kill_one_eyed();
        assert_eq!(a.kind_at(b.point(2, 2)), Kind::DeadWhite);
    }
}
