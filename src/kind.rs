//! Status tags for groups and cells.
//!
//! Every group carries exactly one [`Kind`]. Stone kinds describe the fate of
//! a chain, the remaining kinds describe what an empty area is worth or what
//! must happen to it before the game is scored. `BlackAndEmpty` and
//! `WhiteAndEmpty` only tag regions and never reach a finished classification.

use std::fmt;

use crate::board::Color;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Empty group not yet classified.
    Empty,
    Black,
    White,
    SafeBlack,
    SafeWhite,
    DeadBlack,
    DeadWhite,
    SekiBlack,
    SekiWhite,
    /// Captured by a forced fill; still on the board.
    RemovedBlack,
    RemovedWhite,
    BlackTerritory,
    WhiteTerritory,
    /// Point White can play into but Black retakes.
    BlackSnapbackTerritory,
    WhiteSnapbackTerritory,
    Dame,
    /// Dame only Black can usefully fill.
    BlackDame,
    WhiteDame,
    /// Dame between two safe territories; considered filled.
    OutsideDame,
    /// Black must fill here before the game ends.
    FillBlack,
    FillWhite,
    /// Black may fill here; White cannot.
    ReservedForBlack,
    ReservedForWhite,
    FalseEye,
    /// Region of cells that are Black or empty: potential White territory.
    BlackAndEmpty,
    /// Region of cells that are White or empty: potential Black territory.
    WhiteAndEmpty,
}

use Kind::*;

impl Kind {
    pub const ALL: [Kind; 26] = [
        Empty,
        Black,
        White,
        SafeBlack,
        SafeWhite,
        DeadBlack,
        DeadWhite,
        SekiBlack,
        SekiWhite,
        RemovedBlack,
        RemovedWhite,
        BlackTerritory,
        WhiteTerritory,
        BlackSnapbackTerritory,
        WhiteSnapbackTerritory,
        Dame,
        BlackDame,
        WhiteDame,
        OutsideDame,
        FillBlack,
        FillWhite,
        ReservedForBlack,
        ReservedForWhite,
        FalseEye,
        BlackAndEmpty,
        WhiteAndEmpty,
    ];

    /// Single character used in classification strings.
    pub fn code(self) -> char {
        match self {
            Empty => '?',
            Black => 'X',
            White => 'O',
            SafeBlack => 'B',
            SafeWhite => 'W',
            DeadBlack => 'x',
            DeadWhite => 'o',
            SekiBlack => 'S',
            SekiWhite => 's',
            RemovedBlack => 'R',
            RemovedWhite => 'r',
            BlackTerritory => 'b',
            WhiteTerritory => 'w',
            BlackSnapbackTerritory => 'N',
            WhiteSnapbackTerritory => 'n',
            Dame => '.',
            BlackDame => 'D',
            WhiteDame => 'd',
            OutsideDame => ',',
            FillBlack => 'F',
            FillWhite => 'f',
            ReservedForBlack => 'V',
            ReservedForWhite => 'v',
            FalseEye => 'e',
            BlackAndEmpty => '1',
            WhiteAndEmpty => '2',
        }
    }

    /// Inverse of [`Kind::code`].
    pub fn from_code(c: char) -> Option<Kind> {
        Kind::ALL.iter().copied().find(|k| k.code() == c)
    }

    /// Color of the stones a group of this kind is made of.
    pub fn chip(self) -> Option<Color> {
        match self {
            Black | SafeBlack | DeadBlack | SekiBlack | RemovedBlack => Some(Color::Black),
            White | SafeWhite | DeadWhite | SekiWhite | RemovedWhite => Some(Color::White),
            _ => None,
        }
    }

    /// Color whose stone would end up on this point, or whose point it is.
    pub fn fill_chip(self) -> Option<Color> {
        match self {
            BlackTerritory | BlackSnapbackTerritory | FillBlack | ReservedForBlack | BlackDame
            | RemovedBlack => Some(Color::Black),
            WhiteTerritory | WhiteSnapbackTerritory | FillWhite | ReservedForWhite | WhiteDame
            | RemovedWhite => Some(Color::White),
            _ => None,
        }
    }

    /// Player this kind belongs to or favours.
    pub fn family(self) -> Option<Color> {
        match self {
            BlackAndEmpty => Some(Color::White),
            WhiteAndEmpty => Some(Color::Black),
            _ => self.chip().or(self.fill_chip()),
        }
    }

    /// Color bounding a region.
    pub fn border_color(self) -> Option<Color> {
        match self {
            BlackAndEmpty => Some(Color::White),
            WhiteAndEmpty => Some(Color::Black),
            _ => None,
        }
    }

    /// Color of the stones a region may contain.
    pub fn intron_color(self) -> Option<Color> {
        self.border_color().map(Color::opponent)
    }

    pub fn is_region(self) -> bool {
        matches!(self, BlackAndEmpty | WhiteAndEmpty)
    }

    pub fn is_stone_status(self) -> bool {
        self.chip().is_some()
    }

    /// Status of an empty group, including the unclassified `Empty`.
    pub fn is_empty_status(self) -> bool {
        !self.is_stone_status() && !self.is_region()
    }

    /// Unclassified stones of `color`.
    pub fn stone_kind(color: Color) -> Kind {
        Kind::of(color, Black, White)
    }

    fn of(color: Color, black: Kind, white: Kind) -> Kind {
        match color {
            Color::Black => black,
            Color::White => white,
        }
    }

    fn project(self, black: Kind, white: Kind) -> Kind {
        match self.family() {
            Some(c) => Kind::of(c, black, white),
            None => self,
        }
    }

    // The same status in this kind's colour family. Kinds without a family map
    // to themselves.

    pub fn territory_kind(self) -> Kind {
        self.project(BlackTerritory, WhiteTerritory)
    }

    pub fn safe_kind(self) -> Kind {
        self.project(SafeBlack, SafeWhite)
    }

    pub fn dead_kind(self) -> Kind {
        self.project(DeadBlack, DeadWhite)
    }

    pub fn seki_kind(self) -> Kind {
        self.project(SekiBlack, SekiWhite)
    }

    pub fn removed_kind(self) -> Kind {
        self.project(RemovedBlack, RemovedWhite)
    }

    pub fn fill_kind(self) -> Kind {
        self.project(FillBlack, FillWhite)
    }

    pub fn reserved_kind(self) -> Kind {
        self.project(ReservedForBlack, ReservedForWhite)
    }

    pub fn dame_kind(self) -> Kind {
        self.project(BlackDame, WhiteDame)
    }

    pub fn snapback_kind(self) -> Kind {
        self.project(BlackSnapbackTerritory, WhiteSnapbackTerritory)
    }

    /// Same status seen from the other player.
    pub fn opposite(self) -> Kind {
        match self {
            Black => White,
            White => Black,
            SafeBlack => SafeWhite,
            SafeWhite => SafeBlack,
            DeadBlack => DeadWhite,
            DeadWhite => DeadBlack,
            SekiBlack => SekiWhite,
            SekiWhite => SekiBlack,
            RemovedBlack => RemovedWhite,
            RemovedWhite => RemovedBlack,
            BlackTerritory => WhiteTerritory,
            WhiteTerritory => BlackTerritory,
            BlackSnapbackTerritory => WhiteSnapbackTerritory,
            WhiteSnapbackTerritory => BlackSnapbackTerritory,
            BlackDame => WhiteDame,
            WhiteDame => BlackDame,
            FillBlack => FillWhite,
            FillWhite => FillBlack,
            ReservedForBlack => ReservedForWhite,
            ReservedForWhite => ReservedForBlack,
            BlackAndEmpty => WhiteAndEmpty,
            WhiteAndEmpty => BlackAndEmpty,
            Empty | Dame | OutsideDame | FalseEye => self,
        }
    }

    /// A liberty of this kind keeps a `color` group alive at the end of the game.
    pub fn is_safe_liberty(self, color: Option<Color>) -> bool {
        match self {
            BlackTerritory | BlackSnapbackTerritory => color == Some(Color::Black),
            WhiteTerritory | WhiteSnapbackTerritory => color == Some(Color::White),
            _ => false,
        }
    }

    /// Will still be empty when play stops. Forced fills are not.
    pub fn is_now_empty(self) -> bool {
        match self {
            FillBlack | FillWhite => false,
            _ => !self.is_stone_status() || matches!(self, RemovedBlack | RemovedWhite),
        }
    }

    /// A forced fill of `color`: a stone of that color will stand here.
    pub fn is_now_connected(self, color: Option<Color>) -> bool {
        matches!(self, FillBlack | FillWhite) && color.is_some() && self.fill_chip() == color
    }

    pub fn is_now_empty_or_connected(self, color: Option<Color>) -> bool {
        self.is_now_empty() || self.is_now_connected(color)
    }

    pub fn is_dead(self) -> bool {
        matches!(self, DeadBlack | DeadWhite | RemovedBlack | RemovedWhite)
    }

    pub fn is_safe(self) -> bool {
        matches!(self, SafeBlack | SafeWhite)
    }

    pub fn is_seki(self) -> bool {
        matches!(self, SekiBlack | SekiWhite)
    }

    /// Settled territory of either player.
    pub fn is_safe_territory(self) -> bool {
        matches!(self, BlackTerritory | WhiteTerritory)
    }

    pub fn is_fill(self) -> bool {
        matches!(self, FillBlack | FillWhite)
    }

    pub fn is_reserved(self) -> bool {
        matches!(self, ReservedForBlack | ReservedForWhite)
    }

    /// Dame of any flavour.
    pub fn is_dame(self) -> bool {
        matches!(self, Dame | BlackDame | WhiteDame | OutsideDame)
    }

    /// Does not survive into a finished classification.
    pub fn is_transient(self) -> bool {
        self == Empty || self.is_region()
    }

    /// Cannot be scored: transient, or a stone group never judged.
    pub fn is_unresolved(self) -> bool {
        self.is_transient() || matches!(self, Black | White)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique_and_roundtrip() {
        for k in Kind::ALL {
            assert_eq!(Kind::from_code(k.code()), Some(k));
            let same = Kind::ALL.iter().filter(|o| o.code() == k.code()).count();
            assert_eq!(same, 1, "duplicate code for {k}");
        }
        assert_eq!(Kind::from_code('#'), None);
    }

    #[test]
    fn test_opposite_is_involution() {
        for k in Kind::ALL {
            assert_eq!(k.opposite().opposite(), k);
            assert_eq!(k.opposite().family(), k.family().map(Color::opponent));
        }
    }

    #[test]
    fn test_projections() {
        assert_eq!(DeadBlack.safe_kind(), SafeBlack);
        assert_eq!(White.dead_kind(), DeadWhite);
        assert_eq!(RemovedWhite.territory_kind(), WhiteTerritory);
        assert_eq!(WhiteAndEmpty.territory_kind(), BlackTerritory);
        assert_eq!(BlackAndEmpty.territory_kind(), WhiteTerritory);
        assert_eq!(BlackTerritory.fill_kind(), FillBlack);
        assert_eq!(Dame.safe_kind(), Dame);
        assert_eq!(Kind::stone_kind(Color::White), White);
    }

    #[test]
    fn test_chip_colors() {
        assert_eq!(SekiWhite.chip(), Some(Color::White));
        assert_eq!(FillBlack.chip(), None);
        assert_eq!(FillBlack.fill_chip(), Some(Color::Black));
        assert_eq!(RemovedBlack.fill_chip(), Some(Color::Black));
        assert_eq!(Dame.fill_chip(), None);
        assert_eq!(WhiteAndEmpty.border_color(), Some(Color::Black));
        assert_eq!(WhiteAndEmpty.intron_color(), Some(Color::White));
    }

    #[test]
    fn test_liberty_predicates() {
        let black = Some(Color::Black);
        assert!(BlackTerritory.is_safe_liberty(black));
        assert!(BlackSnapbackTerritory.is_safe_liberty(black));
        assert!(!WhiteTerritory.is_safe_liberty(black));
        assert!(!Dame.is_safe_liberty(black));
        assert!(!FillBlack.is_safe_liberty(black));

        assert!(Dame.is_now_empty());
        assert!(ReservedForWhite.is_now_empty());
        assert!(!FillWhite.is_now_empty());
        assert!(!SafeBlack.is_now_empty());
        assert!(FillBlack.is_now_connected(black));
        assert!(!FillWhite.is_now_connected(black));
        assert!(!ReservedForBlack.is_now_connected(black));
        assert!(!FillBlack.is_now_connected(None));
    }

    #[test]
    fn test_transient_kinds() {
        let transient: Vec<Kind> = Kind::ALL.into_iter().filter(|k| k.is_transient()).collect();
        assert_eq!(transient, vec![Empty, BlackAndEmpty, WhiteAndEmpty]);
        let unresolved: Vec<Kind> = Kind::ALL.into_iter().filter(|k| k.is_unresolved()).collect();
        assert_eq!(unresolved, vec![Empty, Black, White, BlackAndEmpty, WhiteAndEmpty]);
    }
}
