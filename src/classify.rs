//! The classification pipeline and its result.
//!
//! [`classify`] runs every pass over a private [`Analysis`] of the board and
//! returns one [`Kind`] per cell. The board itself is never touched, so the
//! same board always classifies the same way.

use std::fmt;

use thiserror::Error;

use crate::analysis::Analysis;
use crate::board::{Board, Point, coord_on};
use crate::constants::OBVIOUSLY_DEAD_SIZE;
use crate::kind::Kind;

#[derive(Clone, Copy, Debug, Default)]
pub struct ClassifyConfig {
    /// Log each pass and every status change to stderr.
    pub trace: bool,
}

/// Something the classifier could not reconcile. Reported, never repaired.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inconsistency {
    BothDead { group: String, other: String },
    DeadAdjacentToSeki { group: String, seki: String },
    TerritoryNotSettled { group: String, territory: String },
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inconsistency::BothDead { group, other } => write!(f, "both dead: {group} {other}"),
            Inconsistency::DeadAdjacentToSeki { group, seki } => {
                write!(f, "dead adjacent to seki: {group} {seki}")
            }
            Inconsistency::TerritoryNotSettled { group, territory } => {
                write!(f, "territory not settled: {group} {territory}")
            }
        }
    }
}

/// Final status of every cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    size: usize,
    kinds: Vec<Kind>,
    inconsistencies: Vec<Inconsistency>,
}

impl Classification {
    /// Side length of the classified board.
    pub fn size(&self) -> usize {
        self.size
    }

    /// One kind per point, row-major.
    pub fn kinds(&self) -> &[Kind] {
        &self.kinds
    }

    pub fn kind_at(&self, p: Point) -> Kind {
        self.kinds[p]
    }

    /// Contradictions found after the last pass. Empty when parsed from text.
    pub fn inconsistencies(&self) -> &[Inconsistency] {
        &self.inconsistencies
    }

    /// Number of cells with the given kind.
    pub fn count(&self, kind: Kind) -> usize {
        self.kinds.iter().filter(|&&k| k == kind).count()
    }

    /// One code character per cell, top row first.
    pub fn as_text(&self) -> String {
        self.kinds
            .chunks(self.size)
            .map(|row| row.iter().map(|k| k.code()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Reads text written by [`as_text`](Self::as_text). Blank lines and
    /// spaces are ignored.
    pub fn from_text(text: &str) -> Result<Self, DiffError> {
        let mut kinds = Vec::new();
        let mut rows = 0;
        let mut width = None;
        for (i, line) in text.lines().enumerate() {
            let codes: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if codes.is_empty() {
                continue;
            }
            if *width.get_or_insert(codes.len()) != codes.len() {
                return Err(DiffError::Ragged { line: i + 1 });
            }
            for ch in codes {
                let kind = Kind::from_code(ch).ok_or(DiffError::UnknownCode { line: i + 1, ch })?;
                kinds.push(kind);
            }
            rows += 1;
        }
        if width != Some(rows) {
            return Err(DiffError::NotSquare { rows, columns: width.unwrap_or(0) });
        }
        Ok(Self {
            size: rows,
            kinds,
            inconsistencies: Vec::new(),
        })
    }
}

/// Classifies every point of `board` with the default configuration.
pub fn classify(board: &Board) -> Classification {
    classify_with(board, &ClassifyConfig::default())
}

/// Runs every pass over `board` and checks the result for contradictions.
pub fn classify_with(board: &Board, config: &ClassifyConfig) -> Classification {
    let mut a = Analysis::new(board, config.trace);
    trace!(a, "classify: {} groups", a.part.len());
    a.run_passes();
    let inconsistencies = a.check_for_inconsistency();
    for problem in &inconsistencies {
        trace!(a, "inconsistent: {problem}");
    }
    Classification {
        size: board.size(),
        kinds: board.points().map(|p| a.kind_at(p)).collect(),
        inconsistencies,
    }
}

impl Analysis<'_> {
    fn pass(&mut self, name: &str, run: impl FnOnce(&mut Self)) {
        run(self);
        let changes = self.take_changes();
        trace!(self, "{name}: {changes} changes");
    }

    fn run_passes(&mut self) {
        self.pass("obviously dead", Self::mark_obviously_dead);
        self.pass("empty groups", Self::classify_empty_groups);
        self.pass("territory", |a| {
            a.mark_as_territory();
        });
        self.pass("self atari", Self::mark_self_atari);
        self.pass("endgame atari", Self::mark_endgame_atari);
        self.pass("territory", |a| {
            a.mark_as_territory();
        });

        self.pass("attach territories", Self::add_territories);
        self.pass("override", Self::apply_overrides);
        self.pass("safe territories", Self::mark_safe_territories);
        self.pass("kill one eyed", Self::kill_one_eyed);
        self.pass("override", Self::apply_overrides);

        self.pass("territory", |a| {
            a.mark_as_territory();
        });
        self.pass("double atari", Self::mark_double_atari);
        self.pass("endgame atari", Self::mark_endgame_atari);
        self.pass("territory", |a| {
            a.mark_as_territory();
        });

        self.pass("endgame kills", Self::mark_endgame_kills);
        self.pass("optional fill", Self::remove_optional_fill);
    }

    /// Big groups with fewer than two liberties are dead before anything else.
    pub fn mark_obviously_dead(&mut self) {
        for g in self.part.colored().to_vec().into_iter().rev() {
            if self.size(g) > OBVIOUSLY_DEAD_SIZE && self.count_liberties(g) < 2 {
                let dead = self.kind(g).dead_kind();
                self.set_kind(g, dead, "atari");
            }
        }
    }

    /// Stones a reviewer flagged alive make their whole group safe.
    pub fn apply_overrides(&mut self) {
        for p in self.board.points() {
            if self.board.get(p).is_some() && self.board.is_flagged_alive(p) {
                let g = self.group_of(p);
                let safe = self.kind(g).safe_kind();
                self.set_kind(g, safe, "safe override");
            }
        }
    }

    /// Pairs of groups whose final kinds contradict each other.
    pub fn check_for_inconsistency(&self) -> Vec<Inconsistency> {
        let name = |g| self.board.coord(self.top(g));
        let mut found = Vec::new();
        for &g in self.part.colored().iter().rev() {
            let k = self.kind(g);
            if k.is_dead() {
                for enemy in self.adjacent_groups(g).into_iter().rev() {
                    let ek = self.kind(enemy);
                    if ek.is_dead() && g.index() < enemy.index() {
                        found.push(Inconsistency::BothDead {
                            group: name(g),
                            other: name(enemy),
                        });
                    } else if ek.is_seki() && self.size(g) >= 3 {
                        found.push(Inconsistency::DeadAdjacentToSeki {
                            group: name(g),
                            seki: name(enemy),
                        });
                    }
                }
                for empty in self.adjacent_empty_groups(g).into_iter().rev() {
                    let ek = self.kind(empty);
                    let claimed = ek.is_safe_territory()
                        || ek.is_fill()
                        || ek.is_reserved()
                        || matches!(
                            ek,
                            Kind::BlackSnapbackTerritory | Kind::WhiteSnapbackTerritory
                        );
                    if claimed && ek.fill_chip() == k.chip() {
                        found.push(Inconsistency::TerritoryNotSettled {
                            group: name(g),
                            territory: name(empty),
                        });
                    }
                }
            } else if k.is_safe() || k.is_seki() {
                for empty in self.adjacent_empty_groups(g).into_iter().rev() {
                    let ek = self.kind(empty);
                    let owned = ek.is_safe_territory()
                        || matches!(
                            ek,
                            Kind::BlackSnapbackTerritory | Kind::WhiteSnapbackTerritory
                        );
                    if owned && ek.fill_chip() != k.chip() {
                        found.push(Inconsistency::TerritoryNotSettled {
                            group: name(g),
                            territory: name(empty),
                        });
                    }
                }
            }
        }
        found
    }
}

// =============================================================================
// Comparing classifications
// =============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiffError {
    #[error("cannot compare a {old}x{old} classification with a {new}x{new} one")]
    SizeMismatch { old: usize, new: usize },
    #[error("line {line}: unknown status code {ch:?}")]
    UnknownCode { line: usize, ch: char },
    #[error("line {line}: row length differs from the first row")]
    Ragged { line: usize },
    #[error("{rows} rows of {columns} codes is not a square board")]
    NotSquare { rows: usize, columns: usize },
}

/// A cell whose status changed between two classifications.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellDiff {
    pub point: Point,
    pub coord: String,
    pub was: Kind,
    pub now: Kind,
}

impl fmt::Display for CellDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} was {} is {}", self.coord, self.was, self.now)
    }
}

/// Cells whose kind differs between `old` and `new`, in row-major order.
pub fn diff_classification(
    old: &Classification,
    new: &Classification,
) -> Result<Vec<CellDiff>, DiffError> {
    if old.size != new.size {
        return Err(DiffError::SizeMismatch {
            old: old.size,
            new: new.size,
        });
    }
    Ok(old
        .kinds
        .iter()
        .zip(&new.kinds)
        .enumerate()
        .filter(|(_, (was, now))| was != now)
        .map(|(point, (&was, &now))| CellDiff {
            point,
            coord: coord_on(old.size, point),
            was,
            now,
        })
        .collect())
}

/// One line per differing cell, or `CS Compared ok`.
pub fn diff_report(diffs: &[CellDiff]) -> String {
    if diffs.is_empty() {
        return "CS Compared ok".to_string();
    }
    diffs
        .iter()
        .map(CellDiff::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
