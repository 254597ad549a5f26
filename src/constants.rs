//! Constants for board text, scoring defaults, and classification thresholds.
//!
//! The classification engine is a heuristic. Its thresholds were tuned against a
//! large set of finished professional and amateur games, so they are kept here as
//! named values rather than being adjusted in place. Changing any of them changes
//! which groups are judged alive.

// =============================================================================
// Board Geometry
// =============================================================================

/// Default board size used by the command line front end.
pub const DEFAULT_SIZE: usize = 19;

/// Smallest board the engine accepts.
pub const MIN_SIZE: usize = 2;

/// Largest board the engine accepts (coordinates run out of letters beyond this).
pub const MAX_SIZE: usize = 25;

/// Column letters used for coordinates. `I` is skipped by Go convention.
pub const COLUMNS: &[u8] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

// =============================================================================
// Board Text
// =============================================================================

/// Empty point in board diagrams.
pub const GLYPH_EMPTY: char = '.';

/// Black stone in board diagrams.
pub const GLYPH_BLACK: char = 'X';

/// White stone in board diagrams.
pub const GLYPH_WHITE: char = 'O';

/// Black stone flagged alive by a reviewer.
pub const GLYPH_BLACK_ALIVE: char = 'x';

/// White stone flagged alive by a reviewer.
pub const GLYPH_WHITE_ALIVE: char = 'o';

// =============================================================================
// Scoring
// =============================================================================

/// Default komi awarded to White.
pub const DEFAULT_KOMI: f64 = 6.5;

// =============================================================================
// Classification Thresholds
// =============================================================================

/// Groups larger than this with fewer than two liberties are dead before any
/// other analysis. Small groups are exempt because single-stone kos and
/// sacrificed introns are routinely left on the board.
pub const OBVIOUSLY_DEAD_SIZE: usize = 6;

/// Embedded groups smaller than this are killed outright when their region is
/// claimed, without asking whether they could live on their own.
pub const SMALL_EMBEDDED_GROUP: usize = 7;

/// A region at least this large can be claimed while holding a few live introns.
pub const LARGE_REGION: usize = 8;

/// Embedded stones (not in atari) a large region may hold and still be claimed.
pub const LARGE_REGION_INTRONS: usize = 6;

/// Atari stones inside a region beyond which it is claimed regardless of shape.
pub const ATARI_INTRONS: usize = 6;

/// A dame group larger than this is treated as territory when most of its border
/// is one color.
pub const LARGE_DAME: usize = 7;

/// Fraction of the border a single color must hold for a large dame to count as
/// that color's territory.
pub const DAME_BORDER_FRACTION: f64 = 0.75;

/// Territories adjacent to a newly safe group are settled only below this size.
pub const SETTLE_TERRITORY_LIMIT: usize = 10;

/// Territories shared by a seki group are neutralized only below this size.
pub const SEKI_TERRITORY_LIMIT: usize = 12;

/// Embedded groups larger than this are checked for independent life before a
/// territory is credited to its surrounding group.
pub const COMPLEX_TERRITORY_GROUP: usize = 8;

/// Opponent regions larger than this around an unsafe group are assumed to kill it.
pub const ONE_EYED_REGION: usize = 6;

/// Regions below this size are small enough to search for inside connections.
pub const UNCONNECTED_EYE_LIMIT: usize = 10;

/// Connected eye spaces up to this size are judged by shape.
pub const SHAPE_EYE_LIMIT: usize = 7;

/// Largest region whose embedded groups are settled once two eyes are found.
pub const SETTLED_EYE_SPACE: usize = 7;

/// A territory this small also credits the opposite region when it is small too.
pub const SMALL_TERRITORY: usize = 4;

/// Size limit for the opposite region credited by a small territory.
pub const SMALL_OPPOSITE_REGION: usize = 7;

/// Dame regions at most this large are too small to be seki.
pub const SMALL_DAME_REGION: usize = 4;

/// Tiny territories this size or smaller are reconsidered as dame.
pub const TINY_TERRITORY: usize = 2;

/// Share of a region that may be occupied by introns for one eye to be awarded.
pub const ONE_EYE_INTRON_FRACTION: f64 = 0.75;

/// Share of a region that may be occupied by introns for a second eye, and the
/// share embedded territories may occupy before no eyes are awarded at all.
pub const TWO_EYE_INTRON_FRACTION: f64 = 0.4;

/// A region is claimed when its non-atari introns times this divisor stay below
/// the region size.
pub const REGION_INTRON_DIVISOR: usize = 3;

/// Live introns may occupy less than this share of a region before it is claimed.
pub const SAFE_INTRON_FRACTION: f64 = 0.5;

/// Cells added when searching for inside connections of a small region.
pub const MAX_INSIDE_CONNECTIONS: usize = 6;
