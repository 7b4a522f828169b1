//! Constants for board dimensions and SGF encoding limits.
//!
//! SGF encodes a coordinate axis with a single letter (`a`-`z`, then `A`-`Z`),
//! which caps both board dimensions at 52.

// =============================================================================
// Board Geometry
// =============================================================================

/// Smallest board dimension accepted by the parser.
pub const MIN_BOARD_SIZE: usize = 1;

/// Largest board dimension representable with SGF letter coordinates.
pub const MAX_BOARD_SIZE: usize = 52;

/// Board size used for new games when none is given.
pub const DEFAULT_BOARD_SIZE: usize = 19;

/// Boards at most this wide and tall treat `tt` as a pass (FF[3] compatibility).
pub const PASS_COMPAT_MAX_SIZE: usize = 19;

/// The historic pass coordinate `tt`, as (column, row).
pub const PASS_COMPAT_COORD: (usize, usize) = (19, 19);

// =============================================================================
// Property Names
// =============================================================================

/// Name of the board size property. Every root node must carry it.
pub const BOARD_SIZE_PROPERTY: &str = "SZ";

/// Name of the comment property.
pub const COMMENT_PROPERTY: &str = "C";

/// File format written by the renderer for new games.
pub const FILE_FORMAT: i64 = 4;

/// SGF game number for Go.
pub const GAME_GO: i64 = 1;

// =============================================================================
// Text Rendering
// =============================================================================

/// Black stone in board diagrams.
pub const DIAGRAM_BLACK: char = 'X';

/// White stone in board diagrams.
pub const DIAGRAM_WHITE: char = 'O';

/// Empty point in board diagrams.
pub const DIAGRAM_EMPTY: char = '.';
