//! The [`Cell`] type — passage flags plus a transient display label.

use std::fmt;

use crate::geom::Direction;

// ---------------------------------------------------------------------------
// Passages
// ---------------------------------------------------------------------------

/// Bitmask of open passages out of a cell.
///
/// A passage is always bidirectional: opening one from A toward B also
/// opens B toward A. The grid's carve primitive is the only code that sets
/// these bits, and it updates both sides under a single lock acquisition.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Passages(u8);

impl Passages {
    /// Fully walled.
    pub const NONE: Self = Self(0);

    #[inline]
    const fn bit(dir: Direction) -> u8 {
        match dir {
            Direction::North => 1 << 0,
            Direction::South => 1 << 1,
            Direction::East => 1 << 2,
            Direction::West => 1 << 3,
        }
    }

    /// Whether the passage toward `dir` is open.
    #[inline]
    pub const fn is_open(self, dir: Direction) -> bool {
        self.0 & Self::bit(dir) != 0
    }

    /// Open the passage toward `dir`.
    #[inline]
    pub(crate) const fn open(&mut self, dir: Direction) {
        self.0 |= Self::bit(dir);
    }

    /// Whether every passage is closed.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of open passages.
    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }
}

// ---------------------------------------------------------------------------
// Label
// ---------------------------------------------------------------------------

/// The transient display label of a cell.
///
/// Labels exist purely for the observer: endpoints, BFS hop counts during
/// exploration, and path membership. They are cleared on reset and by the
/// routing cleanup phase.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Label {
    /// Nothing to display.
    #[default]
    None,
    /// The routing start endpoint.
    Start,
    /// The routing finish endpoint.
    Finish,
    /// Hop count from the start, shown during BFS exploration.
    Distance(i32),
    /// A cell on the reconstructed shortest path.
    Path,
}

impl Label {
    /// Whether there is anything to display.
    #[inline]
    pub const fn is_none(self) -> bool {
        matches!(self, Label::None)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::None => Ok(()),
            Label::Start => f.write_str("S"),
            Label::Finish => f.write_str("F"),
            Label::Distance(d) => write!(f, "{d}"),
            Label::Path => f.write_str("█"),
        }
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One maze location: four passage flags and a display label.
///
/// Cells are plain data. Neighbor relations are not stored here; the grid
/// derives them from coordinates, so a `Cell` read through
/// [`Grid::cell_at`](crate::Grid::cell_at) is a self-contained snapshot.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub passages: Passages,
    pub label: Label,
}

impl Cell {
    /// Whether the passage toward `dir` is open.
    #[inline]
    pub const fn is_open(self, dir: Direction) -> bool {
        self.passages.is_open(dir)
    }
}
