//! Buffer coordinates shared by the forest, the directive suppressor and the host.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A buffer position: zero-based row and column.
///
/// Columns past the end of a line are clamped by the host, so
/// [`Position::end_of_row`] can address "the end of this line" without knowing
/// its length.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Serialize, Deserialize,
)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct Position {
    pub row: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Start of `row`.
    pub const fn start_of_row(row: u32) -> Self {
        Self { row, column: 0 }
    }

    /// End of `row`, whatever its length.
    pub const fn end_of_row(row: u32) -> Self {
        Self {
            row,
            column: u32::MAX,
        }
    }
}

impl From<[u32; 2]> for Position {
    fn from([row, column]: [u32; 2]) -> Self {
        Self { row, column }
    }
}

impl From<Position> for [u32; 2] {
    fn from(position: Position) -> Self {
        [position.row, position.column]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.column == u32::MAX {
            write!(f, "({}, eol)", self.row)
        } else {
            write!(f, "({}, {})", self.row, self.column)
        }
    }
}

/// A buffer range handed to the host's fold capability.
///
/// Unlike [`Interval`](crate::Interval), fold ranges are column-precise: hiding
/// a directive collapses it from the end of the previous line through the end of
/// its own line, which leaves the previous line visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FoldRange {
    pub start: Position,
    pub end: Position,
}

impl FoldRange {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Collapse `row` into the end of the row above it.
    ///
    /// Returns `None` for row 0, which has nothing above it to collapse into.
    pub fn collapse_into_previous(row: u32) -> Option<Self> {
        let previous = row.checked_sub(1)?;
        Some(Self::new(
            Position::end_of_row(previous),
            Position::end_of_row(row),
        ))
    }

    /// Hide whole rows `first..=last`.
    pub const fn rows(first: u32, last: u32) -> Self {
        Self::new(Position::start_of_row(first), Position::end_of_row(last))
    }
}

impl fmt::Display for FoldRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
