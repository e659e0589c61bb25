//! Half-open row intervals and the classifier that places them in the forest.

use snafu::{ensure, Snafu};
use std::{fmt, ops::Range};

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum IntervalError {
    #[snafu(display("Invalid interval: start row {start} > end row {end}"))]
    Inverted { start: u32, end: u32 },
}

/// A half-open row range `[start, end)`.
///
/// Intervals in the same forest are either disjoint, identical, or strictly
/// nested. Partial overlap is reported by [`classify`] as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval {
    start: u32,
    end: u32,
}

impl Interval {
    pub fn new(start: u32, end: u32) -> Result<Self, IntervalError> {
        ensure!(start <= end, InvertedSnafu { start, end });
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn rows(&self) -> Range<u32> {
        self.start..self.end
    }

    /// True if `other` lies within `self`. Identical intervals contain each other.
    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl TryFrom<Range<u32>> for Interval {
    type Error = IntervalError;

    fn try_from(range: Range<u32>) -> Result<Self, Self::Error> {
        Self::new(range.start, range.end)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Where a new interval sits relative to an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// The new interval strictly encloses the existing one.
    Parent,
    /// The new interval is strictly enclosed by the existing one.
    Child,
    /// The new interval ends at or before the existing one starts.
    Above,
    /// The new interval starts at or after the existing one ends.
    Below,
    Same,
}

/// Compare `new` against `existing`.
///
/// Returns `None` when the two partially overlap, which no well-formed
/// variational document produces.
pub fn classify(new: Interval, existing: Interval) -> Option<Relation> {
    if new == existing {
        return Some(Relation::Same);
    }
    if new.contains(&existing) {
        return Some(Relation::Parent);
    }
    if existing.contains(&new) {
        return Some(Relation::Child);
    }
    if new.end <= existing.start {
        return Some(Relation::Above);
    }
    if new.start >= existing.end {
        return Some(Relation::Below);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start: u32, end: u32) -> Interval {
        Interval::new(start, end).unwrap()
    }

    #[test]
    fn rejects_inverted_interval() {
        assert_eq!(
            Interval::new(5, 2),
            Err(IntervalError::Inverted { start: 5, end: 2 })
        );
        assert!(Interval::new(3, 3).unwrap().is_empty());
    }

    #[test]
    fn nesting_relations() {
        assert_eq!(classify(iv(2, 10), iv(4, 6)), Some(Relation::Parent));
        assert_eq!(classify(iv(4, 6), iv(2, 10)), Some(Relation::Child));
        assert_eq!(classify(iv(2, 10), iv(2, 10)), Some(Relation::Same));
        // Sharing an edge still counts as nesting.
        assert_eq!(classify(iv(2, 6), iv(2, 10)), Some(Relation::Child));
        assert_eq!(classify(iv(2, 10), iv(6, 10)), Some(Relation::Parent));
    }

    #[test]
    fn half_open_neighbours_are_disjoint() {
        assert_eq!(classify(iv(2, 4), iv(4, 6)), Some(Relation::Above));
        assert_eq!(classify(iv(4, 6), iv(2, 4)), Some(Relation::Below));
        assert_eq!(classify(iv(12, 15), iv(2, 10)), Some(Relation::Below));
    }

    #[test]
    fn partial_overlap_is_unclassified() {
        assert_eq!(classify(iv(2, 6), iv(4, 10)), None);
        assert_eq!(classify(iv(4, 10), iv(2, 6)), None);
    }
}
