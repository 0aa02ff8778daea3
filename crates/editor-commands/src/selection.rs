//! Positions and selection ranges as seen by the dispatch core.
//!
//! Ranges are owned by the host's selection model. The core only reads snapshots of them, so the
//! types here are plain `Copy` values with no link back to a document.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Position coordinates (line and column numbers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based logical line index.
    pub line: usize,
    /// Zero-based column in characters within the logical line.
    pub column: usize,
}

impl Position {
    /// Create a new logical position.
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// The document origin, `(0, 0)`.
    pub const fn origin() -> Self {
        Self::new(0, 0)
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open selection range.
///
/// `start <= end` always holds for values built through [`SelectionRange::new`]; a range whose
/// endpoints coincide is a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionRange {
    /// Inclusive start position.
    pub start: Position,
    /// Exclusive end position.
    pub end: Position,
}

impl SelectionRange {
    /// Build a range from two endpoints in any order.
    pub fn new(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// A collapsed range at `position`.
    pub const fn cursor(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Convenience constructor from raw `(line, column)` pairs.
    pub fn from_coords(start: (usize, usize), end: (usize, usize)) -> Self {
        Self::new(
            Position::new(start.0, start.1),
            Position::new(end.0, end.1),
        )
    }

    /// Whether this range is a cursor.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether the range spans more than one line.
    pub fn is_multi_line(&self) -> bool {
        self.start.line != self.end.line
    }

    /// Logical lines the range covers.
    ///
    /// A multi-line range ending at column 0 stops before its end line, which it does not reach.
    pub fn lines(&self) -> std::ops::RangeInclusive<usize> {
        let last = if self.is_multi_line() && self.end.column == 0 {
            self.end.line - 1
        } else {
            self.end.line
        };
        self.start.line..=last
    }

    /// Whether `pos` lies within the range, endpoints included.
    pub fn contains_inclusive(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }
}

impl fmt::Display for SelectionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Sort ranges into document order and merge overlaps.
///
/// Ranges that merely touch (one ends exactly where the next starts) are kept apart, and exact
/// duplicates are dropped. This is the invariant hosts are expected to maintain for the selection
/// sets they hand to the dispatcher.
pub fn normalize_ranges(mut ranges: Vec<SelectionRange>) -> Vec<SelectionRange> {
    ranges.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.end.cmp(&b.end)));

    let mut merged: Vec<SelectionRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start < last.end => {
                last.end = last.end.max(range.end);
            }
            Some(last) if *last == range => {}
            _ => merged.push(range),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_orders_endpoints() {
        let r = SelectionRange::new(Position::new(3, 1), Position::new(1, 4));
        assert_eq!(r.start, Position::new(1, 4));
        assert_eq!(r.end, Position::new(3, 1));
        assert!(r.is_multi_line());
    }

    #[test]
    fn test_lines_excludes_unreached_end_line() {
        let full_line = SelectionRange::from_coords((0, 0), (1, 0));
        assert_eq!(full_line.lines(), 0..=0);

        let into_next = SelectionRange::from_coords((0, 2), (1, 1));
        assert_eq!(into_next.lines(), 0..=1);

        let cursor = SelectionRange::cursor(Position::new(4, 0));
        assert_eq!(cursor.lines(), 4..=4);
    }

    #[test]
    fn test_normalize_merges_overlaps_but_keeps_touching_ranges() {
        let ranges = vec![
            SelectionRange::from_coords((2, 0), (2, 4)),
            SelectionRange::from_coords((0, 0), (0, 3)),
            SelectionRange::from_coords((0, 2), (1, 1)),
            SelectionRange::from_coords((1, 1), (1, 2)),
            SelectionRange::from_coords((2, 0), (2, 4)),
        ];

        assert_eq!(
            normalize_ranges(ranges),
            vec![
                SelectionRange::from_coords((0, 0), (1, 1)),
                SelectionRange::from_coords((1, 1), (1, 2)),
                SelectionRange::from_coords((2, 0), (2, 4)),
            ]
        );
    }
}
