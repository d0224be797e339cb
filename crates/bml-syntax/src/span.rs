//! Source locations
//!
//! [`TextRange`] is what fixes operate on (byte offsets); [`Span`] adds the
//! human-facing line/column positions used in findings.

use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)` into a source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TextRange {
    /// Inclusive start offset
    pub start: usize,
    /// Exclusive end offset
    pub end: usize,
}

impl TextRange {
    /// Create a new range
    #[inline]
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if range is empty (an insertion point)
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Check if two ranges conflict when applied in one pass.
    ///
    /// Touching ranges (`[0,3)` and `[3,5)`) do not conflict. Two insertions at
    /// the same offset do, since their relative order would be ambiguous.
    #[inline]
    #[must_use]
    pub const fn overlaps(&self, other: &TextRange) -> bool {
        (self.start < other.end && other.start < self.end) || self.start == other.start
    }

    /// Check if `offset` falls inside the range
    #[inline]
    #[must_use]
    pub const fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// One-based line/column position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Byte column (1-based)
    pub column: usize,
}

impl From<tree_sitter::Point> for Position {
    fn from(point: tree_sitter::Point) -> Self {
        Self {
            line: point.row + 1,
            column: point.column + 1,
        }
    }
}

/// Byte range plus start/end positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Byte range
    pub range: TextRange,
    /// Start position
    pub start: Position,
    /// End position
    pub end: Position,
}

impl Span {
    /// Span covering a syntax node
    #[must_use]
    pub fn of(node: &tree_sitter::Node<'_>) -> Self {
        Self {
            range: TextRange::new(node.start_byte(), node.end_byte()),
            start: node.start_position().into(),
            end: node.end_position().into(),
        }
    }

    /// Span covering two nodes, from the start of `first` to the end of `last`
    #[must_use]
    pub fn between(first: &tree_sitter::Node<'_>, last: &tree_sitter::Node<'_>) -> Self {
        Self {
            range: TextRange::new(first.start_byte(), last.end_byte()),
            start: first.start_position().into(),
            end: last.end_position().into(),
        }
    }

    /// Synthetic span from a byte range (positions unknown)
    #[inline]
    #[must_use]
    pub const fn detached(range: TextRange) -> Self {
        Self {
            range,
            start: Position { line: 0, column: 0 },
            end: Position { line: 0, column: 0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_overlap_rules() {
        let a = TextRange::new(0, 3);
        assert!(a.overlaps(&TextRange::new(2, 5)));
        assert!(!a.overlaps(&TextRange::new(3, 5)));
        assert!(TextRange::new(4, 4).overlaps(&TextRange::new(4, 4)));
        assert!(!TextRange::new(4, 4).overlaps(&TextRange::new(5, 5)));
    }

    #[test]
    fn range_len_and_contains() {
        let r = TextRange::new(2, 6);
        assert_eq!(r.len(), 4);
        assert!(r.contains(2));
        assert!(!r.contains(6));
        assert!(TextRange::new(3, 3).is_empty());
    }

    #[test]
    fn point_conversion_is_one_based() {
        let pos: Position = tree_sitter::Point { row: 0, column: 4 }.into();
        assert_eq!(pos, Position { line: 1, column: 5 });
    }
}
