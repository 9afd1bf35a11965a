//! Source span: 1-based lines, 0-based columns (spec.md §3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Span {
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// A span covering a single point (used for synthesized nodes that have
    /// no direct syntactic counterpart, e.g. a synthesized exit block).
    pub fn point(line: u32, column: u32) -> Self {
        Self::new(line, column, line, column)
    }

    pub fn contains_line(&self, line: u32) -> bool {
        line >= self.start_line && line <= self.end_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_line_is_inclusive() {
        let span = Span::new(4, 0, 9, 1);
        assert!(span.contains_line(4));
        assert!(span.contains_line(9));
        assert!(!span.contains_line(3));
        assert!(!span.contains_line(10));
    }
}
