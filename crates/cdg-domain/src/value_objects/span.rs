//! Text spans
//!
//! A span is a contiguous byte range within a file's text, with the
//! corresponding 1-based line range carried along for reporting.

use serde::{Deserialize, Serialize};

/// A contiguous half-open byte range `[start_byte, end_byte)` in a file,
/// plus its 1-based line range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// First byte of the span
    pub start_byte: usize,
    /// One past the last byte of the span
    pub end_byte: usize,
    /// 1-based line of the first byte
    pub start_line: u32,
    /// 1-based line of the last byte
    pub end_line: u32,
}

impl Span {
    /// Create a span from byte and line bounds
    pub fn new(start_byte: usize, end_byte: usize, start_line: u32, end_line: u32) -> Self {
        Self {
            start_byte,
            end_byte,
            start_line,
            end_line,
        }
    }

    /// Length of the span in bytes
    pub fn len(&self) -> usize {
        self.end_byte.saturating_sub(self.start_byte)
    }

    /// Whether the span covers zero bytes
    pub fn is_empty(&self) -> bool {
        self.end_byte <= self.start_byte
    }

    /// Whether `other` is fully contained within this span
    pub fn contains(&self, other: &Span) -> bool {
        self.start_byte <= other.start_byte && other.end_byte <= self.end_byte
    }

    /// Whether this span shares any byte with `other`
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start_byte < other.end_byte && other.start_byte < self.end_byte
    }

    /// The text covered by this span
    ///
    /// Callers must pass the same text the span was computed against.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start_byte..self.end_byte.min(text.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_containment_and_overlap() {
        let outer = Span::new(0, 100, 1, 10);
        let inner = Span::new(10, 40, 2, 5);
        let disjoint = Span::new(100, 120, 10, 12);

        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.overlaps(&inner));
        assert!(!outer.overlaps(&disjoint));
    }

    #[test]
    fn test_slice() {
        let text = "def add(a, b):";
        let span = Span::new(0, 7, 1, 1);
        assert_eq!(span.slice(text), "def add");
    }
}
