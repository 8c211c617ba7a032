//! Source positions attached to tokens, syntax nodes and diagnostics.

use std::fmt;

/// Where a construct starts in the source, plus how many bytes it covers.
///
/// Lines and columns are 1-indexed; a default span (`0:0`) marks synthesized
/// nodes that have no source text of their own.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub line: u32,
    pub col: u32,
    pub len: u32,
}

impl Span {
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// A zero-width span, used for end-of-input and synthesized positions.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Extend `self` so it also covers `other`.
    ///
    /// Spans on different lines keep the start of `self`; the length is then
    /// only an approximation, which is all diagnostics need.
    pub fn merge(self, other: Span) -> Span {
        if self.line == other.line {
            let start = self.col.min(other.col);
            let end = (self.col + self.len).max(other.col + other.len);
            Span::new(self.line, start, end - start)
        } else {
            Span::new(self.line, self.col, self.len + other.len)
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
