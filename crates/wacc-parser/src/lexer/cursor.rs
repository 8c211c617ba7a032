/// A cursor over source text that tracks position.
///
/// Provides low-level character access with peek/advance semantics and
/// keeps byte offset, line and column in step as it moves.
pub struct Cursor<'src> {
    source: &'src str,
    /// Remaining source text (slice starting at current position).
    rest: &'src str,
    offset: u32,
    /// Current line number (1-indexed).
    line: u32,
    /// Current column number (1-indexed, byte-based).
    column: u32,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Peek at the current character without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    #[inline]
    pub fn check(&self, f: impl Fn(char) -> bool) -> bool {
        self.peek().is_some_and(f)
    }

    /// Consume the current character, updating line/column tracking.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.rest.chars().next()?;
        let len = ch.len_utf8();
        self.rest = &self.rest[len..];
        self.offset += len as u32;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += len as u32;
        }

        Some(ch)
    }

    /// Consume if the current character matches.
    #[inline]
    pub fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume characters while the predicate matches, returning the slice.
    pub fn eat_while(&mut self, f: impl Fn(char) -> bool) -> &'src str {
        let start = self.offset;
        while self.check(&f) {
            self.advance();
        }
        self.slice_from(start)
    }

    /// Source text from a starting offset to the current position.
    #[inline]
    pub fn slice_from(&self, start: u32) -> &'src str {
        &self.source[start as usize..self.offset as usize]
    }
}

#[inline]
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
pub fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_basics() {
        let mut cursor = Cursor::new("skip");
        assert_eq!(cursor.peek(), Some('s'));
        assert_eq!(cursor.advance(), Some('s'));
        assert_eq!(cursor.peek(), Some('k'));
        assert_eq!(cursor.offset(), 1);
    }

    #[test]
    fn cursor_eat_while() {
        let mut cursor = Cursor::new("123abc");
        assert_eq!(cursor.eat_while(|c| c.is_ascii_digit()), "123");
        assert_eq!(cursor.eat_while(is_ident_continue), "abc");
        assert_eq!(cursor.peek(), None);
    }

    #[test]
    fn cursor_line_and_column() {
        let mut cursor = Cursor::new("a\nb");
        cursor.advance();
        assert_eq!((cursor.line(), cursor.column()), (1, 2));
        cursor.advance();
        assert_eq!((cursor.line(), cursor.column()), (2, 1));
    }
}
