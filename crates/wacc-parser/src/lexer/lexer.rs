//! Main lexer implementation for WACC.
//!
//! The [`Lexer`] converts source text into a stream of [`Token`]s, dispatching
//! on the first character. Lexemes are copied into the arena.

use std::collections::VecDeque;

use bumpalo::Bump;
use wacc_core::{ParseError, ParseErrorKind, Span};

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, lookup_keyword};

/// Lexer for WACC source code.
///
/// Provides lookahead via [`peek`](Self::peek) and [`peek_nth`](Self::peek_nth).
pub struct Lexer<'src, 'ast> {
    cursor: Cursor<'src>,
    arena: &'ast Bump,
    lookahead: VecDeque<Token<'ast>>,
    errors: Vec<ParseError>,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
            lookahead: VecDeque::with_capacity(4),
            errors: Vec::new(),
        }
    }

    /// Take accumulated errors, leaving an empty vec.
    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Token<'ast> {
        if let Some(token) = self.lookahead.pop_front() {
            return token;
        }
        self.scan_token()
    }

    pub fn peek(&mut self) -> Token<'ast> {
        self.peek_nth(0)
    }

    /// Look `n` tokens ahead without consuming anything.
    pub fn peek_nth(&mut self, n: usize) -> Token<'ast> {
        while self.lookahead.len() <= n {
            let token = self.scan_token();
            self.lookahead.push_back(token);
        }
        self.lookahead[n]
    }

    // =========================================
    // Internal: Token scanning
    // =========================================

    fn scan_token(&mut self) -> Token<'ast> {
        self.skip_trivia();

        let start_line = self.cursor.line();
        let start_col = self.cursor.column();
        let start_offset = self.cursor.offset();

        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, "", Span::point(start_line, start_col));
        };

        match c {
            '"' => self.scan_string(start_line, start_col, start_offset),
            '\'' => self.scan_char(start_line, start_col, start_offset),
            c if c.is_ascii_digit() => {
                self.cursor.eat_while(|c| c.is_ascii_digit());
                self.make_token(TokenKind::IntLiteral, start_line, start_col, start_offset)
            }
            c if is_ident_start(c) => self.scan_identifier(start_line, start_col, start_offset),
            _ => self.scan_operator(start_line, start_col, start_offset),
        }
    }

    /// Skip whitespace and `#` comments.
    fn skip_trivia(&mut self) {
        loop {
            self.cursor.eat_while(|c| c.is_ascii_whitespace());
            if self.cursor.eat('#') {
                self.cursor.eat_while(|c| c != '\n');
            } else {
                break;
            }
        }
    }

    /// Create a token from start position to current position.
    fn make_token(&self, kind: TokenKind, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        let lexeme = self.cursor.slice_from(start_offset);
        let span = Span::new(start_line, start_col, lexeme.len() as u32);
        Token::new(kind, self.arena.alloc_str(lexeme), span)
    }

    /// Record an error and produce an error token covering the bad text.
    fn make_error(
        &mut self,
        kind: ParseErrorKind,
        message: String,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'ast> {
        let token = self.make_token(TokenKind::Error, start_line, start_col, start_offset);
        self.errors.push(ParseError::new(kind, token.span, message));
        token
    }

    // =========================================
    // Scanning: Literals
    // =========================================

    /// Scan `"..."`. The lexeme keeps the quotes and escapes as written.
    fn scan_string(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        self.cursor.advance();
        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    return self.make_error(
                        ParseErrorKind::UnterminatedString,
                        "unterminated string literal".into(),
                        start_line,
                        start_col,
                        start_offset,
                    );
                }
                Some('"') => {
                    self.cursor.advance();
                    return self.make_token(TokenKind::StringLiteral, start_line, start_col, start_offset);
                }
                Some('\\') => {
                    self.cursor.advance();
                    match self.cursor.advance() {
                        Some(c) if escape_value(c).is_some() => {}
                        Some(c) => {
                            self.cursor.eat_while(|c| c != '"' && c != '\n');
                            self.cursor.eat('"');
                            return self.make_error(
                                ParseErrorKind::InvalidEscape,
                                format!("invalid escape sequence '\\{c}'"),
                                start_line,
                                start_col,
                                start_offset,
                            );
                        }
                        None => continue,
                    }
                }
                Some(c) if is_plain_char(c) => {
                    self.cursor.advance();
                }
                Some(c) => {
                    self.cursor.advance();
                    self.cursor.eat_while(|c| c != '"' && c != '\n');
                    self.cursor.eat('"');
                    return self.make_error(
                        ParseErrorKind::UnexpectedChar,
                        format!("character {c:?} must be escaped"),
                        start_line,
                        start_col,
                        start_offset,
                    );
                }
            }
        }
    }

    /// Scan `'c'` or `'\n'`.
    fn scan_char(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        self.cursor.advance();
        let valid = match self.cursor.advance() {
            Some('\\') => self.cursor.advance().and_then(escape_value).is_some(),
            Some(c) => is_plain_char(c),
            None => false,
        };
        if valid && self.cursor.eat('\'') {
            return self.make_token(TokenKind::CharLiteral, start_line, start_col, start_offset);
        }
        self.cursor.eat_while(|c| c != '\'' && c != '\n');
        self.cursor.eat('\'');
        self.make_error(
            ParseErrorKind::InvalidCharLiteral,
            "invalid character literal".into(),
            start_line,
            start_col,
            start_offset,
        )
    }

    // =========================================
    // Scanning: Identifiers and keywords
    // =========================================

    fn scan_identifier(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        let lexeme = self.cursor.eat_while(is_ident_continue);
        let kind = lookup_keyword(lexeme).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start_line, start_col, start_offset)
    }

    // =========================================
    // Scanning: Operators
    // =========================================

    fn scan_operator(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        let Some(c) = self.cursor.advance() else {
            return Token::new(TokenKind::Eof, "", Span::point(start_line, start_col));
        };
        let next = self.cursor.peek();

        let kind = match (c, next) {
            ('(', _) => TokenKind::LeftParen,
            (')', _) => TokenKind::RightParen,
            ('[', _) => TokenKind::LeftBracket,
            (']', _) => TokenKind::RightBracket,
            (',', _) => TokenKind::Comma,
            (';', _) => TokenKind::Semicolon,
            ('+', _) => TokenKind::Plus,
            ('-', _) => TokenKind::Minus,
            ('*', _) => TokenKind::Star,
            ('/', _) => TokenKind::Slash,
            ('%', _) => TokenKind::Percent,

            ('=', Some('=')) => { self.cursor.advance(); TokenKind::EqualEqual }
            ('=', _) => TokenKind::Equal,
            ('!', Some('=')) => { self.cursor.advance(); TokenKind::BangEqual }
            ('!', _) => TokenKind::Bang,
            ('<', Some('=')) => { self.cursor.advance(); TokenKind::LessEqual }
            ('<', _) => TokenKind::Less,
            ('>', Some('=')) => { self.cursor.advance(); TokenKind::GreaterEqual }
            ('>', _) => TokenKind::Greater,
            ('&', Some('&')) => { self.cursor.advance(); TokenKind::AmpAmp }
            ('|', Some('|')) => { self.cursor.advance(); TokenKind::PipePipe }

            _ => {
                return self.make_error(
                    ParseErrorKind::UnexpectedChar,
                    format!("unexpected character {c:?}"),
                    start_line,
                    start_col,
                    start_offset,
                );
            }
        };

        self.make_token(kind, start_line, start_col, start_offset)
    }
}

impl<'src, 'ast> Iterator for Lexer<'src, 'ast> {
    type Item = Token<'ast>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

/// The character an escape sequence `\c` stands for.
pub fn escape_value(c: char) -> Option<char> {
    match c {
        '0' => Some('\0'),
        'b' => Some('\u{8}'),
        't' => Some('\t'),
        'n' => Some('\n'),
        'f' => Some('\u{c}'),
        'r' => Some('\r'),
        '"' => Some('"'),
        '\'' => Some('\''),
        '\\' => Some('\\'),
        _ => None,
    }
}

/// ASCII characters that may appear unescaped inside a literal.
fn is_plain_char(c: char) -> bool {
    c.is_ascii() && !matches!(c, '\\' | '\'' | '"') && !c.is_ascii_control()
}
