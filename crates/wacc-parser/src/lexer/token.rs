//! Token types for the WACC lexer.

use std::fmt;

use wacc_core::Span;

/// A token from the source code.
///
/// The lexeme is copied into the arena, so tokens outlive the source string.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    pub kind: TokenKind,
    /// The source text of this token (allocated in arena).
    pub lexeme: &'ast str,
    pub span: Span,
}

impl<'ast> Token<'ast> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

/// All token types in WACC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Literals
    // =========================================
    /// Unsigned decimal digits: `42`
    IntLiteral,
    /// `'a'`, `'\n'`
    CharLiteral,
    /// `"hello"`
    StringLiteral,

    Identifier,

    // =========================================
    // Keywords - Structure
    // =========================================
    Begin,
    End,
    Is,

    // =========================================
    // Keywords - Statements
    // =========================================
    Skip,
    Read,
    Free,
    Return,
    Exit,
    Print,
    Println,
    If,
    Then,
    Else,
    Fi,
    While,
    Do,
    Done,

    // =========================================
    // Keywords - Right-hand sides
    // =========================================
    Newpair,
    Call,
    Fst,
    Snd,

    // =========================================
    // Keywords - Types
    // =========================================
    Int,
    Bool,
    Char,
    String,
    Pair,

    // =========================================
    // Keywords - Operators and values
    // =========================================
    Len,
    Ord,
    Chr,
    True,
    False,
    Null,

    // =========================================
    // Punctuation
    // =========================================
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Comma,
    Semicolon,

    // =========================================
    // Operators
    // =========================================
    Equal,
    Bang,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    EqualEqual,
    BangEqual,
    AmpAmp,
    PipePipe,

    // =========================================
    // Special
    // =========================================
    /// A lexing error; the message is recorded by the lexer.
    Error,
    Eof,
}

impl TokenKind {
    /// How this token is written, for diagnostics.
    pub fn description(self) -> &'static str {
        match self {
            TokenKind::IntLiteral => "integer literal",
            TokenKind::CharLiteral => "character literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::Identifier => "identifier",
            TokenKind::Begin => "'begin'",
            TokenKind::End => "'end'",
            TokenKind::Is => "'is'",
            TokenKind::Skip => "'skip'",
            TokenKind::Read => "'read'",
            TokenKind::Free => "'free'",
            TokenKind::Return => "'return'",
            TokenKind::Exit => "'exit'",
            TokenKind::Print => "'print'",
            TokenKind::Println => "'println'",
            TokenKind::If => "'if'",
            TokenKind::Then => "'then'",
            TokenKind::Else => "'else'",
            TokenKind::Fi => "'fi'",
            TokenKind::While => "'while'",
            TokenKind::Do => "'do'",
            TokenKind::Done => "'done'",
            TokenKind::Newpair => "'newpair'",
            TokenKind::Call => "'call'",
            TokenKind::Fst => "'fst'",
            TokenKind::Snd => "'snd'",
            TokenKind::Int => "'int'",
            TokenKind::Bool => "'bool'",
            TokenKind::Char => "'char'",
            TokenKind::String => "'string'",
            TokenKind::Pair => "'pair'",
            TokenKind::Len => "'len'",
            TokenKind::Ord => "'ord'",
            TokenKind::Chr => "'chr'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Null => "'null'",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Equal => "'='",
            TokenKind::Bang => "'!'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Greater => "'>'",
            TokenKind::GreaterEqual => "'>='",
            TokenKind::Less => "'<'",
            TokenKind::LessEqual => "'<='",
            TokenKind::EqualEqual => "'=='",
            TokenKind::BangEqual => "'!='",
            TokenKind::AmpAmp => "'&&'",
            TokenKind::PipePipe => "'||'",
            TokenKind::Error => "invalid token",
            TokenKind::Eof => "end of input",
        }
    }

    /// Whether this token starts a type.
    pub fn is_type_start(self) -> bool {
        matches!(
            self,
            TokenKind::Int | TokenKind::Bool | TokenKind::Char | TokenKind::String | TokenKind::Pair
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Look up a keyword by its text.
pub fn lookup_keyword(s: &str) -> Option<TokenKind> {
    let kind = match s {
        "begin" => TokenKind::Begin,
        "end" => TokenKind::End,
        "is" => TokenKind::Is,
        "skip" => TokenKind::Skip,
        "read" => TokenKind::Read,
        "free" => TokenKind::Free,
        "return" => TokenKind::Return,
        "exit" => TokenKind::Exit,
        "print" => TokenKind::Print,
        "println" => TokenKind::Println,
        "if" => TokenKind::If,
        "then" => TokenKind::Then,
        "else" => TokenKind::Else,
        "fi" => TokenKind::Fi,
        "while" => TokenKind::While,
        "do" => TokenKind::Do,
        "done" => TokenKind::Done,
        "newpair" => TokenKind::Newpair,
        "call" => TokenKind::Call,
        "fst" => TokenKind::Fst,
        "snd" => TokenKind::Snd,
        "int" => TokenKind::Int,
        "bool" => TokenKind::Bool,
        "char" => TokenKind::Char,
        "string" => TokenKind::String,
        "pair" => TokenKind::Pair,
        "len" => TokenKind::Len,
        "ord" => TokenKind::Ord,
        "chr" => TokenKind::Chr,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_resolve() {
        assert_eq!(lookup_keyword("println"), Some(TokenKind::Println));
        assert_eq!(lookup_keyword("newpair"), Some(TokenKind::Newpair));
        assert_eq!(lookup_keyword("Begin"), None);
        assert_eq!(lookup_keyword("x"), None);
    }

    #[test]
    fn type_starts() {
        assert!(TokenKind::Pair.is_type_start());
        assert!(!TokenKind::Identifier.is_type_start());
    }
}
