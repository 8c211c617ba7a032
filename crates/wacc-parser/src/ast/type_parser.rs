//! Type parsing.
//!
//! ```text
//! type           ::= base-type | type '[' ']' | pair-type
//! pair-type      ::= 'pair' '(' pair-elem-type ',' pair-elem-type ')'
//! pair-elem-type ::= base-type | type '[' ']' | 'pair'
//! ```

use wacc_core::{ParseError, ParseErrorKind};

use super::parser::Parser;
use crate::ast::types::{BaseType, PairElemType, TypeExpr};
use crate::lexer::TokenKind;

impl<'ast> Parser<'ast> {
    /// Parse a complete type, including any `[]` suffixes.
    pub fn parse_type(&mut self) -> Result<TypeExpr<'ast>, ParseError> {
        let token = *self.peek();
        let base = match token.kind {
            TokenKind::Pair => self.parse_pair_type()?,
            _ => {
                let base = self.parse_base_type()?;
                TypeExpr::Base(base, token.span)
            }
        };
        Ok(self.parse_array_suffixes(base))
    }

    fn parse_base_type(&mut self) -> Result<BaseType, ParseError> {
        let base = match self.peek().kind {
            TokenKind::Int => BaseType::Int,
            TokenKind::Bool => BaseType::Bool,
            TokenKind::Char => BaseType::Char,
            TokenKind::String => BaseType::String,
            _ => {
                let mut error = self.unexpected("a type");
                error.kind = ParseErrorKind::ExpectedType;
                return Err(error);
            }
        };
        self.advance();
        Ok(base)
    }

    fn parse_pair_type(&mut self) -> Result<TypeExpr<'ast>, ParseError> {
        let start = self.expect(TokenKind::Pair)?.span;
        self.expect(TokenKind::LeftParen)?;
        let fst = self.parse_pair_elem_type()?;
        self.expect(TokenKind::Comma)?;
        let snd = self.parse_pair_elem_type()?;
        let end = self.expect(TokenKind::RightParen)?.span;
        Ok(TypeExpr::Pair(fst, snd, start.merge(end)))
    }

    /// A bare `pair` is allowed here, unless it is followed by `(` or `[`.
    fn parse_pair_elem_type(&mut self) -> Result<PairElemType<'ast>, ParseError> {
        if self.check(TokenKind::Pair) && self.peek_nth(1).kind != TokenKind::LeftParen {
            let span = self.advance().span;
            if self.check(TokenKind::LeftBracket) {
                // `pair[]` names an array of pairs, which needs a full pair type.
                return Err(self.unexpected("',' or ')'"));
            }
            return Ok(PairElemType::Pair(span));
        }
        let ty = self.parse_type()?;
        if matches!(ty, TypeExpr::Pair(..)) {
            let mut error = self.unexpected("'[' after a nested pair type");
            error.kind = ParseErrorKind::ExpectedType;
            return Err(error);
        }
        Ok(PairElemType::Type(self.arena.alloc(ty)))
    }

    fn parse_array_suffixes(&mut self, mut ty: TypeExpr<'ast>) -> TypeExpr<'ast> {
        while self.check(TokenKind::LeftBracket) && self.peek_nth(1).kind == TokenKind::RightBracket {
            self.advance();
            let end = self.advance().span;
            let span = ty.span().merge(end);
            ty = TypeExpr::Array(self.arena.alloc(ty), span);
        }
        ty
    }

    /// Number of tokens a type starting `offset` tokens ahead would occupy,
    /// or `None` if no type starts there. Used for lookahead only.
    pub(super) fn type_len(&self, offset: usize) -> Option<usize> {
        let mut n = offset;
        match self.peek_nth(n).kind {
            TokenKind::Int | TokenKind::Bool | TokenKind::Char | TokenKind::String => n += 1,
            TokenKind::Pair => {
                n += 1;
                if self.peek_nth(n).kind != TokenKind::LeftParen {
                    return None;
                }
                let mut depth = 0usize;
                loop {
                    match self.peek_nth(n).kind {
                        TokenKind::LeftParen => depth += 1,
                        TokenKind::RightParen => {
                            depth -= 1;
                            if depth == 0 {
                                n += 1;
                                break;
                            }
                        }
                        TokenKind::Eof => return None,
                        _ => {}
                    }
                    n += 1;
                }
            }
            _ => return None,
        }
        while self.peek_nth(n).kind == TokenKind::LeftBracket
            && self.peek_nth(n + 1).kind == TokenKind::RightBracket
        {
            n += 2;
        }
        Some(n - offset)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Parser, Stmt, TypeExpr};
    use bumpalo::Bump;

    fn decl_type(source: &str) -> String {
        let arena = Bump::new();
        match Parser::statement(source, &arena).unwrap() {
            Stmt::Decl(decl) => decl.ty.to_string(),
            other => panic!("expected declaration, got {other:?}"),
        }
    }

    #[test]
    fn base_and_array_types() {
        assert_eq!(decl_type("int x = 1"), "int");
        assert_eq!(decl_type("char[][] x = []"), "char[][]");
    }

    #[test]
    fn pair_types() {
        assert_eq!(decl_type("pair(int, char[]) p = null"), "pair(int, char[])");
        assert_eq!(decl_type("pair(pair, pair) p = null"), "pair(pair, pair)");
        assert_eq!(decl_type("pair(int, bool)[] ps = []"), "pair(int, bool)[]");
    }

    #[test]
    fn nested_full_pair_type_is_rejected() {
        let arena = Bump::new();
        assert!(Parser::statement("pair(pair(int, int), int) p = null", &arena).is_err());
    }

    #[test]
    fn array_type_spans_cover_brackets() {
        let arena = Bump::new();
        let Stmt::Decl(decl) = Parser::statement("int[] a = []", &arena).unwrap() else {
            panic!("expected declaration");
        };
        assert!(matches!(decl.ty, TypeExpr::Array(..)));
        assert_eq!(decl.ty.span().len, 5);
    }
}
