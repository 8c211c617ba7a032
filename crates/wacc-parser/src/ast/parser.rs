//! Core parser state and top-level entry points.
//!
//! The whole source is lexed up front into a token buffer; the parser walks
//! it with arbitrary lookahead. Statement, expression and type parsing live
//! in sibling modules as further `impl Parser` blocks.

use bumpalo::Bump;
use bumpalo::collections::Vec as BVec;
use wacc_core::{ParseError, ParseErrorKind, ParseErrors, Span};

use crate::ast::{Expr, FuncDecl, Ident, ParamDecl, Program, Stmt};
use crate::lexer::{Lexer, Token, TokenKind};

/// Recursive-descent parser for WACC.
pub struct Parser<'ast> {
    pub(super) arena: &'ast Bump,
    pub(super) buffer: Vec<Token<'ast>>,
    pub(super) position: usize,
}

impl<'ast> Parser<'ast> {
    fn new(source: &str, arena: &'ast Bump) -> (Self, Vec<ParseError>) {
        let mut lexer = Lexer::new(source, arena);
        let mut buffer = Vec::new();
        loop {
            let token = lexer.next_token();
            buffer.push(token);
            if token.kind == TokenKind::Eof {
                break;
            }
        }
        let errors = lexer.take_errors();
        (
            Self {
                arena,
                buffer,
                position: 0,
            },
            errors,
        )
    }

    /// Parse a complete program.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse(source: &str, arena: &'ast Bump) -> Result<Program<'ast>, ParseErrors> {
        let (mut parser, lex_errors) = Self::new(source, arena);
        let result = parser.parse_program();
        Self::finish(result, lex_errors)
    }

    /// Parse a single expression, for tools and tests.
    pub fn expression(source: &str, arena: &'ast Bump) -> Result<&'ast Expr<'ast>, ParseErrors> {
        let (mut parser, lex_errors) = Self::new(source, arena);
        let result = parser.parse_expr(0).and_then(|expr| {
            parser.expect(TokenKind::Eof)?;
            Ok(expr)
        });
        Self::finish(result, lex_errors)
    }

    /// Parse a statement (or `;`-separated sequence), for tools and tests.
    pub fn statement(source: &str, arena: &'ast Bump) -> Result<Stmt<'ast>, ParseErrors> {
        let (mut parser, lex_errors) = Self::new(source, arena);
        let result = parser.parse_stmt_seq().and_then(|stmt| {
            parser.expect(TokenKind::Eof)?;
            Ok(stmt)
        });
        Self::finish(result, lex_errors)
    }

    /// Merge lexer errors with the parser's own result.
    ///
    /// A parse error raised at an error token repeats a lexer error and is
    /// dropped.
    fn finish<T>(result: Result<T, ParseError>, lex_errors: Vec<ParseError>) -> Result<T, ParseErrors> {
        let mut errors = ParseErrors::from(lex_errors);
        match result {
            Ok(value) if errors.is_empty() => Ok(value),
            Ok(_) => Err(errors),
            Err(error) => {
                if !errors.iter().any(|e| e.span == error.span) {
                    errors.push(error);
                }
                Err(errors)
            }
        }
    }

    // =========================================
    // Token helpers
    // =========================================

    pub(super) fn peek(&self) -> &Token<'ast> {
        self.peek_nth(0)
    }

    pub(super) fn peek_nth(&self, n: usize) -> &Token<'ast> {
        let last = self.buffer.len() - 1;
        &self.buffer[(self.position + n).min(last)]
    }

    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(super) fn advance(&mut self) -> Token<'ast> {
        let token = *self.peek();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    /// Consume the current token if it has the given kind.
    pub(super) fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub(super) fn expect(&mut self, kind: TokenKind) -> Result<Token<'ast>, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.description()))
        }
    }

    pub(super) fn expect_ident(&mut self) -> Result<Ident<'ast>, ParseError> {
        let token = self.expect(TokenKind::Identifier)?;
        Ok(Ident::new(token.lexeme, token.span))
    }

    /// An error describing the current token as not what was wanted.
    pub(super) fn unexpected(&self, wanted: &str) -> ParseError {
        let token = self.peek();
        let kind = match token.kind {
            TokenKind::Eof => ParseErrorKind::UnexpectedEof,
            _ => ParseErrorKind::ExpectedToken,
        };
        let found = match token.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", token.lexeme),
        };
        ParseError::new(kind, token.span, format!("expected {wanted}, found {found}"))
    }

    /// Span of the most recently consumed token.
    pub(super) fn previous_span(&self) -> Span {
        self.position
            .checked_sub(1)
            .map(|i| self.buffer[i].span)
            .unwrap_or_default()
    }

    pub(super) fn alloc_slice<T: Copy>(&self, items: BVec<'ast, T>) -> &'ast [T] {
        items.into_bump_slice()
    }

    // =========================================
    // Program structure
    // =========================================

    /// `begin func* stat end`
    fn parse_program(&mut self) -> Result<Program<'ast>, ParseError> {
        let start = self.expect(TokenKind::Begin)?.span;

        let mut funcs = BVec::new_in(self.arena);
        while self.is_func_start() {
            funcs.push(self.parse_func()?);
        }

        let body = self.parse_stmt_seq()?;
        let end = self.expect(TokenKind::End)?.span;

        if !self.check(TokenKind::Eof) {
            let token = self.peek();
            return Err(ParseError::new(
                ParseErrorKind::TrailingInput,
                token.span,
                format!("unexpected '{}' after end of program", token.lexeme),
            ));
        }

        Ok(Program {
            funcs: self.alloc_slice(funcs),
            body,
            span: start.merge(end),
        })
    }

    /// Whether the upcoming tokens are `type ident (`.
    fn is_func_start(&self) -> bool {
        match self.type_len(0) {
            Some(n) => {
                self.peek_nth(n).kind == TokenKind::Identifier
                    && self.peek_nth(n + 1).kind == TokenKind::LeftParen
            }
            None => false,
        }
    }

    /// `type ident '(' params? ')' 'is' stat 'end'`
    fn parse_func(&mut self) -> Result<FuncDecl<'ast>, ParseError> {
        let return_type = self.parse_type()?;
        let ident = self.expect_ident()?;
        self.expect(TokenKind::LeftParen)?;

        let mut params = BVec::new_in(self.arena);
        if !self.check(TokenKind::RightParen) {
            params.push(self.parse_param()?);
            while self.eat(TokenKind::Comma).is_some() {
                params.push(self.parse_param()?);
            }
        }
        self.expect(TokenKind::RightParen)?;
        self.expect(TokenKind::Is)?;

        let body = self.parse_stmt_seq()?;
        if !body.always_terminates() {
            return Err(ParseError::new(
                ParseErrorKind::MissingReturn,
                ident.span,
                format!("function '{}' does not end with a return or exit statement", ident.name),
            ));
        }
        let end = self.expect(TokenKind::End)?.span;

        Ok(FuncDecl {
            return_type,
            ident,
            params: self.alloc_slice(params),
            body,
            span: return_type.span().merge(end),
        })
    }

    fn parse_param(&mut self) -> Result<ParamDecl<'ast>, ParseError> {
        let ty = self.parse_type()?;
        let ident = self.expect_ident()?;
        Ok(ParamDecl {
            ty,
            ident,
            span: ty.span().merge(ident.span),
        })
    }
}
