//! Expression parsing using Pratt parsing (precedence climbing).

use bumpalo::collections::Vec as BVec;
use wacc_core::{BinaryOp, ParseError, ParseErrorKind, Span, UnaryOp};

use super::parser::Parser;
use crate::ast::Ident;
use crate::ast::expr::*;
use crate::lexer::{Token, TokenKind, escape_value};

impl<'ast> Parser<'ast> {
    /// Parse an expression with a minimum binding power.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_expr(&mut self, min_bp: u8) -> Result<&'ast Expr<'ast>, ParseError> {
        let mut lhs = self.parse_prefix()?;

        while let Some(op) = binary_op(self.peek().kind) {
            let (l_bp, r_bp) = op.binding_power();
            if l_bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_expr(r_bp)?;
            let span = lhs.span().merge(rhs.span());
            lhs = self.arena.alloc(Expr::Binary(self.arena.alloc(BinaryExpr {
                left: lhs,
                op,
                right: rhs,
                span,
            })));
        }

        Ok(lhs)
    }

    /// Literals, identifiers, array elements, parenthesised and unary
    /// expressions.
    fn parse_prefix(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let token = *self.peek();

        match token.kind {
            TokenKind::IntLiteral => {
                self.advance();
                self.int_literal(token, false, token.span)
            }
            TokenKind::Plus | TokenKind::Minus
                if self.peek_nth(1).kind == TokenKind::IntLiteral =>
            {
                self.advance();
                let digits = self.advance();
                self.int_literal(digits, token.kind == TokenKind::Minus, token.span.merge(digits.span))
            }
            TokenKind::True | TokenKind::False => {
                self.advance();
                Ok(self.literal(LiteralKind::Bool(token.kind == TokenKind::True), token.span))
            }
            TokenKind::Null => {
                self.advance();
                Ok(self.literal(LiteralKind::Null, token.span))
            }
            TokenKind::CharLiteral => {
                self.advance();
                Ok(self.literal(LiteralKind::Char(decode_char(token.lexeme)), token.span))
            }
            TokenKind::StringLiteral => {
                self.advance();
                let raw = &token.lexeme[1..token.lexeme.len() - 1];
                Ok(self.literal(LiteralKind::Str(raw), token.span))
            }
            TokenKind::Identifier => {
                self.advance();
                let ident = Ident::new(token.lexeme, token.span);
                if self.check(TokenKind::LeftBracket) {
                    let elem = self.parse_array_elem(ident)?;
                    Ok(self.arena.alloc(Expr::ArrayElem(elem)))
                } else {
                    Ok(self.arena.alloc(Expr::Ident(ident)))
                }
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expr(0)?;
                self.expect(TokenKind::RightParen)?;
                Ok(inner)
            }
            _ => match unary_op(token.kind) {
                Some(op) => {
                    self.advance();
                    let operand = self.parse_prefix()?;
                    let span = token.span.merge(operand.span());
                    Ok(self.arena.alloc(Expr::Unary(self.arena.alloc(UnaryExpr { op, operand, span }))))
                }
                None => {
                    let mut error = self.unexpected("an expression");
                    if error.kind == ParseErrorKind::ExpectedToken {
                        error.kind = ParseErrorKind::ExpectedExpression;
                    }
                    Err(error)
                }
            },
        }
    }

    /// `ident ('[' expr ']')+`, with the identifier already consumed.
    pub(super) fn parse_array_elem(&mut self, ident: Ident<'ast>) -> Result<&'ast ArrayElem<'ast>, ParseError> {
        let mut indices = BVec::new_in(self.arena);
        let mut end = ident.span;
        while self.eat(TokenKind::LeftBracket).is_some() {
            indices.push(self.parse_expr(0)?);
            end = self.expect(TokenKind::RightBracket)?.span;
        }
        Ok(self.arena.alloc(ArrayElem {
            ident,
            indices: self.alloc_slice(indices),
            span: ident.span.merge(end),
        }))
    }

    fn literal(&self, kind: LiteralKind<'ast>, span: Span) -> &'ast Expr<'ast> {
        self.arena.alloc(Expr::Literal(LiteralExpr { kind, span }))
    }

    /// Range-check an integer literal, with its sign folded in.
    fn int_literal(&self, digits: Token<'ast>, negative: bool, span: Span) -> Result<&'ast Expr<'ast>, ParseError> {
        let magnitude = digits.lexeme.parse::<u64>().ok();
        let value = magnitude.and_then(|m| {
            let signed = if negative { -(m as i128) } else { m as i128 };
            i32::try_from(signed).ok()
        });
        match value {
            Some(value) => Ok(self.literal(LiteralKind::Int(value), span)),
            None => Err(ParseError::new(
                ParseErrorKind::IntegerOutOfRange,
                span,
                format!(
                    "integer literal {}{} is out of range",
                    if negative { "-" } else { "" },
                    digits.lexeme
                ),
            )),
        }
    }
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Greater => BinaryOp::Greater,
        TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
        TokenKind::Less => BinaryOp::Less,
        TokenKind::LessEqual => BinaryOp::LessEqual,
        TokenKind::EqualEqual => BinaryOp::Equal,
        TokenKind::BangEqual => BinaryOp::NotEqual,
        TokenKind::AmpAmp => BinaryOp::And,
        TokenKind::PipePipe => BinaryOp::Or,
        _ => return None,
    };
    Some(op)
}

fn unary_op(kind: TokenKind) -> Option<UnaryOp> {
    let op = match kind {
        TokenKind::Bang => UnaryOp::Not,
        TokenKind::Minus => UnaryOp::Neg,
        TokenKind::Len => UnaryOp::Len,
        TokenKind::Ord => UnaryOp::Ord,
        TokenKind::Chr => UnaryOp::Chr,
        _ => return None,
    };
    Some(op)
}

/// Decode a lexer-validated character literal such as `'a'` or `'\n'`.
fn decode_char(lexeme: &str) -> char {
    let mut chars = lexeme[1..lexeme.len() - 1].chars();
    match (chars.next(), chars.next()) {
        (Some('\\'), Some(c)) => escape_value(c).unwrap_or(c),
        (Some(c), _) => c,
        (None, _) => '\0',
    }
}
