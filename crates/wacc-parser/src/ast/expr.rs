//! Expression nodes.
//!
//! # Expression Precedence
//!
//! Loosest first, all binary levels left-associative:
//! 1. `||`
//! 2. `&&`
//! 3. `==` `!=`
//! 4. `<` `<=` `>` `>=`
//! 5. `+` `-`
//! 6. `*` `/` `%`
//! 7. Prefix unary (`!`, `-`, `len`, `ord`, `chr`)
//!
//! Parentheses only group; they leave no node behind.

use wacc_core::{BinaryOp, Span, UnaryOp};

use crate::ast::Ident;

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    Literal(LiteralExpr<'ast>),
    Ident(Ident<'ast>),
    /// `a[i][j]`
    ArrayElem(&'ast ArrayElem<'ast>),
    Unary(&'ast UnaryExpr<'ast>),
    Binary(&'ast BinaryExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.span,
            Self::ArrayElem(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Binary(e) => e.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    pub kind: LiteralKind<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'ast> {
    /// Already range-checked, sign folded in.
    Int(i32),
    Bool(bool),
    /// Escape sequences already decoded.
    Char(char),
    /// Text between the quotes, escapes kept as written.
    Str(&'ast str),
    /// The `null` pair literal.
    Null,
}

/// Indexing of a named array, one or more dimensions deep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayElem<'ast> {
    pub ident: Ident<'ast>,
    pub indices: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub op: UnaryOp,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub left: &'ast Expr<'ast>,
    pub op: BinaryOp,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
}
