//! Typed expressions and assignment sides.

use wacc_core::{BinaryOp, Span, Type, UnaryOp};
use wacc_parser::ast::PairSide;

use crate::scope::{ScopeId, VarId};

/// A validated expression with its resolved type.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
    /// Frame the expression was validated in.
    pub scope: ScopeId,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Int(i32),
    Bool(bool),
    Char(char),
    /// Literal text with escapes as written.
    Str(String),
    Null,
    Var(VarId),
    ArrayElem {
        var: VarId,
        indices: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// A validated assignment target.
#[derive(Debug, Clone, PartialEq)]
pub struct Lhs {
    pub kind: LhsKind,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LhsKind {
    Var(VarId),
    ArrayElem { var: VarId, indices: Vec<Expr> },
    PairElem { side: PairSide, pair: Box<Expr> },
}

/// A validated value source.
#[derive(Debug, Clone, PartialEq)]
pub struct Rhs {
    pub kind: RhsKind,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RhsKind {
    Expr(Expr),
    ArrayLiter(Vec<Expr>),
    NewPair(Box<Expr>, Box<Expr>),
    PairElem { side: PairSide, pair: Box<Expr> },
    Call { name: String, args: Vec<Expr> },
}
