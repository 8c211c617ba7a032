//! Typed statements.

use wacc_core::Span;

use crate::ast::expr::{Expr, Lhs, Rhs};
use crate::scope::{ScopeId, VarId};

/// A validated statement.
///
/// Bodies of `if`, `while` and `begin ... end` are validated in their own
/// child frame, which is the `scope` of the body statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub scope: ScopeId,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Skip,
    Decl { var: VarId, rhs: Rhs },
    Assign { lhs: Lhs, rhs: Rhs },
    Read(Lhs),
    Free(Expr),
    Return(Expr),
    Exit(Expr),
    Print(Expr),
    Println(Expr),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Box<Stmt>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    Block(Box<Stmt>),
    Seq(Vec<Stmt>),
}
