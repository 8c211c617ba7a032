//! Statement nodes, including the left- and right-hand sides of assignments.

use wacc_core::Span;

use crate::ast::Ident;
use crate::ast::expr::{ArrayElem, Expr};
use crate::ast::types::TypeExpr;

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    Skip(Span),
    /// `T x = rhs`
    Decl(&'ast DeclStmt<'ast>),
    /// `lhs = rhs`
    Assign(&'ast AssignStmt<'ast>),
    Read(ReadStmt<'ast>),
    Free(ExprStmt<'ast>),
    Return(ExprStmt<'ast>),
    Exit(ExprStmt<'ast>),
    Print(ExprStmt<'ast>),
    Println(ExprStmt<'ast>),
    If(&'ast IfStmt<'ast>),
    While(&'ast WhileStmt<'ast>),
    /// `begin s end`
    Block(&'ast BlockStmt<'ast>),
    /// `s1 ; s2 ; ...`, always two or more statements.
    Seq(SeqStmt<'ast>),
}

impl<'ast> Stmt<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Self::Skip(span) => *span,
            Self::Decl(s) => s.span,
            Self::Assign(s) => s.span,
            Self::Read(s) => s.span,
            Self::Free(s) | Self::Return(s) | Self::Exit(s) | Self::Print(s) | Self::Println(s) => {
                s.span
            }
            Self::If(s) => s.span,
            Self::While(s) => s.span,
            Self::Block(s) => s.span,
            Self::Seq(s) => s.span,
        }
    }

    /// Whether control can never fall off the end of this statement.
    ///
    /// A statement terminates if it is `return`/`exit`, or ends in one on
    /// every path.
    pub fn always_terminates(&self) -> bool {
        match self {
            Self::Return(_) | Self::Exit(_) => true,
            Self::If(s) => s.then_branch.always_terminates() && s.else_branch.always_terminates(),
            Self::Block(s) => s.body.always_terminates(),
            Self::Seq(s) => s.stmts.last().is_some_and(Stmt::always_terminates),
            _ => false,
        }
    }
}

/// A statement that is a keyword applied to one expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprStmt<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeclStmt<'ast> {
    pub ty: TypeExpr<'ast>,
    pub ident: Ident<'ast>,
    pub rhs: AssignRhs<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignStmt<'ast> {
    pub lhs: AssignLhs<'ast>,
    pub rhs: AssignRhs<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadStmt<'ast> {
    pub lhs: AssignLhs<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    pub cond: &'ast Expr<'ast>,
    pub then_branch: Stmt<'ast>,
    pub else_branch: Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    pub cond: &'ast Expr<'ast>,
    pub body: Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockStmt<'ast> {
    pub body: Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeqStmt<'ast> {
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}

// ============================================================================
// Assignment targets and sources
// ============================================================================

/// Which half of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairSide {
    Fst,
    Snd,
}

impl PairSide {
    pub fn as_str(self) -> &'static str {
        match self {
            PairSide::Fst => "fst",
            PairSide::Snd => "snd",
        }
    }
}

/// `fst e` / `snd e`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairElem<'ast> {
    pub side: PairSide,
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}

/// Something that can be assigned to or read into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssignLhs<'ast> {
    Ident(Ident<'ast>),
    ArrayElem(&'ast ArrayElem<'ast>),
    PairElem(&'ast PairElem<'ast>),
}

impl<'ast> AssignLhs<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Self::Ident(i) => i.span,
            Self::ArrayElem(a) => a.span,
            Self::PairElem(p) => p.span,
        }
    }
}

/// `[a, b, c]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayLiter<'ast> {
    pub elems: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}

/// `newpair(a, b)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewPair<'ast> {
    pub fst: &'ast Expr<'ast>,
    pub snd: &'ast Expr<'ast>,
    pub span: Span,
}

/// `call f(args)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    pub ident: Ident<'ast>,
    pub args: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}

/// The value side of a declaration or assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssignRhs<'ast> {
    Expr(&'ast Expr<'ast>),
    ArrayLiter(ArrayLiter<'ast>),
    NewPair(&'ast NewPair<'ast>),
    PairElem(&'ast PairElem<'ast>),
    Call(&'ast CallExpr<'ast>),
}

impl<'ast> AssignRhs<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Self::Expr(e) => e.span(),
            Self::ArrayLiter(a) => a.span,
            Self::NewPair(n) => n.span,
            Self::PairElem(p) => p.span,
            Self::Call(c) => c.span,
        }
    }
}
