//! The validated, typed AST.
//!
//! A node only exists if it passed every semantic check; invalid input
//! produces errors instead of nodes. Nodes refer to scope frames and
//! variables by id, so the [`ScopeArena`] travels with the [`Prog`].

mod expr;
mod stmt;

pub use expr::*;
pub use stmt::*;

use wacc_core::Span;

use crate::scope::{FuncIdent, ScopeArena, ScopeId, VarId};

/// A whole validated program.
#[derive(Debug)]
pub struct Prog {
    pub funcs: Vec<Func>,
    pub body: Stmt,
    pub scopes: ScopeArena,
}

impl Prog {
    /// The frame of the main program body.
    pub fn main_scope(&self) -> ScopeId {
        self.body.scope
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Func {
    pub ident: FuncIdent,
    pub params: Vec<Param>,
    pub body: Stmt,
    /// Frame holding the parameters and top-level locals.
    pub scope: ScopeId,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub var: VarId,
}
