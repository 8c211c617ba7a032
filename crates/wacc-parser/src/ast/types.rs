//! Type expressions as written in source.

use std::fmt;

use wacc_core::Span;

/// The four base types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Int,
    Bool,
    Char,
    String,
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BaseType::Int => "int",
            BaseType::Bool => "bool",
            BaseType::Char => "char",
            BaseType::String => "string",
        })
    }
}

/// A type annotation: `int`, `char[][]`, `pair(int, pair)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeExpr<'ast> {
    Base(BaseType, Span),
    /// `T[]`
    Array(&'ast TypeExpr<'ast>, Span),
    /// `pair(A, B)`
    Pair(PairElemType<'ast>, PairElemType<'ast>, Span),
}

impl<'ast> TypeExpr<'ast> {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Base(_, span) | TypeExpr::Array(_, span) | TypeExpr::Pair(_, _, span) => *span,
        }
    }
}

impl fmt::Display for TypeExpr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Base(base, _) => write!(f, "{base}"),
            TypeExpr::Array(elem, _) => write!(f, "{elem}[]"),
            TypeExpr::Pair(fst, snd, _) => write!(f, "pair({fst}, {snd})"),
        }
    }
}

/// A pair element type. Nested pairs are written as a bare `pair`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairElemType<'ast> {
    /// A base or array type.
    Type(&'ast TypeExpr<'ast>),
    /// The bare `pair` keyword.
    Pair(Span),
}

impl fmt::Display for PairElemType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairElemType::Type(ty) => write!(f, "{ty}"),
            PairElemType::Pair(_) => f.write_str("pair"),
        }
    }
}
