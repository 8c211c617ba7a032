//! Assignment targets and value sources.

use wacc_core::{CompilationError, Parsed, ParsedExt, Type, TypeSet, collect_all, fail, zip};
use wacc_parser::ast::{self as cst, PairSide};

use super::AstBuilder;
use super::expr::expect_type;
use crate::ast::{Expr, Lhs, LhsKind, Rhs, RhsKind};
use crate::scope::ScopeId;

impl AstBuilder {
    pub(crate) fn build_lhs(&self, lhs: &cst::AssignLhs<'_>, scope: ScopeId) -> Parsed<Lhs> {
        let span = lhs.span();
        match lhs {
            cst::AssignLhs::Ident(ident) => {
                let var = self.resolve_var(ident, scope)?;
                Ok(Lhs {
                    kind: LhsKind::Var(var),
                    ty: self.scopes.var(var).ty.clone(),
                    span,
                })
            }
            cst::AssignLhs::ArrayElem(elem) => {
                let (var, indices, ty) = self.build_array_elem(elem, scope)?;
                Ok(Lhs {
                    kind: LhsKind::ArrayElem { var, indices },
                    ty,
                    span,
                })
            }
            cst::AssignLhs::PairElem(elem) => {
                let (side, pair, ty) = self.build_pair_elem(elem, scope)?;
                Ok(Lhs {
                    kind: LhsKind::PairElem {
                        side,
                        pair: Box::new(pair),
                    },
                    ty,
                    span,
                })
            }
        }
    }

    pub(crate) fn build_rhs(&self, rhs: &cst::AssignRhs<'_>, scope: ScopeId) -> Parsed<Rhs> {
        let span = rhs.span();
        let node = |kind: RhsKind, ty: Type| Rhs { kind, ty, span };

        match rhs {
            cst::AssignRhs::Expr(expr) => {
                let expr = self.build_expr(expr, scope)?;
                let ty = expr.ty.clone();
                Ok(node(RhsKind::Expr(expr), ty))
            }

            cst::AssignRhs::ArrayLiter(liter) => {
                let elems = collect_all(liter.elems.iter().map(|e| self.build_expr(e, scope)))?;
                let ty = match array_elem_type(&elems)? {
                    Some(elem) => Type::array_of(elem),
                    None => Type::AnyArray,
                };
                Ok(node(RhsKind::ArrayLiter(elems), ty))
            }

            cst::AssignRhs::NewPair(pair) => {
                let (fst, snd) = zip(self.build_expr(pair.fst, scope), self.build_expr(pair.snd, scope))?;
                let ty = Type::pair_of(fst.ty.clone(), snd.ty.clone());
                Ok(node(RhsKind::NewPair(Box::new(fst), Box::new(snd)), ty))
            }

            cst::AssignRhs::PairElem(elem) => {
                let (side, pair, ty) = self.build_pair_elem(elem, scope)?;
                Ok(node(
                    RhsKind::PairElem {
                        side,
                        pair: Box::new(pair),
                    },
                    ty,
                ))
            }

            cst::AssignRhs::Call(call) => {
                let (returns, args) = self.build_call(call, scope)?;
                Ok(node(
                    RhsKind::Call {
                        name: call.ident.name.to_string(),
                        args,
                    },
                    returns,
                ))
            }
        }
    }

    /// `fst e` / `snd e`. The pair must have a known type for the element
    /// type to be known.
    pub(crate) fn build_pair_elem(
        &self,
        elem: &cst::PairElem<'_>,
        scope: ScopeId,
    ) -> Parsed<(PairSide, Expr, Type)> {
        let pair = self.build_expr(elem.expr, scope)?;
        let ty = match (&pair.ty, elem.side) {
            (Type::Pair(fst, _), PairSide::Fst) => (**fst).clone(),
            (Type::Pair(_, snd), PairSide::Snd) => (**snd).clone(),
            (Type::AnyPair, side) => {
                return fail(CompilationError::type_error(
                    Type::AnyPair,
                    Type::AnyPair,
                    format!("{} of a pair with unknown element types", side.as_str()),
                    pair.span,
                ));
            }
            (other, side) => {
                return fail(CompilationError::type_error(
                    Type::AnyPair,
                    other.clone(),
                    side.as_str(),
                    pair.span,
                ));
            }
        };
        Ok((elem.side, pair, ty))
    }

    /// Every argument is built whether or not the function exists.
    fn build_call(&self, call: &cst::CallExpr<'_>, scope: ScopeId) -> Parsed<(Type, Vec<Expr>)> {
        let name = call.ident.name;
        let func = match self.scopes.lookup_func(name) {
            Some(func) => Ok(func),
            None => fail(CompilationError::FuncNotFound {
                name: name.to_string(),
                span: call.ident.span,
            }),
        };
        let args = collect_all(call.args.iter().map(|arg| self.build_expr(arg, scope)));
        let (func, args) = zip(func, args)?;

        if func.params().len() != args.len() {
            return fail(CompilationError::ArgumentCount {
                name: name.to_string(),
                expected: func.params().len(),
                actual: args.len(),
                span: call.span,
            });
        }

        let mismatches: Vec<_> = func
            .params()
            .iter()
            .zip(&args)
            .filter_map(|(param, arg)| expect_type(param, &arg.ty, arg.span))
            .collect();
        Ok((func.returns().clone(), args)).also(mismatches)
    }
}

/// The one type every element shares, or `None` for an empty literal.
fn array_elem_type(elems: &[Expr]) -> Parsed<Option<Type>> {
    let Some((first, rest)) = elems.split_first() else {
        return Ok(None);
    };
    let mut ty = first.ty.clone();
    for elem in rest {
        ty = match ty.unify(&elem.ty) {
            Some(ty) => ty,
            None => {
                return fail(CompilationError::UnexpectedType {
                    expected: ty,
                    actual: elem.ty.clone(),
                    span: elem.span,
                });
            }
        };
    }
    Ok(Some(ty))
}

/// An assignment whose sides are both unresolved pair elements has no
/// type to check or to size the copy by.
pub(crate) fn check_inferable(lhs: &Lhs, rhs: &Rhs) -> Option<CompilationError> {
    let untyped = !lhs.ty.is_concrete() && !rhs.ty.is_concrete();
    (untyped && matches!(rhs.kind, RhsKind::PairElem { .. })).then(|| {
        CompilationError::type_error(
            TypeSet(vec![]),
            rhs.ty.clone(),
            "cannot infer the type of the assignment",
            rhs.span,
        )
    })
}
