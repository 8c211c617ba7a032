//! Expression validation.
//!
//! Every sub-expression is validated even after a sibling fails; operator
//! typing runs only once all operands are valid.

use wacc_core::{
    CompilationError, Parsed, ParsedExt, Span, Type, collect_all, fail, zip,
};
use wacc_parser::ast::{self as cst, LiteralKind};

use super::AstBuilder;
use crate::ast::{Expr, ExprKind};
use crate::operators::{resolve_binary, resolve_unary};
use crate::scope::{ScopeId, VarId};

impl AstBuilder {
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(crate) fn build_expr(&self, expr: &cst::Expr<'_>, scope: ScopeId) -> Parsed<Expr> {
        let span = expr.span();
        let node = |kind: ExprKind, ty: Type| Expr {
            kind,
            ty,
            scope,
            span,
        };

        match expr {
            cst::Expr::Literal(lit) => Ok(match lit.kind {
                LiteralKind::Int(n) => node(ExprKind::Int(n), Type::Int),
                LiteralKind::Bool(b) => node(ExprKind::Bool(b), Type::Bool),
                LiteralKind::Char(c) => node(ExprKind::Char(c), Type::Char),
                LiteralKind::Str(s) => node(ExprKind::Str(s.to_string()), Type::String),
                LiteralKind::Null => node(ExprKind::Null, Type::AnyPair),
            }),

            cst::Expr::Ident(ident) => {
                let var = self.resolve_var(ident, scope)?;
                Ok(node(ExprKind::Var(var), self.scopes.var(var).ty.clone()))
            }

            cst::Expr::ArrayElem(elem) => {
                let (var, indices, ty) = self.build_array_elem(elem, scope)?;
                Ok(node(ExprKind::ArrayElem { var, indices }, ty))
            }

            cst::Expr::Unary(unary) => {
                let operand = self.build_expr(unary.operand, scope)?;
                let ty = resolve_unary(unary.op, &operand.ty, operand.span)?;
                Ok(node(
                    ExprKind::Unary {
                        op: unary.op,
                        operand: Box::new(operand),
                    },
                    ty,
                ))
            }

            cst::Expr::Binary(binary) => {
                let (left, right) = zip(
                    self.build_expr(binary.left, scope),
                    self.build_expr(binary.right, scope),
                )?;
                let ty = resolve_binary(binary.op, (&left.ty, left.span), (&right.ty, right.span))?;
                Ok(node(
                    ExprKind::Binary {
                        op: binary.op,
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                    ty,
                ))
            }
        }
    }

    /// Look up a variable, reporting `VarNotFound` on a miss.
    pub(crate) fn resolve_var(&self, ident: &cst::Ident<'_>, scope: ScopeId) -> Parsed<VarId> {
        match self.scopes.lookup_var(scope, ident.name) {
            Some(var) => Ok(var),
            None => fail(CompilationError::VarNotFound {
                name: ident.name.to_string(),
                span: ident.span,
            }),
        }
    }

    /// Validate `a[i]...`: the array name and every index are checked
    /// independently, and both kinds of failure are reported.
    pub(crate) fn build_array_elem(
        &self,
        elem: &cst::ArrayElem<'_>,
        scope: ScopeId,
    ) -> Parsed<(VarId, Vec<Expr>, Type)> {
        let indices = collect_all(elem.indices.iter().map(|index| {
            self.build_expr(index, scope)
                .validate(|index| expect_type(&Type::Int, &index.ty, index.span))
        }));
        let (var, indices) = zip(self.resolve_var(&elem.ident, scope), indices)?;

        let mut ty = self.scopes.var(var).ty.clone();
        for index in &indices {
            ty = match ty {
                Type::Array(inner) => *inner,
                other => {
                    return fail(CompilationError::type_error(
                        Type::AnyArray,
                        other,
                        format!("indexing '{}'", elem.ident.name),
                        index.span,
                    ));
                }
            };
        }
        Ok((var, indices, ty))
    }
}

/// An `UnexpectedType` error unless `expected` accepts `actual`.
pub(crate) fn expect_type(expected: &Type, actual: &Type, span: Span) -> Option<CompilationError> {
    (!expected.accepts(actual)).then(|| CompilationError::UnexpectedType {
        expected: expected.clone(),
        actual: actual.clone(),
        span,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeKind;
    use bumpalo::Bump;
    use wacc_parser::Parser;

    fn builder_with(vars: &[(&str, Type)]) -> (AstBuilder, ScopeId) {
        let mut builder = AstBuilder::new();
        let scope = builder.scopes.push(ScopeId::GLOBAL, ScopeKind::Block);
        for (name, ty) in vars {
            builder
                .scopes
                .declare_var(scope, name, ty.clone(), Span::default())
                .unwrap();
        }
        (builder, scope)
    }

    fn build(source: &str, vars: &[(&str, Type)]) -> Parsed<Expr> {
        let arena = Bump::new();
        let expr = Parser::expression(source, &arena).unwrap();
        let (builder, scope) = builder_with(vars);
        builder.build_expr(expr, scope)
    }

    #[test]
    fn literals_have_intrinsic_types() {
        assert_eq!(build("1", &[]).unwrap().ty, Type::Int);
        assert_eq!(build("'a'", &[]).unwrap().ty, Type::Char);
        assert_eq!(build("\"s\"", &[]).unwrap().ty, Type::String);
        assert_eq!(build("null", &[]).unwrap().ty, Type::AnyPair);
    }

    #[test]
    fn undeclared_identifier() {
        let errors = build("x", &[]).unwrap_err();
        assert!(matches!(&errors[..], [CompilationError::VarNotFound { name, .. }] if name == "x"));
    }

    #[test]
    fn operand_errors_suppress_operator_errors() {
        // Both operands are unknown; `&&` would also reject them, but only
        // the two lookups are reported.
        let errors = build("a && b", &[]).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(e, CompilationError::VarNotFound { .. })));
    }

    #[test]
    fn operator_errors_after_valid_operands() {
        let errors = build("x + true", &[("x", Type::Int)]).unwrap_err();
        assert!(matches!(&errors[..], [CompilationError::TypeError { actual: Type::Bool, .. }]));
    }

    #[test]
    fn array_elem_reports_missing_array_and_bad_index() {
        let errors = build("a[y]", &[]).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(&errors[0], CompilationError::VarNotFound { name, .. } if name == "a"));
        assert!(matches!(&errors[1], CompilationError::VarNotFound { name, .. } if name == "y"));
    }

    #[test]
    fn array_elem_types() {
        let grid = Type::array_of(Type::array_of(Type::Char));
        assert_eq!(build("g[0]", &[("g", grid.clone())]).unwrap().ty, Type::array_of(Type::Char));
        assert_eq!(build("g[0][1]", &[("g", grid.clone())]).unwrap().ty, Type::Char);
        assert!(build("g[0][1][2]", &[("g", grid.clone())]).is_err());
        assert!(build("g['c']", &[("g", grid)]).is_err());
    }

    #[test]
    fn nested_operators() {
        let expr = build("len xs * 2 > ord c", &[("xs", Type::array_of(Type::Int)), ("c", Type::Char)]).unwrap();
        assert_eq!(expr.ty, Type::Bool);
    }
}
