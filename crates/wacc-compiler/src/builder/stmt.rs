//! Statement validation.

use wacc_core::{CompilationError, Parsed, ParsedExt, Type, TypeSet, collect_all, fail, zip, zip3};
use wacc_parser::ast as cst;

use super::AstBuilder;
use super::assign::check_inferable;
use super::expr::expect_type;
use crate::ast::{Expr, Stmt, StmtKind};
use crate::scope::{ScopeId, ScopeKind};
use crate::type_resolver;

impl AstBuilder {
    /// Validate `stmt` in `scope`. Declarations are entered into `scope`;
    /// nested bodies get child frames of their own.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(crate) fn build_stmt(&mut self, stmt: &cst::Stmt<'_>, scope: ScopeId) -> Parsed<Stmt> {
        let span = stmt.span();
        let kind = match stmt {
            cst::Stmt::Skip(_) => StmtKind::Skip,

            cst::Stmt::Decl(decl) => {
                let ty = type_resolver::resolve(&decl.ty);
                // The initializer cannot see the name it initializes.
                let rhs = self.build_rhs(&decl.rhs, scope);
                let var = self
                    .scopes
                    .declare_var(scope, decl.ident.name, ty.clone(), decl.ident.span)
                    .map_err(|e| vec![e]);
                let (var, rhs) = zip(var, rhs).validate(|(_, rhs)| expect_type(&ty, &rhs.ty, rhs.span))?;
                StmtKind::Decl { var, rhs }
            }

            cst::Stmt::Assign(assign) => {
                let (lhs, rhs) = zip(self.build_lhs(&assign.lhs, scope), self.build_rhs(&assign.rhs, scope))
                    .validate(|(lhs, rhs)| check_inferable(lhs, rhs))
                    .validate(|(lhs, rhs)| expect_type(&lhs.ty, &rhs.ty, rhs.span))?;
                StmtKind::Assign { lhs, rhs }
            }

            cst::Stmt::Read(read) => {
                let lhs = self.build_lhs(&read.lhs, scope).validate(|lhs| {
                    (!matches!(lhs.ty, Type::Int | Type::Char)).then(|| {
                        CompilationError::type_error(
                            TypeSet(vec![Type::Int, Type::Char]),
                            lhs.ty.clone(),
                            "read",
                            lhs.span,
                        )
                    })
                })?;
                StmtKind::Read(lhs)
            }

            cst::Stmt::Free(free) => {
                let expr = self.build_expr(free.expr, scope).validate(|expr| {
                    (!expr.ty.is_array() && !expr.ty.is_pair()).then(|| {
                        CompilationError::type_error(
                            TypeSet(vec![Type::AnyArray, Type::AnyPair]),
                            expr.ty.clone(),
                            "free",
                            expr.span,
                        )
                    })
                })?;
                StmtKind::Free(expr)
            }

            cst::Stmt::Return(ret) => {
                let expr = self.build_expr(ret.expr, scope);
                let expr = match &self.returns {
                    Some(returns) => expr.validate(|e| expect_type(returns, &e.ty, e.span)),
                    None => zip(fail::<()>(CompilationError::ReturnOutsideFunction { span }), expr)
                        .map(|(_, expr)| expr),
                }?;
                StmtKind::Return(expr)
            }

            cst::Stmt::Exit(exit) => {
                let expr = self.build_expr(exit.expr, scope).validate(|e| expect_type(&Type::Int, &e.ty, e.span))?;
                StmtKind::Exit(expr)
            }

            cst::Stmt::Print(print) => StmtKind::Print(self.build_expr(print.expr, scope)?),
            cst::Stmt::Println(print) => StmtKind::Println(self.build_expr(print.expr, scope)?),

            cst::Stmt::If(if_stmt) => {
                let cond = self.build_condition(if_stmt.cond, scope);
                let then_branch = self.build_nested(&if_stmt.then_branch, scope);
                let else_branch = self.build_nested(&if_stmt.else_branch, scope);
                let (cond, then_branch, else_branch) = zip3(cond, then_branch, else_branch)?;
                StmtKind::If {
                    cond,
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(else_branch),
                }
            }

            cst::Stmt::While(while_stmt) => {
                let cond = self.build_condition(while_stmt.cond, scope);
                let body = self.build_nested(&while_stmt.body, scope);
                let (cond, body) = zip(cond, body)?;
                StmtKind::While {
                    cond,
                    body: Box::new(body),
                }
            }

            cst::Stmt::Block(block) => StmtKind::Block(Box::new(self.build_nested(&block.body, scope)?)),

            cst::Stmt::Seq(seq) => {
                StmtKind::Seq(collect_all(seq.stmts.iter().map(|s| self.build_stmt(s, scope)))?)
            }
        };

        Ok(Stmt { kind, scope, span })
    }

    fn build_condition(&self, cond: &cst::Expr<'_>, scope: ScopeId) -> Parsed<Expr> {
        self.build_expr(cond, scope)
            .validate(|e| expect_type(&Type::Bool, &e.ty, e.span))
    }

    /// Build a body in a fresh child frame of `parent`.
    fn build_nested(&mut self, body: &cst::Stmt<'_>, parent: ScopeId) -> Parsed<Stmt> {
        let scope = self.scopes.push(parent, ScopeKind::Block);
        self.build_stmt(body, scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use wacc_core::Span;
    use wacc_parser::Parser;

    fn build(source: &str) -> Parsed<Stmt> {
        let arena = Bump::new();
        let stmt = Parser::statement(source, &arena).unwrap();
        let mut builder = AstBuilder::new();
        let scope = builder.scopes.push(ScopeId::GLOBAL, ScopeKind::Block);
        builder.build_stmt(&stmt, scope)
    }

    #[test]
    fn every_independent_error_is_reported() {
        let errors = build("print a; print b; print c").unwrap_err();
        let names: Vec<_> = errors
            .iter()
            .map(|e| match e {
                CompilationError::VarNotFound { name, .. } => name.as_str(),
                other => panic!("unexpected error {other}"),
            })
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn declaration_survives_bad_initializer() {
        // `x` is still declared, so the later use does not cascade.
        let errors = build("int x = y; println x").unwrap_err();
        assert!(matches!(&errors[..], [CompilationError::VarNotFound { name, .. }] if name == "y"));
    }

    #[test]
    fn initializer_cannot_see_its_own_name() {
        let errors = build("int x = x").unwrap_err();
        assert!(matches!(&errors[..], [CompilationError::VarNotFound { .. }]));
    }

    #[test]
    fn declaration_type_mismatch() {
        let errors = build("bool b = 5").unwrap_err();
        assert!(matches!(
            &errors[..],
            [CompilationError::UnexpectedType { expected: Type::Bool, actual: Type::Int, .. }]
        ));
        assert!(build("string s = ['a', 'b']").is_ok());
        assert!(build("int[] xs = []").is_ok());
    }

    #[test]
    fn redeclaration_in_same_frame() {
        let errors = build("int x = 1; char x = 'a'").unwrap_err();
        assert!(matches!(
            &errors[..],
            [CompilationError::DuplicateDeclaration { original, .. }] if *original == Span::new(1, 5, 1)
        ));
        assert!(build("int x = 1; begin char x = 'a' end").is_ok());
    }

    #[test]
    fn free_requires_array_or_pair() {
        let errors = build("int n = 1; free n").unwrap_err();
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            CompilationError::TypeError { expected, actual, .. } => {
                assert_eq!(expected, &TypeSet(vec![Type::AnyArray, Type::AnyPair]));
                assert_eq!(actual, &Type::Int);
            }
            other => panic!("unexpected error {other}"),
        }
        assert!(build("int[] xs = [1]; free xs").is_ok());
        assert!(build("pair(int, int) p = newpair(1, 2); free p").is_ok());
    }

    #[test]
    fn read_requires_int_or_char() {
        assert!(build("int n = 0; read n").is_ok());
        assert!(build("char c = 'a'; read c").is_ok());
        assert!(build("bool b = true; read b").is_err());
    }

    #[test]
    fn conditions_must_be_bool() {
        let errors = build("if 1 then skip else skip fi").unwrap_err();
        assert!(matches!(&errors[..], [CompilationError::UnexpectedType { expected: Type::Bool, .. }]));
        assert!(build("while 'c' do skip done").is_err());
    }

    #[test]
    fn branches_get_their_own_frames() {
        let stmt = build("if true then int x = 1 else int x = 2 fi").unwrap();
        let StmtKind::If { then_branch, else_branch, .. } = &stmt.kind else {
            panic!("expected if");
        };
        assert_ne!(then_branch.scope, stmt.scope);
        assert_ne!(then_branch.scope, else_branch.scope);
    }

    #[test]
    fn return_from_main_is_rejected() {
        let errors = build("return 1").unwrap_err();
        assert!(matches!(&errors[..], [CompilationError::ReturnOutsideFunction { .. }]));
    }

    #[test]
    fn exit_requires_int() {
        assert!(build("exit 3").is_ok());
        assert!(build("exit true").is_err());
    }

    #[test]
    fn untyped_pair_copy_cannot_be_inferred() {
        let errors = build(
            "pair(pair, int) p = null; pair(pair, int) q = null; fst p = fst q",
        )
        .unwrap_err();
        assert!(matches!(&errors[..], [CompilationError::TypeError { context, .. }] if context.contains("cannot infer")));

        // Assigning null into an untyped slot is fine.
        assert!(build("pair(pair, int) p = null; fst p = null").is_ok());
    }
}
