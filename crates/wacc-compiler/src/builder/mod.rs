//! AST builder: semantic analysis of a parsed program.
//!
//! Turns the concrete syntax tree into the typed [`Prog`], reporting every
//! independent error in one go rather than stopping at the first.
//!
//! ## Phases
//!
//! ```text
//! Program (CST)
//!     │
//!     ▼
//! Registration     function signatures into the global frame
//!     │
//!     ▼
//! Bodies           each function body, then the main body
//!     │
//!     ▼
//! Prog             or SemanticErrors, in source order
//! ```
//!
//! Errors of one function header come right before the errors of its body.

mod assign;
mod expr;
mod registration;
mod stmt;

use wacc_core::{Parsed, SemanticErrors, Type, collect_all, zip};
use wacc_parser::ast::{FuncDecl, Program};

use crate::ast::{Func, Prog};
use crate::scope::{ScopeArena, ScopeId, ScopeKind};
use registration::FuncHeader;

/// Validates a program, building its scope chain as it goes.
#[derive(Debug, Default)]
pub struct AstBuilder {
    scopes: ScopeArena,
    /// Declared return type of the function being built, `None` in main.
    returns: Option<Type>,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a whole program.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build(program: &Program<'_>) -> Result<Prog, SemanticErrors> {
        let mut builder = Self::new();
        let registration = builder.register_functions(program.funcs);

        let funcs: Vec<_> = program
            .funcs
            .iter()
            .zip(registration.headers)
            .map(|(decl, header)| builder.build_func(decl, header))
            .collect();

        let main = builder.scopes.push(ScopeId::GLOBAL, ScopeKind::Block);
        let body = builder.build_stmt(&program.body, main);

        match zip(collect_all(funcs), body) {
            Ok((funcs, body)) => {
                tracing::debug!(
                    funcs = funcs.len(),
                    scopes = builder.scopes.len(),
                    "program validated"
                );
                Ok(Prog {
                    funcs,
                    body,
                    scopes: builder.scopes,
                })
            }
            Err(errors) => {
                tracing::debug!(errors = errors.len(), "semantic analysis failed");
                Err(SemanticErrors(errors))
            }
        }
    }

    /// The scope chain built so far.
    pub fn scopes(&self) -> &ScopeArena {
        &self.scopes
    }

    fn build_func(&mut self, decl: &FuncDecl<'_>, header: FuncHeader) -> Parsed<Func> {
        self.returns = Some(header.ident.returns().clone());
        let body = self.build_stmt(&decl.body, header.scope);
        self.returns = None;

        tracing::trace!(
            func = %header.ident.name,
            ok = body.is_ok(),
            "built function body"
        );

        let header_ok = if header.errors.is_empty() {
            Ok(())
        } else {
            Err(header.errors)
        };
        let ((), body) = zip(header_ok, body)?;
        Ok(Func {
            ident: header.ident,
            params: header.params,
            body,
            scope: header.scope,
            span: decl.span,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use wacc_core::CompilationError;
    use wacc_parser::Parser;

    fn build(source: &str) -> Result<Prog, SemanticErrors> {
        let arena = Bump::new();
        let program = Parser::parse(source, &arena).unwrap();
        AstBuilder::build(&program)
    }

    #[test]
    fn mutual_recursion_resolves() {
        let prog = build(
            "begin
                bool even(int n) is
                    if n == 0 then return true else bool r = call odd(n - 1); return r fi
                end
                bool odd(int n) is
                    if n == 0 then return false else bool r = call even(n - 1); return r fi
                end
                bool b = call even(10);
                println b
            end",
        )
        .unwrap();
        assert_eq!(prog.funcs.len(), 2);
        assert_eq!(prog.scopes.lookup_func("odd").unwrap().returns(), &Type::Bool);
    }

    #[test]
    fn duplicate_parameter_keeps_both() {
        let errors = build("begin int f(int x, bool x) is return 0 end skip end").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors.0[0], CompilationError::DuplicateParam { name, .. } if name == "x"));
    }

    #[test]
    fn duplicate_function_body_is_still_checked() {
        let errors = build(
            "begin
                int f() is return 0 end
                int f() is return y end
                skip
            end",
        )
        .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(&errors.0[0], CompilationError::DuplicateFunction { .. }));
        assert!(matches!(&errors.0[1], CompilationError::VarNotFound { name, .. } if name == "y"));
    }

    #[test]
    fn return_type_is_checked_against_declaration() {
        let errors = build("begin char f() is return 1 end skip end").unwrap_err();
        assert!(matches!(
            &errors.0[..],
            [CompilationError::UnexpectedType { expected: Type::Char, actual: Type::Int, .. }]
        ));
    }

    #[test]
    fn errors_follow_source_order() {
        let errors = build(
            "begin
                int f(int a, int a) is return b end
                int x = call f(1);
                println z
            end",
        )
        .unwrap_err();
        let kinds: Vec<_> = errors
            .iter()
            .map(|e| match e {
                CompilationError::DuplicateParam { .. } => "param",
                CompilationError::VarNotFound { .. } => "var",
                CompilationError::ArgumentCount { .. } => "count",
                other => panic!("unexpected error {other}"),
            })
            .collect();
        assert_eq!(kinds, ["param", "var", "count", "var"]);
    }

    #[test]
    fn main_body_has_its_own_frame() {
        let prog = build("begin int x = 1; println x end").unwrap();
        let main = prog.main_scope();
        assert_ne!(main, ScopeId::GLOBAL);
        assert_eq!(prog.scopes.frame(main).vars().len(), 1);
    }
}
