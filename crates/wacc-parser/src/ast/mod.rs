//! Concrete syntax tree for WACC, plus the parser that builds it.
//!
//! Nodes are allocated in a `bumpalo` arena and are `Copy`; child links are
//! plain `&'ast` references into the same arena.
//!
//! # Example
//!
//! ```
//! use wacc_parser::Parser;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let source = r#"
//!     begin
//!         int square(int x) is
//!             return x * x
//!         end
//!         int y = call square(7);
//!         println y
//!     end
//! "#;
//!
//! match Parser::parse(source, &arena) {
//!     Ok(program) => println!("{} function(s)", program.funcs.len()),
//!     Err(errors) => eprintln!("{errors}"),
//! }
//! ```

use wacc_core::Span;

mod parser;
mod type_parser;
pub mod types;

pub mod expr;
mod expr_parser;

pub mod stmt;
mod stmt_parser;

pub use expr::*;
pub use parser::Parser;
pub use stmt::*;
pub use types::*;

/// An identifier with its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

/// A whole program: `begin func* stat end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Program<'ast> {
    pub funcs: &'ast [FuncDecl<'ast>],
    pub body: Stmt<'ast>,
    pub span: Span,
}

/// `T name(params) is body end`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuncDecl<'ast> {
    pub return_type: TypeExpr<'ast>,
    pub ident: Ident<'ast>,
    pub params: &'ast [ParamDecl<'ast>],
    pub body: Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDecl<'ast> {
    pub ty: TypeExpr<'ast>,
    pub ident: Ident<'ast>,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;

    #[test]
    fn parse_minimal_program() {
        let arena = Bump::new();
        let program = Parser::parse("begin skip end", &arena).unwrap();
        assert!(program.funcs.is_empty());
        assert!(matches!(program.body, Stmt::Skip(_)));
    }

    #[test]
    fn parse_functions_before_body() {
        let arena = Bump::new();
        let source = r#"
            begin
                int f(int a, bool b) is
                    return a
                end
                pair(int, pair) g() is
                    return null
                end
                int x = call f(1, true)
            end
        "#;
        let program = Parser::parse(source, &arena).unwrap();
        assert_eq!(program.funcs.len(), 2);
        assert_eq!(program.funcs[0].ident.name, "f");
        assert_eq!(program.funcs[0].params.len(), 2);
        assert_eq!(program.funcs[1].return_type.to_string(), "pair(int, pair)");
        assert!(matches!(program.body, Stmt::Decl(_)));
    }

    #[test]
    fn parse_errors_are_reported() {
        let arena = Bump::new();
        let errors = Parser::parse("begin int x = end", &arena).unwrap_err();
        assert!(!errors.is_empty());
    }
}
