//! The WACC compiler core.
//!
//! Takes the concrete syntax tree from `wacc_parser` through semantic
//! analysis to target code:
//! - [`scope`]: the scope chain and variable storage layout
//! - [`builder`]: the AST builder, which validates while it builds and
//!   reports every independent error
//! - [`ast`]: the typed AST it produces
//! - [`arm`]: ARM instruction model, code generator and runtime library
//! - [`jvm`]: the parallel JVM backend
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use wacc_compiler::{AstBuilder, arm};
//! use wacc_parser::Parser;
//!
//! let arena = Bump::new();
//! let program = Parser::parse("begin int x = 2; println x * 21 end", &arena).unwrap();
//! let prog = AstBuilder::build(&program).unwrap();
//! let asm = arm::generate(&prog);
//! assert!(asm.to_string().contains("BL p_print_int"));
//! ```

pub mod arm;
pub mod ast;
pub mod builder;
pub mod jvm;
pub mod operators;
pub mod scope;
pub mod type_resolver;

pub use arm::ArmProgram;
pub use ast::Prog;
pub use builder::AstBuilder;
pub use jvm::JvmClass;
pub use scope::{ScopeArena, ScopeId, VarId};
