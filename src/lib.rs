//! WACC compiler.
//!
//! Compiles WACC programs to ARM assembly or to a Jasmin class for the JVM.
//! The work is split across the workspace crates:
//! - `wacc_core`: spans, types, operators, errors
//! - `wacc_parser`: lexer and parser
//! - `wacc_compiler`: semantic analysis and both backends
//!
//! This crate ties them together behind [`Unit`].

pub mod options;
pub mod unit;

pub use options::{CompilerOptions, Target, UnknownTarget};
pub use unit::{Output, Unit};

pub use wacc_compiler::{ArmProgram, AstBuilder, JvmClass, Prog, arm, jvm};
pub use wacc_core::{CompilationError, ParseError, ParseErrors, SemanticErrors, Span, Type, WaccError};
pub use wacc_parser::Parser;
