//! Core types shared across the WACC compiler crates.
//!
//! This crate holds what both the parser and the compiler need to agree on:
//! - [`Span`] source positions
//! - the semantic [`Type`] system
//! - [`UnaryOp`] / [`BinaryOp`] operator enums
//! - error types for every phase
//! - [`Parsed`], the error-accumulating result used during semantic analysis

pub mod error;
pub mod ops;
pub mod span;
pub mod types;
pub mod validated;

pub use error::{
    CompilationError, ParseError, ParseErrorKind, ParseErrors, SemanticErrors, WaccError,
};
pub use ops::{BinaryOp, UnaryOp};
pub use span::Span;
pub use types::{FuncType, Type, TypeSet, WORD};
pub use validated::{Parsed, ParsedExt, collect_all, fail, zip, zip3, zip4};
