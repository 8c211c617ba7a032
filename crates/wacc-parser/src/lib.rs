//! WACC parser crate.
//!
//! Provides the lexer and recursive-descent parser that turn WACC source
//! text into an arena-allocated concrete syntax tree:
//! - Lexical analysis (tokenization, `#` comments, escape validation)
//! - Syntax tree definitions
//! - Integer range checking and sign folding
//! - The "function bodies must end in return/exit" rule
//!
//! # Example
//!
//! ```
//! use wacc_parser::Parser;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! match Parser::parse("begin println \"hello\" end", &arena) {
//!     Ok(program) => assert!(program.funcs.is_empty()),
//!     Err(errors) => panic!("{errors}"),
//! }
//! ```

pub mod ast;
pub mod lexer;

pub use ast::{Parser, Program};
pub use lexer::{Lexer, Token, TokenKind};
