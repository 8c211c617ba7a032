//! Lexical analysis for WACC.

mod cursor;
mod lexer;
mod token;

pub use lexer::{Lexer, escape_value};
pub use token::{Token, TokenKind};
