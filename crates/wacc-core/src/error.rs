//! Error types for every phase of the compiler.
//!
//! ```text
//! WaccError (top-level wrapper)
//! ├── ParseErrors       - malformed input the parser could not turn into a tree
//! └── SemanticErrors    - every CompilationError found while building the AST
//! ```
//!
//! Semantic analysis never stops at the first problem: all independent errors
//! are collected and reported together, in source order.

use std::fmt;

use thiserror::Error;

use crate::{Span, Type, TypeSet};

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A character that cannot start any token.
    UnexpectedChar,
    /// A string literal without its closing quote.
    UnterminatedString,
    /// A character literal that is empty, too long or unclosed.
    InvalidCharLiteral,
    /// An unknown escape sequence.
    InvalidEscape,
    /// An integer literal outside the 32-bit signed range.
    IntegerOutOfRange,
    /// A specific token was required here.
    ExpectedToken,
    /// A token that cannot appear here.
    UnexpectedToken,
    /// The input ended too early.
    UnexpectedEof,
    ExpectedExpression,
    ExpectedType,
    ExpectedStatement,
    /// A function body does not end in `return` or `exit`.
    MissingReturn,
    /// Text after the closing `end` of the program.
    TrailingInput,
}

/// A single parse error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("at {span}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }
}

/// All parse errors found in one source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }

    pub fn into_vec(self) -> Vec<ParseError> {
        self.errors
    }
}

impl From<ParseError> for ParseErrors {
    fn from(error: ParseError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl From<Vec<ParseError>> for ParseErrors {
    fn from(errors: Vec<ParseError>) -> Self {
        Self { errors }
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "syntax error {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

// ============================================================================
// Compilation Errors
// ============================================================================

/// Errors found while turning the syntax tree into a validated AST.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    /// Malformed input reported by the front end.
    #[error("at {span}: syntax error: {message}")]
    Syntactic { message: String, span: Span },

    /// An operand or value has a type outside the set a construct allows.
    #[error("at {span}: {context}: expected {expected}, found {actual}")]
    TypeError {
        expected: TypeSet,
        actual: Type,
        /// The construct that imposed the requirement (e.g. `free`, `+`).
        context: String,
        span: Span,
    },

    /// An identifier that no enclosing scope declares.
    #[error("at {span}: variable '{name}' is not defined in this scope")]
    VarNotFound { name: String, span: Span },

    /// The same name used for two parameters of one function.
    #[error("at {span}: duplicate parameter '{name}'")]
    DuplicateParam { name: String, span: Span },

    /// A single specific type was required.
    #[error("at {span}: expected type {expected}, found {actual}")]
    UnexpectedType {
        expected: Type,
        actual: Type,
        span: Span,
    },

    /// A name declared twice in the same scope frame.
    #[error("at {span}: '{name}' is already declared in this scope (at {original})")]
    DuplicateDeclaration {
        name: String,
        original: Span,
        span: Span,
    },

    /// Two functions with the same name.
    #[error("at {span}: function '{name}' is already defined")]
    DuplicateFunction { name: String, span: Span },

    /// A call to a function that is not defined.
    #[error("at {span}: function '{name}' is not defined")]
    FuncNotFound { name: String, span: Span },

    /// A call with the wrong number of arguments.
    #[error("at {span}: function '{name}' takes {expected} argument(s), {actual} given")]
    ArgumentCount {
        name: String,
        expected: usize,
        actual: usize,
        span: Span,
    },

    /// `return` in the main program body.
    #[error("at {span}: cannot return from the main program")]
    ReturnOutsideFunction { span: Span },
}

impl CompilationError {
    /// Where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompilationError::Syntactic { span, .. }
            | CompilationError::TypeError { span, .. }
            | CompilationError::VarNotFound { span, .. }
            | CompilationError::DuplicateParam { span, .. }
            | CompilationError::UnexpectedType { span, .. }
            | CompilationError::DuplicateDeclaration { span, .. }
            | CompilationError::DuplicateFunction { span, .. }
            | CompilationError::FuncNotFound { span, .. }
            | CompilationError::ArgumentCount { span, .. }
            | CompilationError::ReturnOutsideFunction { span } => *span,
        }
    }

    pub fn is_syntactic(&self) -> bool {
        matches!(self, CompilationError::Syntactic { .. })
    }

    /// Shorthand for the common single-alternative-set type error.
    pub fn type_error(
        expected: impl Into<TypeSet>,
        actual: Type,
        context: impl Into<String>,
        span: Span,
    ) -> Self {
        CompilationError::TypeError {
            expected: expected.into(),
            actual,
            context: context.into(),
            span,
        }
    }
}

impl From<ParseError> for CompilationError {
    fn from(error: ParseError) -> Self {
        CompilationError::Syntactic {
            message: error.message,
            span: error.span,
        }
    }
}

/// Every semantic error found in one compilation, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemanticErrors(pub Vec<CompilationError>);

impl SemanticErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompilationError> {
        self.0.iter()
    }
}

impl fmt::Display for SemanticErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            if error.is_syntactic() {
                write!(f, "{error}")?;
            } else {
                write!(f, "semantic error {error}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for SemanticErrors {}

// ============================================================================
// Top-level
// ============================================================================

/// Any failure of the compilation pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WaccError {
    #[error("{0}")]
    Parse(#[from] ParseErrors),

    #[error("{0}")]
    Semantic(#[from] SemanticErrors),
}

impl WaccError {
    /// Process exit status conventionally used for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            WaccError::Parse(_) => 100,
            WaccError::Semantic(errors) if errors.iter().any(CompilationError::is_syntactic) => 100,
            WaccError::Semantic(_) => 200,
        }
    }
}
