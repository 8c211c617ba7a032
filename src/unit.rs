//! Compilation unit API.
//!
//! A [`Unit`] runs one source text through the whole pipeline:
//!
//! ```text
//! source ──parse──► CST ──build──► Prog ──generate──► Output ──render──► text
//! ```
//!
//! # Example
//!
//! ```
//! use wacc::{CompilerOptions, Unit};
//!
//! let unit = Unit::new(CompilerOptions::default());
//! let asm = unit.render("begin println \"hello\" end").unwrap();
//! assert!(asm.contains("BL p_print_string"));
//! ```

use std::fmt;

use bumpalo::Bump;
use tracing::{debug, info_span};
use wacc_compiler::{AstBuilder, ArmProgram, JvmClass, Prog, arm, jvm};
use wacc_core::WaccError;
use wacc_parser::Parser;

use crate::options::{CompilerOptions, Target};

/// Generated code for either backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Arm(ArmProgram),
    Jvm(JvmClass),
}

impl Output {
    pub fn target(&self) -> Target {
        match self {
            Output::Arm(_) => Target::Arm,
            Output::Jvm(_) => Target::Jvm,
        }
    }

    pub fn instruction_count(&self) -> usize {
        match self {
            Output::Arm(program) => program.instruction_count(),
            Output::Jvm(class) => class.instruction_count(),
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Arm(program) => write!(f, "{program}"),
            Output::Jvm(class) => write!(f, "{class}"),
        }
    }
}

/// A compilation pipeline with fixed options.
#[derive(Debug, Clone, Default)]
pub struct Unit {
    options: CompilerOptions,
}

impl Unit {
    pub fn new(options: CompilerOptions) -> Self {
        Unit { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Parse and validate `source` without generating code.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn check(&self, source: &str) -> Result<Prog, WaccError> {
        let arena = Bump::new();
        let program = {
            let span = info_span!("pipeline.parse", bytes = source.len());
            let _enter = span.enter();
            Parser::parse(source, &arena)?
        };

        let span = info_span!("pipeline.build", funcs = program.funcs.len());
        let _enter = span.enter();
        Ok(AstBuilder::build(&program)?)
    }

    /// Compile `source` for the configured target.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&self, source: &str) -> Result<Output, WaccError> {
        let prog = self.check(source)?;

        let span = info_span!("pipeline.generate", target = %self.options.target);
        let _enter = span.enter();
        let output = match self.options.target {
            Target::Arm => Output::Arm(arm::generate(&prog)),
            Target::Jvm => Output::Jvm(jvm::generate(&prog, &self.options.class_name)),
        };
        debug!(instrs = output.instruction_count(), "compiled unit");
        Ok(output)
    }

    /// Compile `source` to assembly text.
    pub fn render(&self, source: &str) -> Result<String, WaccError> {
        let output = self.compile(source)?;
        let _span = info_span!("pipeline.render").entered();
        Ok(output.to_string())
    }
}
