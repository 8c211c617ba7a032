//! The JVM backend, producing a Jasmin class.
//!
//! ```text
//! Prog ──► codegen ──► JvmAsm per method ──┐
//!             │                            ├──► JvmClass ──► Display
//!             └──► JvmRuntime (helpers) ───┘
//! ```

pub mod asm;
pub mod codegen;
pub mod descriptor;
pub mod instr;
pub mod runtime;

pub use asm::{JvmAsm, JvmClass, JvmField, JvmMethod};
pub use codegen::{JvmGenerator, generate, method_name};
pub use instr::{ArrayKind, IntOp, JvmCond, JvmInstr, JvmLabel};
pub use runtime::{JvmHelper, JvmRuntime};
