//! The ARM backend.
//!
//! ```text
//! Prog ──► codegen ──► text: Vec<Instr> ─┐
//!             │                          ├──► ArmProgram ──► Display
//!             ├──► DataPool (literals) ──┤
//!             └──► RuntimeLibrary ───────┘
//! ```

pub mod codegen;
pub mod instr;
pub mod operand;
pub mod program;
pub mod stdlib;

pub use codegen::{ArmGenerator, func_label, generate};
pub use instr::{AluOp, Instr};
pub use operand::{Addr, Cond, Label, MemSize, Operand2, Reg, RegList, Shift};
pub use program::{ArmProgram, DataPool, StringData};
pub use stdlib::{RuntimeLibrary, StdFunc};
