//! Runtime support library.
//!
//! Helpers are instantiated on first request and memoized for the rest of
//! the compilation: every later request returns the same label, and each
//! body is emitted exactly once no matter how many call sites use it.
//! Helpers that depend on other helpers request them through the same
//! registry, so shared dependencies are also emitted once.
//!
//! The C routines the helpers call into (`printf`, `malloc`, ...) are
//! linker symbols only and never get bodies here.

use rustc_hash::FxHashMap;
use wacc_core::WORD;

use super::instr::{AluOp, Instr};
use super::operand::{Addr, Cond, Label, MemSize, Operand2, Reg};
use super::program::DataPool;

/// Linker symbols provided by the C library and the ARM EABI.
pub mod extern_fn {
    pub const PRINTF: &str = "printf";
    pub const PUTS: &str = "puts";
    pub const PUTCHAR: &str = "putchar";
    pub const SCANF: &str = "scanf";
    pub const FFLUSH: &str = "fflush";
    pub const MALLOC: &str = "malloc";
    pub const FREE: &str = "free";
    pub const EXIT: &str = "exit";
    pub const IDIV: &str = "__aeabi_idiv";
    pub const IDIVMOD: &str = "__aeabi_idivmod";
}

/// Exit status of a program stopped by a runtime error.
pub const RUNTIME_ERROR_STATUS: i32 = 255;

/// A runtime helper routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StdFunc {
    PrintInt,
    PrintBool,
    PrintChar,
    PrintString,
    PrintReference,
    PrintLn,
    ReadInt,
    ReadChar,
    /// `free` behind a null check.
    Free,
    /// Prints the message in `r0` and exits with [`RUNTIME_ERROR_STATUS`].
    RuntimeError,
    OverflowError,
    /// Checks the divisor in `r1`.
    DivideByZero,
    /// Checks index `r0` against the array in `r1`.
    ArrayBounds,
    /// Checks the pair pointer in `r0`.
    NullPointer,
}

impl StdFunc {
    /// The linker-visible name, also used as the label.
    pub fn name(self) -> &'static str {
        match self {
            StdFunc::PrintInt => "p_print_int",
            StdFunc::PrintBool => "p_print_bool",
            StdFunc::PrintChar => "p_print_char",
            StdFunc::PrintString => "p_print_string",
            StdFunc::PrintReference => "p_print_reference",
            StdFunc::PrintLn => "p_print_ln",
            StdFunc::ReadInt => "p_read_int",
            StdFunc::ReadChar => "p_read_char",
            StdFunc::Free => "p_free",
            StdFunc::RuntimeError => "p_throw_runtime_error",
            StdFunc::OverflowError => "p_throw_overflow_error",
            StdFunc::DivideByZero => "p_check_divide_by_zero",
            StdFunc::ArrayBounds => "p_check_array_bounds",
            StdFunc::NullPointer => "p_check_null_pointer",
        }
    }
}

const NULL_REFERENCE_MSG: &str = "NullReferenceError: dereference a null reference\\n\\0";
const OVERFLOW_MSG: &str =
    "OverflowError: the result is too small/large to store in a 4-byte signed-integer.\\n\\0";
const DIVIDE_BY_ZERO_MSG: &str = "DivideByZeroError: divide or modulo by zero\\n\\0";
const NEGATIVE_INDEX_MSG: &str = "ArrayIndexOutOfBoundsError: negative index\\n\\0";
const LARGE_INDEX_MSG: &str = "ArrayIndexOutOfBoundsError: index too large\\n\\0";

/// The helper registry of one compilation.
#[derive(Debug, Default)]
pub struct RuntimeLibrary {
    labels: FxHashMap<StdFunc, Label>,
    /// Bodies in instantiation order.
    bodies: Vec<Instr>,
}

impl RuntimeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The label of `func`, instantiating its body and literals on first use.
    pub fn require(&mut self, func: StdFunc, data: &mut DataPool) -> Label {
        if let Some(label) = self.labels.get(&func) {
            return label.clone();
        }

        let label = Label::new(func.name());
        // Registered before the body is built, so a helper's own
        // dependencies never re-enter it.
        self.labels.insert(func, label.clone());
        let body = self.body(func, &label, data);
        tracing::trace!(helper = func.name(), instrs = body.len(), "instantiated runtime helper");
        self.bodies.extend(body);
        label
    }

    /// Whether `func` has been instantiated.
    pub fn contains(&self, func: StdFunc) -> bool {
        self.labels.contains_key(&func)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Every instantiated body, for appending after the user code.
    pub fn into_instrs(self) -> Vec<Instr> {
        self.bodies
    }

    fn body(&mut self, func: StdFunc, label: &Label, data: &mut DataPool) -> Vec<Instr> {
        let mut body = vec![Instr::Label(label.clone()), Instr::Push(Reg::Lr.list())];
        match func {
            StdFunc::PrintInt => {
                body.push(Instr::mov(Reg::R1, Reg::R0));
                print_formatted(&mut body, data.intern("%d\\0"));
            }
            StdFunc::PrintBool => {
                let yes = data.intern("true\\0");
                let no = data.intern("false\\0");
                body.extend([
                    Instr::cmp(Reg::R0, Operand2::Imm(0)),
                    Instr::ldr_if(Cond::Ne, Reg::R0, Addr::Label(yes)),
                    Instr::ldr_if(Cond::Eq, Reg::R0, Addr::Label(no)),
                    Instr::alu(AluOp::Add, Reg::R0, Reg::R0, Operand2::Imm(WORD as i32)),
                    Instr::bl(extern_fn::PRINTF),
                ]);
                flush(&mut body);
            }
            StdFunc::PrintChar => {
                body.push(Instr::bl(extern_fn::PUTCHAR));
                flush(&mut body);
            }
            StdFunc::PrintString => {
                body.extend([
                    Instr::ldr(MemSize::Word, Reg::R1, Addr::at(Reg::R0)),
                    Instr::alu(AluOp::Add, Reg::R2, Reg::R0, Operand2::Imm(WORD as i32)),
                ]);
                print_formatted(&mut body, data.intern("%.*s\\0"));
            }
            StdFunc::PrintReference => {
                body.push(Instr::mov(Reg::R1, Reg::R0));
                print_formatted(&mut body, data.intern("%p\\0"));
            }
            StdFunc::PrintLn => {
                let empty = data.intern("\\0");
                body.extend([
                    Instr::ldr(MemSize::Word, Reg::R0, Addr::Label(empty)),
                    Instr::alu(AluOp::Add, Reg::R0, Reg::R0, Operand2::Imm(WORD as i32)),
                    Instr::bl(extern_fn::PUTS),
                ]);
                flush(&mut body);
            }
            StdFunc::ReadInt => read(&mut body, data.intern("%d\\0"), MemSize::Word),
            StdFunc::ReadChar => read(&mut body, data.intern(" %c\\0"), MemSize::Byte),
            StdFunc::Free => {
                let msg = data.intern(NULL_REFERENCE_MSG);
                let throw = self.require(StdFunc::RuntimeError, data);
                body.extend([
                    Instr::cmp(Reg::R0, Operand2::Imm(0)),
                    Instr::ldr_if(Cond::Eq, Reg::R0, Addr::Label(msg)),
                    Instr::b_if(Cond::Eq, throw),
                    Instr::bl(extern_fn::FREE),
                ]);
            }
            StdFunc::RuntimeError => {
                let print = self.require(StdFunc::PrintString, data);
                // Never returns, so the pushed lr is left on the stack.
                body.extend([
                    Instr::bl(print),
                    Instr::mov(Reg::R0, Operand2::Imm(RUNTIME_ERROR_STATUS)),
                    Instr::bl(extern_fn::EXIT),
                ]);
            }
            StdFunc::OverflowError => {
                let msg = data.intern(OVERFLOW_MSG);
                let throw = self.require(StdFunc::RuntimeError, data);
                body.extend([
                    Instr::ldr(MemSize::Word, Reg::R0, Addr::Label(msg)),
                    Instr::bl(throw),
                ]);
            }
            StdFunc::DivideByZero => {
                let msg = data.intern(DIVIDE_BY_ZERO_MSG);
                let throw = self.require(StdFunc::RuntimeError, data);
                body.extend([
                    Instr::cmp(Reg::R1, Operand2::Imm(0)),
                    Instr::ldr_if(Cond::Eq, Reg::R0, Addr::Label(msg)),
                    Instr::bl_if(Cond::Eq, throw),
                ]);
            }
            StdFunc::ArrayBounds => {
                let negative = data.intern(NEGATIVE_INDEX_MSG);
                let large = data.intern(LARGE_INDEX_MSG);
                let throw = self.require(StdFunc::RuntimeError, data);
                body.extend([
                    Instr::cmp(Reg::R0, Operand2::Imm(0)),
                    Instr::ldr_if(Cond::Lt, Reg::R0, Addr::Label(negative)),
                    Instr::bl_if(Cond::Lt, throw.clone()),
                    Instr::ldr(MemSize::Word, Reg::R1, Addr::at(Reg::R1)),
                    Instr::cmp(Reg::R0, Reg::R1),
                    Instr::ldr_if(Cond::Cs, Reg::R0, Addr::Label(large)),
                    Instr::bl_if(Cond::Cs, throw),
                ]);
            }
            StdFunc::NullPointer => {
                let msg = data.intern(NULL_REFERENCE_MSG);
                let throw = self.require(StdFunc::RuntimeError, data);
                body.extend([
                    Instr::cmp(Reg::R0, Operand2::Imm(0)),
                    Instr::ldr_if(Cond::Eq, Reg::R0, Addr::Label(msg)),
                    Instr::bl_if(Cond::Eq, throw),
                ]);
            }
        }
        body.push(Instr::Pop(Reg::Pc.list()));
        body
    }
}

/// `printf(fmt, r1, r2)` with the format in `fmt`, then flush.
fn print_formatted(body: &mut Vec<Instr>, fmt: Label) {
    body.extend([
        Instr::ldr(MemSize::Word, Reg::R0, Addr::Label(fmt)),
        Instr::alu(AluOp::Add, Reg::R0, Reg::R0, Operand2::Imm(WORD as i32)),
        Instr::bl(extern_fn::PRINTF),
    ]);
    flush(body);
}

fn flush(body: &mut Vec<Instr>) {
    body.extend([
        Instr::mov(Reg::R0, Operand2::Imm(0)),
        Instr::bl(extern_fn::FFLUSH),
    ]);
}

/// `scanf` into a stack slot, returning the value in `r0`. Only the load
/// width differs between element types; the slot is always a word so the
/// stack stays aligned.
fn read(body: &mut Vec<Instr>, fmt: Label, size: MemSize) {
    let slot = Operand2::Imm(WORD as i32);
    body.extend([
        Instr::alu(AluOp::Sub, Reg::Sp, Reg::Sp, slot),
        Instr::mov(Reg::R1, Reg::Sp),
        Instr::ldr(MemSize::Word, Reg::R0, Addr::Label(fmt)),
        Instr::alu(AluOp::Add, Reg::R0, Reg::R0, Operand2::Imm(WORD as i32)),
        Instr::bl(extern_fn::SCANF),
        Instr::ldr(size, Reg::R0, Addr::at(Reg::Sp)),
        Instr::alu(AluOp::Add, Reg::Sp, Reg::Sp, slot),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(instrs: &[Instr]) -> Vec<&str> {
        instrs
            .iter()
            .filter_map(|i| match i {
                Instr::Label(label) => Some(label.name()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn repeated_requests_share_one_body() {
        let mut data = DataPool::new();
        let mut lib = RuntimeLibrary::new();

        let first = lib.require(StdFunc::PrintInt, &mut data);
        let second = lib.require(StdFunc::PrintInt, &mut data);
        assert_eq!(first, second);
        assert_eq!(data.len(), 1);

        let instrs = lib.into_instrs();
        assert_eq!(labels(&instrs), ["p_print_int"]);
    }

    #[test]
    fn dependencies_are_pulled_in_once() {
        let mut data = DataPool::new();
        let mut lib = RuntimeLibrary::new();

        lib.require(StdFunc::Free, &mut data);
        lib.require(StdFunc::NullPointer, &mut data);
        lib.require(StdFunc::OverflowError, &mut data);
        assert!(lib.contains(StdFunc::RuntimeError));
        assert!(lib.contains(StdFunc::PrintString));

        let instrs = lib.into_instrs();
        let names = labels(&instrs);
        for helper in ["p_free", "p_check_null_pointer", "p_throw_runtime_error", "p_print_string"] {
            assert_eq!(names.iter().filter(|n| **n == helper).count(), 1, "{helper}");
        }
        // The null-reference message is shared by `p_free` and the null check.
        let null_msgs = data
            .iter()
            .filter(|d| d.text == NULL_REFERENCE_MSG)
            .count();
        assert_eq!(null_msgs, 1);
    }

    #[test]
    fn read_helpers_differ_only_in_format_and_width() {
        let mut data = DataPool::new();
        let mut lib = RuntimeLibrary::new();
        lib.require(StdFunc::ReadInt, &mut data);
        lib.require(StdFunc::ReadChar, &mut data);
        let text: Vec<String> = lib.into_instrs().iter().map(ToString::to_string).collect();
        assert!(text.contains(&"LDR r0, [sp]".to_string()));
        assert!(text.contains(&"LDRSB r0, [sp]".to_string()));
        assert_eq!(text.iter().filter(|l| *l == "BL scanf").count(), 2);
    }

    #[test]
    fn format_strings_count_their_terminator() {
        let mut data = DataPool::new();
        let mut lib = RuntimeLibrary::new();
        lib.require(StdFunc::PrintInt, &mut data);
        let fmt = data.iter().next().unwrap();
        assert_eq!(fmt.text, "%d\\0");
        assert_eq!(fmt.len, 3);
    }
}
