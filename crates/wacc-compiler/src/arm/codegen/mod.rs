//! ARM code generation from the validated AST.
//!
//! The generator walks the typed tree once, emitting into a single text
//! section. String literals go through the shared [`DataPool`] and runtime
//! checks and I/O through the [`RuntimeLibrary`], both owned by the
//! generator for the duration of one compilation.
//!
//! ## Stack layout
//!
//! ```text
//! higher addresses
//! ┌──────────────────────┐
//! │ argument n .. 1      │  pushed by the caller, last argument first
//! ├──────────────────────┤
//! │ saved lr             │
//! ├──────────────────────┤
//! │ function frame       │  parameters' function, top-level locals
//! ├──────────────────────┤
//! │ nested block frames  │  one per active if/while/begin body
//! ├──────────────────────┤
//! │ spills, outgoing args│  tracked in `pushed`
//! └──────────────────────┘  <- sp
//! ```
//!
//! Every stack address is computed relative to `sp`, so anything pushed
//! mid-expression shifts the offsets of all variables.

mod expr;
mod stmt;

use wacc_core::WORD;

use super::instr::{AluOp, Instr};
use super::operand::{Addr, Label, MemSize, Operand2, Reg};
use super::program::{ArmProgram, DataPool};
use super::stdlib::{RuntimeLibrary, StdFunc};
use crate::ast::{Func, Prog};
use crate::scope::{ScopeArena, ScopeId, Storage, VarId};

/// Largest `sp` adjustment emitted in one instruction. A multiple of 4
/// below 1024 is always encodable.
const MAX_SP_STEP: u32 = 1020;

/// Generate the ARM program for a validated AST.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn generate(prog: &Prog) -> ArmProgram {
    let mut generator = ArmGenerator::new(&prog.scopes);
    for func in &prog.funcs {
        generator.gen_func(func);
    }
    generator.gen_main(prog);
    generator.finish()
}

/// Label of the code for WACC function `name`.
pub fn func_label(name: &str) -> Label {
    Label::new(format!("f_{name}"))
}

/// Code generation state for one program.
pub struct ArmGenerator<'p> {
    scopes: &'p ScopeArena,
    text: Vec<Instr>,
    data: DataPool,
    runtime: RuntimeLibrary,
    next_label: u32,
    /// Frames currently reserved on the stack, outermost first.
    frames: Vec<ScopeId>,
    /// Bytes pushed below the innermost frame.
    pushed: u32,
}

impl<'p> ArmGenerator<'p> {
    pub fn new(scopes: &'p ScopeArena) -> Self {
        Self {
            scopes,
            text: Vec::new(),
            data: DataPool::new(),
            runtime: RuntimeLibrary::new(),
            next_label: 0,
            frames: Vec::new(),
            pushed: 0,
        }
    }

    /// Append the runtime helpers and assemble the program.
    pub fn finish(self) -> ArmProgram {
        let helpers = self.runtime.len();
        let mut text = self.text;
        let runtime = self.runtime.into_instrs();
        if !runtime.is_empty() {
            text.extend(runtime);
            text.push(Instr::Ltorg);
        }

        let program = ArmProgram {
            data: self.data.into_entries(),
            text,
        };
        tracing::debug!(
            instrs = program.instruction_count(),
            literals = program.data.len(),
            helpers,
            "generated ARM program"
        );
        program
    }

    // ==========================================================================
    // Functions
    // ==========================================================================

    fn gen_func(&mut self, func: &Func) {
        self.emit(Instr::Label(func_label(&func.ident.name)));
        self.emit(Instr::Push(Reg::Lr.list()));
        self.enter_frame(func.scope);
        self.gen_stmt(&func.body);
        // Every path through a function body ends in `return` or `exit`,
        // which release the frame themselves.
        self.frames.pop();
        self.emit(Instr::Ltorg);
    }

    fn gen_main(&mut self, prog: &Prog) {
        self.emit(Instr::Label(Label::new("main")));
        self.emit(Instr::Push(Reg::Lr.list()));
        self.enter_frame(prog.main_scope());
        self.gen_stmt(&prog.body);
        self.leave_frame();
        self.emit(Instr::mov(Reg::R0, Operand2::Imm(0)));
        self.emit(Instr::Pop(Reg::Pc.list()));
        self.emit(Instr::Ltorg);
    }

    // ==========================================================================
    // Frames
    // ==========================================================================

    fn enter_frame(&mut self, scope: ScopeId) {
        let size = self.scopes.frame(scope).locals_size();
        self.adjust_sp(AluOp::Sub, size);
        self.frames.push(scope);
    }

    fn leave_frame(&mut self) {
        if let Some(scope) = self.frames.pop() {
            let size = self.scopes.frame(scope).locals_size();
            self.adjust_sp(AluOp::Add, size);
        }
    }

    /// Bytes reserved by every active frame.
    fn frames_size(&self) -> u32 {
        self.frames
            .iter()
            .map(|scope| self.scopes.frame(*scope).locals_size())
            .sum()
    }

    /// `sp = sp op bytes`, split into encodable steps.
    fn adjust_sp(&mut self, op: AluOp, mut bytes: u32) {
        while bytes > 0 {
            let step = bytes.min(MAX_SP_STEP);
            self.emit(Instr::alu(op, Reg::Sp, Reg::Sp, Operand2::Imm(step as i32)));
            bytes -= step;
        }
    }

    /// Offset of `var` from the current `sp`.
    fn var_offset(&self, var: VarId) -> u32 {
        let variable = self.scopes.var(var);
        let depth = self
            .frames
            .iter()
            .rposition(|scope| *scope == variable.scope)
            .unwrap_or_else(|| panic!("variable '{}' used outside its frame", variable.name));

        let inner: u32 = self.frames[depth + 1..]
            .iter()
            .map(|scope| self.scopes.frame(*scope).locals_size())
            .sum();
        match variable.storage {
            Storage::Local(offset) => self.pushed + inner + offset,
            Storage::Param(offset) => {
                let own = self.scopes.frame(variable.scope).locals_size();
                self.pushed + inner + own + WORD + offset
            }
        }
    }

    /// Address of `var`. Offsets beyond the immediate range of the access
    /// are materialized in `tmp`.
    fn var_addr(&mut self, var: VarId, size: MemSize, tmp: Reg) -> Addr {
        let offset = self.var_offset(var) as i32;
        if offset <= size.max_load_offset() {
            Addr::offset(Reg::Sp, offset)
        } else {
            self.load_imm(tmp, offset);
            self.emit(Instr::alu(AluOp::Add, tmp, Reg::Sp, tmp));
            Addr::at(tmp)
        }
    }

    // ==========================================================================
    // Emission helpers
    // ==========================================================================

    fn emit(&mut self, instr: Instr) {
        self.text.push(instr);
    }

    fn fresh_label(&mut self) -> Label {
        let label = Label::new(format!("L{}", self.next_label));
        self.next_label += 1;
        label
    }

    /// Call a runtime helper, instantiating it if needed.
    fn call_helper(&mut self, func: StdFunc) {
        let label = self.runtime.require(func, &mut self.data);
        self.emit(Instr::bl(label));
    }

    fn helper_label(&mut self, func: StdFunc) -> Label {
        self.runtime.require(func, &mut self.data)
    }

    /// `rd = value`, using the cheapest encoding.
    fn load_imm(&mut self, rd: Reg, value: i32) {
        if let Some(op2) = Operand2::imm(value) {
            self.emit(Instr::mov(rd, op2));
        } else if let Some(op2) = Operand2::imm(!value) {
            self.emit(Instr::Mvn {
                cond: Default::default(),
                s: false,
                rd,
                op2,
            });
        } else {
            self.emit(Instr::ldr(MemSize::Word, rd, Addr::Const(value)));
        }
    }

    /// Push `reg` for the duration of a spill.
    fn spill(&mut self, reg: Reg) {
        self.emit(Instr::Push(reg.list()));
        self.pushed += WORD;
    }

    fn unspill(&mut self, reg: Reg) {
        self.emit(Instr::Pop(reg.list()));
        self.pushed -= WORD;
    }
}
