//! Expression evaluation into the register pool.
//!
//! `gen_expr(expr, dst)` leaves the value of `expr` in the `dst`th pool
//! register and may use every pool register above it. When the pool runs
//! out the lower value is pushed, the operand is evaluated in its place and
//! moved to the scratch register, and the lower value is popped back.

use wacc_core::{BinaryOp, Type, UnaryOp, WORD};

use super::ArmGenerator;
use crate::arm::instr::{AluOp, Instr};
use crate::arm::operand::{Addr, Cond, MemSize, Operand2, Reg, Shift};
use crate::arm::stdlib::{StdFunc, extern_fn};
use crate::ast::{Expr, ExprKind};
use crate::scope::VarId;

impl ArmGenerator<'_> {
    pub(super) fn gen_expr(&mut self, expr: &Expr, dst: usize) {
        let rd = Reg::pool(dst);
        match &expr.kind {
            ExprKind::Int(n) => self.load_imm(rd, *n),
            ExprKind::Bool(b) => self.emit(Instr::mov(rd, Operand2::Imm(i32::from(*b)))),
            ExprKind::Char(c) => self.load_imm(rd, *c as i32),
            ExprKind::Str(text) => {
                let label = self.data.intern(text);
                self.emit(Instr::ldr(MemSize::Word, rd, Addr::Label(label)));
            }
            ExprKind::Null => self.emit(Instr::mov(rd, Operand2::Imm(0))),

            ExprKind::Var(var) => {
                let size = MemSize::of(expr.ty.size());
                let addr = self.var_addr(*var, size, rd);
                self.emit(Instr::ldr(size, rd, addr));
            }

            ExprKind::ArrayElem { var, indices } => {
                let elem = self.gen_elem_addr(*var, indices, dst);
                self.emit(Instr::ldr(MemSize::of(elem.size()), rd, Addr::at(rd)));
            }

            ExprKind::Unary { op, operand } => {
                self.gen_expr(operand, dst);
                self.gen_unary(*op, rd);
            }

            ExprKind::Binary { op, left, right } => self.gen_binary(*op, left, right, dst),
        }
    }

    fn gen_unary(&mut self, op: UnaryOp, rd: Reg) {
        match op {
            UnaryOp::Not => self.emit(Instr::alu(AluOp::Eor, rd, rd, Operand2::Imm(1))),
            UnaryOp::Neg => {
                self.emit(Instr::alu_s(AluOp::Rsb, rd, rd, Operand2::Imm(0)));
                self.check_overflow(Cond::Vs);
            }
            UnaryOp::Len => self.emit(Instr::ldr(MemSize::Word, rd, Addr::at(rd))),
            // Chars and ints share one register representation.
            UnaryOp::Ord | UnaryOp::Chr => {}
        }
    }

    fn gen_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr, dst: usize) {
        let rd = Reg::pool(dst);
        if let BinaryOp::And | BinaryOp::Or = op {
            return self.gen_short_circuit(op, left, right, dst);
        }

        self.gen_expr(left, dst);
        match op {
            BinaryOp::Add | BinaryOp::Sub => {
                let op2 = self.gen_operand(right, dst);
                let alu = if op == BinaryOp::Add { AluOp::Add } else { AluOp::Sub };
                self.emit(Instr::alu_s(alu, rd, rd, op2));
                self.check_overflow(Cond::Vs);
            }
            BinaryOp::Mul => {
                let rm = self.gen_second(right, dst);
                self.emit(Instr::Smull {
                    cond: Cond::Al,
                    s: false,
                    rdlo: rd,
                    rdhi: Reg::HIGH,
                    rm: rd,
                    rs: rm,
                });
                // The product fits iff the high word is the sign of the low word.
                self.emit(Instr::cmp(Reg::HIGH, Operand2::Shifted(rd, Shift::Asr(31))));
                self.check_overflow(Cond::Ne);
            }
            BinaryOp::Div | BinaryOp::Mod => {
                let rm = self.gen_second(right, dst);
                self.emit(Instr::mov(Reg::R0, rd));
                self.emit(Instr::mov(Reg::R1, rm));
                self.call_helper(StdFunc::DivideByZero);
                if op == BinaryOp::Div {
                    self.emit(Instr::bl(extern_fn::IDIV));
                    self.emit(Instr::mov(rd, Reg::R0));
                } else {
                    self.emit(Instr::bl(extern_fn::IDIVMOD));
                    self.emit(Instr::mov(rd, Reg::R1));
                }
            }
            _ => {
                let op2 = self.gen_operand(right, dst);
                let cond = comparison_cond(op);
                self.emit(Instr::cmp(rd, op2));
                self.emit(Instr::mov_if(cond, rd, Operand2::Imm(1)));
                self.emit(Instr::mov_if(cond.inverse(), rd, Operand2::Imm(0)));
            }
        }
    }

    /// `&&` skips the right side once the left is false, `||` once it is true.
    fn gen_short_circuit(&mut self, op: BinaryOp, left: &Expr, right: &Expr, dst: usize) {
        let rd = Reg::pool(dst);
        let end = self.fresh_label();
        let decided = if op == BinaryOp::And { Cond::Eq } else { Cond::Ne };

        self.gen_expr(left, dst);
        self.emit(Instr::cmp(rd, Operand2::Imm(0)));
        self.emit(Instr::b_if(decided, end.clone()));
        self.gen_expr(right, dst);
        self.emit(Instr::Label(end));
    }

    /// The right operand as an `Operand2`: an immediate when it is an
    /// encodable constant, a register otherwise.
    fn gen_operand(&mut self, expr: &Expr, dst: usize) -> Operand2 {
        let constant = match expr.kind {
            ExprKind::Int(n) => Some(n),
            ExprKind::Char(c) => Some(c as i32),
            ExprKind::Bool(b) => Some(i32::from(b)),
            _ => None,
        };
        match constant.and_then(Operand2::imm) {
            Some(imm) => imm,
            None => Operand2::Reg(self.gen_second(expr, dst)),
        }
    }

    /// Evaluate `expr` while the `dst`th register stays live, returning
    /// the register that holds it.
    pub(super) fn gen_second(&mut self, expr: &Expr, dst: usize) -> Reg {
        if dst + 1 < Reg::POOL.len() {
            self.gen_expr(expr, dst + 1);
            return Reg::pool(dst + 1);
        }

        let rd = Reg::pool(dst);
        self.spill(rd);
        self.gen_expr(expr, dst);
        self.emit(Instr::mov(Reg::SCRATCH, rd));
        self.unspill(rd);
        Reg::SCRATCH
    }

    /// Leave the address of `var[i][j]...` in the `dst`th register,
    /// checking every index against its array's bounds. Returns the
    /// element type.
    pub(super) fn gen_elem_addr(&mut self, var: VarId, indices: &[Expr], dst: usize) -> Type {
        let rd = Reg::pool(dst);
        let mut ty = self.scopes.var(var).ty.clone();

        let addr = self.var_addr(var, MemSize::Word, rd);
        self.emit(Instr::ldr(MemSize::Word, rd, addr));

        for (i, index) in indices.iter().enumerate() {
            let ri = self.gen_second(index, dst);
            self.emit(Instr::mov(Reg::R0, ri));
            self.emit(Instr::mov(Reg::R1, rd));
            self.call_helper(StdFunc::ArrayBounds);

            ty = ty
                .elem()
                .cloned()
                .unwrap_or_else(|| panic!("indexing a value of type {ty}"));
            self.emit(Instr::alu(AluOp::Add, rd, rd, Operand2::Imm(WORD as i32)));
            let scaled = if ty.size() == WORD {
                Operand2::Shifted(ri, Shift::Lsl(2))
            } else {
                Operand2::Reg(ri)
            };
            self.emit(Instr::alu(AluOp::Add, rd, rd, scaled));

            if i + 1 < indices.len() {
                self.emit(Instr::ldr(MemSize::Word, rd, Addr::at(rd)));
            }
        }
        ty
    }

    fn check_overflow(&mut self, cond: Cond) {
        let label = self.helper_label(StdFunc::OverflowError);
        self.emit(Instr::bl_if(cond, label));
    }
}

/// Condition under which a comparison holds.
fn comparison_cond(op: BinaryOp) -> Cond {
    match op {
        BinaryOp::Greater => Cond::Gt,
        BinaryOp::GreaterEqual => Cond::Ge,
        BinaryOp::Less => Cond::Lt,
        BinaryOp::LessEqual => Cond::Le,
        BinaryOp::Equal => Cond::Eq,
        BinaryOp::NotEqual => Cond::Ne,
        other => panic!("'{}' is not a comparison", other.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use crate::arm::codegen::tests::{compile, lines};

    fn body(source: &str) -> Vec<String> {
        lines(&compile(&format!("begin {source} end")))
    }

    fn contains_seq(text: &[String], seq: &[&str]) -> bool {
        text.windows(seq.len()).any(|w| w.iter().zip(seq).all(|(a, b)| a == b))
    }

    #[test]
    fn small_constants_are_immediates() {
        let text = body("int x = 5 + 3; println x");
        assert!(contains_seq(&text, &["MOV r4, #5", "ADDS r4, r4, #3", "BLVS p_throw_overflow_error"]));
    }

    #[test]
    fn large_constants_use_the_literal_pool() {
        let text = body("int x = 123456; println x");
        assert!(text.contains(&"LDR r4, =123456".to_string()));
    }

    #[test]
    fn variables_are_register_operands() {
        let text = body("int a = 1; int b = a - a; println b");
        assert!(text.contains(&"SUBS r4, r4, r5".to_string()));
    }

    #[test]
    fn multiplication_checks_the_high_word() {
        let text = body("int a = 7; int b = a * a; println b");
        assert!(contains_seq(
            &text,
            &["SMULL r4, r12, r4, r5", "CMP r12, r4, ASR #31", "BLNE p_throw_overflow_error"]
        ));
    }

    #[test]
    fn division_checks_the_divisor() {
        let text = body("int a = 7; int b = a / 2; int c = a % 2; println b + c");
        assert!(contains_seq(
            &text,
            &["MOV r0, r4", "MOV r1, r5", "BL p_check_divide_by_zero", "BL __aeabi_idiv", "MOV r4, r0"]
        ));
        assert!(contains_seq(&text, &["BL __aeabi_idivmod", "MOV r4, r1"]));
    }

    #[test]
    fn comparisons_set_both_outcomes() {
        let text = body("int a = 1; bool b = a <= 3; println b");
        assert!(contains_seq(&text, &["CMP r4, #3", "MOVLE r4, #1", "MOVGT r4, #0"]));
    }

    #[test]
    fn logical_operators_short_circuit() {
        let text = body("bool t = true; bool b = t && false; println b");
        assert!(contains_seq(&text, &["CMP r4, #0", "BEQ L0", "MOV r4, #0", "L0:"]));
    }

    #[test]
    fn deep_expressions_spill_to_the_stack() {
        let text = body(
            "int a = 1; int x = a + (a + (a + (a + (a + (a + (a + (a + a))))))); println x",
        );
        assert!(text.contains(&"PUSH {r10}".to_string()));
        assert!(text.contains(&"MOV r11, r10".to_string()));
        assert!(text.contains(&"POP {r10}".to_string()));
        assert!(text.contains(&"ADDS r10, r10, r11".to_string()));
    }

    #[test]
    fn array_access_is_bounds_checked() {
        let text = body("int[] xs = [1, 2]; int y = xs[1]; println y");
        assert!(contains_seq(
            &text,
            &[
                "MOV r0, r5",
                "MOV r1, r4",
                "BL p_check_array_bounds",
                "ADD r4, r4, #4",
                "ADD r4, r4, r5, LSL #2",
                "LDR r4, [r4]",
            ]
        ));
    }

    #[test]
    fn negation_checks_overflow() {
        let text = body("int a = 1; int b = -a; println b");
        assert!(contains_seq(&text, &["RSBS r4, r4, #0", "BLVS p_throw_overflow_error"]));
    }
}
