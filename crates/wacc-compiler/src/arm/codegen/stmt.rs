//! Statements, assignment sides and calls.

use wacc_core::{Type, WORD};
use wacc_parser::ast::PairSide;

use super::{ArmGenerator, func_label};
use crate::arm::instr::{AluOp, Instr};
use crate::arm::operand::{Addr, Cond, MemSize, Operand2, Reg};
use crate::arm::stdlib::{StdFunc, extern_fn};
use crate::ast::{Expr, Lhs, LhsKind, Rhs, RhsKind, Stmt, StmtKind};

impl ArmGenerator<'_> {
    pub(super) fn gen_stmt(&mut self, stmt: &Stmt) {
        let r0 = Reg::pool(0);
        match &stmt.kind {
            StmtKind::Skip => {}

            StmtKind::Decl { var, rhs } => {
                self.gen_rhs(rhs, 0);
                let size = MemSize::of(self.scopes.var(*var).ty.size());
                let addr = self.var_addr(*var, size, Reg::SCRATCH);
                self.emit(Instr::str(size, r0, addr));
            }

            StmtKind::Assign { lhs, rhs } => {
                self.gen_rhs(rhs, 0);
                self.store_lhs(lhs);
            }

            StmtKind::Read(lhs) => {
                let helper = if lhs.ty == Type::Char {
                    StdFunc::ReadChar
                } else {
                    StdFunc::ReadInt
                };
                self.call_helper(helper);
                self.emit(Instr::mov(r0, Reg::RET));
                self.store_lhs(lhs);
            }

            StmtKind::Free(expr) => {
                self.gen_expr(expr, 0);
                self.emit(Instr::mov(Reg::R0, r0));
                self.call_helper(StdFunc::Free);
            }

            StmtKind::Return(expr) => {
                self.gen_expr(expr, 0);
                self.emit(Instr::mov(Reg::RET, r0));
                let held = self.frames_size() + self.pushed;
                self.adjust_sp(AluOp::Add, held);
                self.emit(Instr::Pop(Reg::Pc.list()));
            }

            StmtKind::Exit(expr) => {
                self.gen_expr(expr, 0);
                self.emit(Instr::mov(Reg::R0, r0));
                self.emit(Instr::bl(extern_fn::EXIT));
            }

            StmtKind::Print(expr) => self.gen_print(expr),
            StmtKind::Println(expr) => {
                self.gen_print(expr);
                self.call_helper(StdFunc::PrintLn);
            }

            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let otherwise = self.fresh_label();
                let end = self.fresh_label();

                self.gen_expr(cond, 0);
                self.emit(Instr::cmp(r0, Operand2::Imm(0)));
                self.emit(Instr::b_if(Cond::Eq, otherwise.clone()));
                self.gen_scoped(then_branch);
                self.emit(Instr::b(end.clone()));
                self.emit(Instr::Label(otherwise));
                self.gen_scoped(else_branch);
                self.emit(Instr::Label(end));
            }

            StmtKind::While { cond, body } => {
                let check = self.fresh_label();
                let top = self.fresh_label();

                self.emit(Instr::b(check.clone()));
                self.emit(Instr::Label(top.clone()));
                self.gen_scoped(body);
                self.emit(Instr::Label(check));
                self.gen_expr(cond, 0);
                self.emit(Instr::cmp(r0, Operand2::Imm(1)));
                self.emit(Instr::b_if(Cond::Eq, top));
            }

            StmtKind::Block(body) => self.gen_scoped(body),
            StmtKind::Seq(stmts) => {
                for stmt in stmts {
                    self.gen_stmt(stmt);
                }
            }
        }
    }

    /// A body statement inside its own frame.
    fn gen_scoped(&mut self, body: &Stmt) {
        self.enter_frame(body.scope);
        self.gen_stmt(body);
        self.leave_frame();
    }

    fn gen_print(&mut self, expr: &Expr) {
        let helper = match &expr.ty {
            Type::Int => StdFunc::PrintInt,
            Type::Bool => StdFunc::PrintBool,
            Type::Char => StdFunc::PrintChar,
            Type::String => StdFunc::PrintString,
            Type::Array(elem) if **elem == Type::Char => StdFunc::PrintString,
            _ => StdFunc::PrintReference,
        };
        self.gen_expr(expr, 0);
        self.emit(Instr::mov(Reg::R0, Reg::pool(0)));
        self.call_helper(helper);
    }

    // ==========================================================================
    // Assignment sides
    // ==========================================================================

    fn gen_rhs(&mut self, rhs: &Rhs, dst: usize) {
        let rd = Reg::pool(dst);
        match &rhs.kind {
            RhsKind::Expr(expr) => self.gen_expr(expr, dst),

            RhsKind::ArrayLiter(elems) => {
                let elem_size = rhs.ty.elem().map_or(WORD, Type::size);
                let bytes = WORD + elems.len() as u32 * elem_size;
                self.malloc(rd, bytes);

                let size = MemSize::of(elem_size);
                for (i, elem) in elems.iter().enumerate() {
                    let value = self.gen_second(elem, dst);
                    let addr = self.heap_addr(rd, WORD + i as u32 * elem_size, size);
                    self.emit(Instr::str(size, value, addr));
                }
                self.load_imm(Reg::SCRATCH, elems.len() as i32);
                self.emit(Instr::str(MemSize::Word, Reg::SCRATCH, Addr::at(rd)));
            }

            RhsKind::NewPair(fst, snd) => {
                self.malloc(rd, 2 * WORD);
                for (elem, offset) in [(fst, 0), (snd, WORD)] {
                    let value = self.gen_second(elem, dst);
                    let size = MemSize::of(elem.ty.size());
                    self.emit(Instr::str(size, value, Addr::offset(rd, offset as i32)));
                }
            }

            RhsKind::PairElem { side, pair } => {
                self.gen_expr(pair, dst);
                self.check_null(rd);
                let size = MemSize::of(rhs.ty.size());
                self.emit(Instr::ldr(size, rd, pair_slot(rd, *side)));
            }

            RhsKind::Call { name, args } => self.gen_call(name, args, dst),
        }
    }

    /// Store the first pool register into `lhs`.
    fn store_lhs(&mut self, lhs: &Lhs) {
        let value = Reg::pool(0);
        let size = MemSize::of(lhs.ty.size());
        match &lhs.kind {
            LhsKind::Var(var) => {
                let size = MemSize::of(self.scopes.var(*var).ty.size());
                let addr = self.var_addr(*var, size, Reg::SCRATCH);
                self.emit(Instr::str(size, value, addr));
            }
            LhsKind::ArrayElem { var, indices } => {
                let elem = self.gen_elem_addr(*var, indices, 1);
                let size = MemSize::of(elem.size());
                self.emit(Instr::str(size, value, Addr::at(Reg::pool(1))));
            }
            LhsKind::PairElem { side, pair } => {
                let rp = Reg::pool(1);
                self.gen_expr(pair, 1);
                self.check_null(rp);
                self.emit(Instr::str(size, value, pair_slot(rp, *side)));
            }
        }
    }

    /// Push the arguments last to first, call, and drop them again.
    fn gen_call(&mut self, name: &str, args: &[Expr], dst: usize) {
        let rd = Reg::pool(dst);
        let start = self.pushed;
        for arg in args.iter().rev() {
            self.gen_expr(arg, dst);
            self.emit(Instr::str(MemSize::Word, rd, Addr::PreIndexed {
                base: Reg::Sp,
                offset: -(WORD as i32),
            }));
            self.pushed += WORD;
        }

        self.emit(Instr::bl(func_label(name)));

        let args_size = self.pushed - start;
        self.adjust_sp(AluOp::Add, args_size);
        self.pushed = start;
        self.emit(Instr::mov(rd, Reg::RET));
    }

    // ==========================================================================
    // Heap access
    // ==========================================================================

    fn malloc(&mut self, rd: Reg, bytes: u32) {
        self.load_imm(Reg::R0, bytes as i32);
        self.emit(Instr::bl(extern_fn::MALLOC));
        self.emit(Instr::mov(rd, Reg::R0));
    }

    /// `[base, #offset]`, going through `r12` when the offset does not fit
    /// the access.
    fn heap_addr(&mut self, base: Reg, offset: u32, size: MemSize) -> Addr {
        let offset = offset as i32;
        if offset <= size.max_load_offset() {
            return Addr::offset(base, offset);
        }
        self.load_imm(Reg::HIGH, offset);
        self.emit(Instr::alu(AluOp::Add, Reg::HIGH, base, Reg::HIGH));
        Addr::at(Reg::HIGH)
    }

    fn check_null(&mut self, reg: Reg) {
        self.emit(Instr::mov(Reg::R0, reg));
        self.call_helper(StdFunc::NullPointer);
    }
}

fn pair_slot(pair: Reg, side: PairSide) -> Addr {
    match side {
        PairSide::Fst => Addr::at(pair),
        PairSide::Snd => Addr::offset(pair, WORD as i32),
    }
}

#[cfg(test)]
mod tests {
    use crate::arm::codegen::tests::{compile, lines};
    use crate::arm::{Addr, ArmProgram, Cond, Instr, Label, RegList};

    fn body(source: &str) -> Vec<String> {
        lines(&compile(&format!("begin {source} end")))
    }

    fn contains_seq(text: &[String], seq: &[&str]) -> bool {
        text.windows(seq.len()).any(|w| w.iter().zip(seq).all(|(a, b)| a == b))
    }

    #[test]
    fn if_branches_merge_at_one_label() {
        let text = body("if true then println 1 else println 2 fi");
        assert!(contains_seq(&text, &["MOV r4, #1", "CMP r4, #0", "BEQ L0"]));
        assert!(contains_seq(&text, &["B L1", "L0:"]));
        assert_eq!(text.iter().filter(|l| *l == "L1:").count(), 1);
    }

    /// Index of the instruction loading the literal `text`.
    fn literal_load(program: &ArmProgram, text: &str) -> usize {
        let label = &program.data.iter().find(|d| d.text == text).unwrap().label;
        program
            .text
            .iter()
            .position(|i| matches!(i, Instr::Ldr { addr: Addr::Label(l), .. } if l == label))
            .unwrap()
    }

    fn label_at(text: &[Instr], label: &Label) -> usize {
        text.iter().position(|i| *i == Instr::Label(label.clone())).unwrap()
    }

    fn successors(text: &[Instr], at: usize) -> Vec<usize> {
        let next = || (at + 1 < text.len()).then_some(at + 1);
        match &text[at] {
            Instr::B { cond: Cond::Al, label } => vec![label_at(text, label)],
            Instr::B { label, .. } => next().into_iter().chain([label_at(text, label)]).collect(),
            Instr::Pop(regs) if regs.contains(RegList::PC) => vec![],
            _ => next().into_iter().collect(),
        }
    }

    fn reaches(text: &[Instr], from: usize, to: usize) -> bool {
        let mut seen = vec![false; text.len()];
        let mut stack = vec![from];
        while let Some(at) = stack.pop() {
            if at == to {
                return true;
            }
            if !std::mem::replace(&mut seen[at], true) {
                stack.extend(successors(text, at));
            }
        }
        false
    }

    #[test]
    fn if_branches_are_disjoint_and_rejoin() {
        let program = compile("begin if true then print \"a\" else print \"b\" fi end");
        let then_block = literal_load(&program, "a");
        let else_block = literal_load(&program, "b");
        let end = label_at(&program.text, &Label::new("L1"));
        let text = &program.text;

        assert!(!reaches(text, then_block, else_block));
        assert!(!reaches(text, else_block, then_block));
        assert!(reaches(text, then_block, end));
        assert!(reaches(text, else_block, end));
        assert_eq!(text.iter().filter(|i| **i == Instr::Label(Label::new("L1"))).count(), 1);
    }

    #[test]
    fn while_tests_its_condition_at_the_bottom() {
        let text = body("int i = 0; while i < 3 do i = i + 1 done");
        assert!(contains_seq(&text, &["B L0", "L1:"]));
        let check = text.iter().position(|l| l == "L0:").unwrap();
        let top = text.iter().position(|l| l == "L1:").unwrap();
        assert!(top < check);
        assert!(contains_seq(&text, &["CMP r4, #1", "BEQ L1"]));
    }

    #[test]
    fn array_literals_are_heap_allocated() {
        let text = body("int[] xs = [1, 2]; println xs[0]");
        assert!(contains_seq(
            &text,
            &[
                "MOV r0, #12",
                "BL malloc",
                "MOV r4, r0",
                "MOV r5, #1",
                "STR r5, [r4, #4]",
                "MOV r5, #2",
                "STR r5, [r4, #8]",
                "MOV r11, #2",
                "STR r11, [r4]",
            ]
        ));
    }

    #[test]
    fn char_arrays_pack_bytes() {
        let text = body("char[] cs = ['a', 'b']; print cs");
        assert!(text.contains(&"MOV r0, #6".to_string()));
        assert!(text.contains(&"STRB r5, [r4, #5]".to_string()));
        assert!(text.contains(&"BL p_print_string".to_string()));
    }

    #[test]
    fn pair_access_checks_for_null() {
        let text = body("pair(int, char) p = newpair(1, 'x'); char c = snd p; println c");
        assert!(contains_seq(&text, &["MOV r0, #8", "BL malloc", "MOV r4, r0"]));
        assert!(text.contains(&"STRB r5, [r4, #4]".to_string()));
        assert!(contains_seq(&text, &["MOV r0, r4", "BL p_check_null_pointer", "LDRSB r4, [r4, #4]"]));
    }

    #[test]
    fn pair_element_assignment() {
        let text = body("pair(int, int) p = newpair(1, 2); fst p = 5");
        assert!(contains_seq(&text, &["MOV r4, #5", "LDR r5, [sp]", "MOV r0, r5", "BL p_check_null_pointer", "STR r4, [r5]"]));
    }

    #[test]
    fn array_element_assignment() {
        let text = body("int[] xs = [1]; xs[0] = 9");
        assert!(contains_seq(&text, &["MOV r4, #9", "LDR r5, [sp]"]));
        assert!(text.contains(&"STR r4, [r5]".to_string()));
    }

    #[test]
    fn read_stores_the_result() {
        let text = body("int x = 0; read x");
        assert!(contains_seq(&text, &["BL p_read_int", "MOV r4, r0", "STR r4, [sp]"]));
    }

    #[test]
    fn free_and_exit() {
        let text = body("pair(int, int) p = null; free p; exit 3");
        assert!(contains_seq(&text, &["LDR r4, [sp]", "MOV r0, r4", "BL p_free"]));
        assert!(contains_seq(&text, &["MOV r4, #3", "MOV r0, r4", "BL exit"]));
    }

    #[test]
    fn print_picks_a_helper_by_type() {
        let text = body("print true; print 'c'; print \"s\"; println null");
        assert!(text.contains(&"BL p_print_bool".to_string()));
        assert!(text.contains(&"BL p_print_char".to_string()));
        assert!(text.contains(&"BL p_print_string".to_string()));
        assert!(text.contains(&"BL p_print_reference".to_string()));
        assert!(text.contains(&"BL p_print_ln".to_string()));
    }

    #[test]
    fn return_releases_every_frame() {
        let text = lines(&compile(
            "begin
                int f() is
                    int a = 1;
                    if true then int b = 2; return b else return a fi
                end
                int x = call f();
                println x
            end",
        ));
        let f_end = text.iter().position(|l| l == "main:").unwrap();
        let f = &text[..f_end];
        // Inside the then-branch both the function frame and the branch
        // frame are live.
        assert!(contains_seq(f, &["MOV r0, r4", "ADD sp, sp, #8", "POP {pc}"]));
        assert!(contains_seq(f, &["MOV r0, r4", "ADD sp, sp, #4", "POP {pc}"]));
    }

    #[test]
    fn arguments_shift_variable_offsets() {
        let text = lines(&compile(
            "begin
                int add(int a, int b) is return a + b end
                int x = 1;
                int y = call add(x, x);
                println y
            end",
        ));
        // The second argument is loaded from the frame, the first after one
        // word has been pushed.
        assert!(contains_seq(&text, &["LDR r4, [sp]", "STR r4, [sp, #-4]!", "LDR r4, [sp, #4]", "STR r4, [sp, #-4]!", "BL f_add", "ADD sp, sp, #8", "MOV r4, r0"]));
        // Inside the callee `a` sits right above lr, `b` one word further.
        assert!(text.contains(&"LDR r4, [sp, #4]".to_string()));
        assert!(text.contains(&"LDR r5, [sp, #8]".to_string()));
    }
}
