//! The ARM instruction model.
//!
//! Every instruction may carry a condition code, and the data-processing
//! ones independently opt into updating the status flags. Rendering follows
//! `<mnemonic><cond?><S?> <operands>`.

use std::fmt;

use super::operand::{Addr, Cond, Label, MemSize, Operand2, Reg, RegList};

/// Data-processing operations of the form `op rd, rn, op2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    /// Reverse subtract: `rd = op2 - rn`.
    Rsb,
    Rsc,
    And,
    Orr,
    Eor,
}

impl AluOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            AluOp::Add => "ADD",
            AluOp::Adc => "ADC",
            AluOp::Sub => "SUB",
            AluOp::Sbc => "SBC",
            AluOp::Rsb => "RSB",
            AluOp::Rsc => "RSC",
            AluOp::And => "AND",
            AluOp::Orr => "ORR",
            AluOp::Eor => "EOR",
        }
    }
}

/// One line of the text section.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instr {
    /// `name:`
    Label(Label),

    Alu {
        op: AluOp,
        cond: Cond,
        s: bool,
        rd: Reg,
        rn: Reg,
        op2: Operand2,
    },
    /// `rd = rm * rs`
    Mul {
        cond: Cond,
        s: bool,
        rd: Reg,
        rm: Reg,
        rs: Reg,
    },
    /// `rd = rm * rs + rn`
    Mla {
        cond: Cond,
        s: bool,
        rd: Reg,
        rm: Reg,
        rs: Reg,
        rn: Reg,
    },
    /// Signed 64-bit product of `rm * rs` into `rdhi:rdlo`.
    Smull {
        cond: Cond,
        s: bool,
        rdlo: Reg,
        rdhi: Reg,
        rm: Reg,
        rs: Reg,
    },
    Mov {
        cond: Cond,
        s: bool,
        rd: Reg,
        op2: Operand2,
    },
    Mvn {
        cond: Cond,
        s: bool,
        rd: Reg,
        op2: Operand2,
    },
    Cmp {
        cond: Cond,
        rn: Reg,
        op2: Operand2,
    },

    Ldr {
        cond: Cond,
        size: MemSize,
        rd: Reg,
        addr: Addr,
    },
    Str {
        cond: Cond,
        size: MemSize,
        rd: Reg,
        addr: Addr,
    },
    Push(RegList),
    Pop(RegList),

    B {
        cond: Cond,
        label: Label,
    },
    Bl {
        cond: Cond,
        label: Label,
    },

    /// Flush the literal pool here.
    Ltorg,
}

impl Instr {
    // ==========================================================================
    // Constructors for the common unconditional forms
    // ==========================================================================

    pub fn alu(op: AluOp, rd: Reg, rn: Reg, op2: impl Into<Operand2>) -> Instr {
        Instr::Alu {
            op,
            cond: Cond::Al,
            s: false,
            rd,
            rn,
            op2: op2.into(),
        }
    }

    /// The flag-setting form of [`Instr::alu`].
    pub fn alu_s(op: AluOp, rd: Reg, rn: Reg, op2: impl Into<Operand2>) -> Instr {
        Instr::Alu {
            op,
            cond: Cond::Al,
            s: true,
            rd,
            rn,
            op2: op2.into(),
        }
    }

    pub fn mov(rd: Reg, op2: impl Into<Operand2>) -> Instr {
        Instr::Mov {
            cond: Cond::Al,
            s: false,
            rd,
            op2: op2.into(),
        }
    }

    pub fn mov_if(cond: Cond, rd: Reg, op2: impl Into<Operand2>) -> Instr {
        Instr::Mov {
            cond,
            s: false,
            rd,
            op2: op2.into(),
        }
    }

    pub fn cmp(rn: Reg, op2: impl Into<Operand2>) -> Instr {
        Instr::Cmp {
            cond: Cond::Al,
            rn,
            op2: op2.into(),
        }
    }

    pub fn ldr(size: MemSize, rd: Reg, addr: Addr) -> Instr {
        Instr::Ldr {
            cond: Cond::Al,
            size,
            rd,
            addr,
        }
    }

    pub fn ldr_if(cond: Cond, rd: Reg, addr: Addr) -> Instr {
        Instr::Ldr {
            cond,
            size: MemSize::Word,
            rd,
            addr,
        }
    }

    pub fn str(size: MemSize, rd: Reg, addr: Addr) -> Instr {
        Instr::Str {
            cond: Cond::Al,
            size,
            rd,
            addr,
        }
    }

    pub fn b(label: Label) -> Instr {
        Instr::B {
            cond: Cond::Al,
            label,
        }
    }

    pub fn b_if(cond: Cond, label: Label) -> Instr {
        Instr::B { cond, label }
    }

    pub fn bl(label: impl Into<Label>) -> Instr {
        Instr::Bl {
            cond: Cond::Al,
            label: label.into(),
        }
    }

    pub fn bl_if(cond: Cond, label: Label) -> Instr {
        Instr::Bl { cond, label }
    }

    fn opcode(f: &mut fmt::Formatter<'_>, mnemonic: &str, cond: Cond, s: bool) -> fmt::Result {
        write!(f, "{mnemonic}{}{}", cond.suffix(), if s { "S" } else { "" })
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Label(label) => write!(f, "{label}:"),
            Instr::Alu {
                op,
                cond,
                s,
                rd,
                rn,
                op2,
            } => {
                Self::opcode(f, op.mnemonic(), *cond, *s)?;
                write!(f, " {rd}, {rn}, {op2}")
            }
            Instr::Mul { cond, s, rd, rm, rs } => {
                Self::opcode(f, "MUL", *cond, *s)?;
                write!(f, " {rd}, {rm}, {rs}")
            }
            Instr::Mla {
                cond,
                s,
                rd,
                rm,
                rs,
                rn,
            } => {
                Self::opcode(f, "MLA", *cond, *s)?;
                write!(f, " {rd}, {rm}, {rs}, {rn}")
            }
            Instr::Smull {
                cond,
                s,
                rdlo,
                rdhi,
                rm,
                rs,
            } => {
                Self::opcode(f, "SMULL", *cond, *s)?;
                write!(f, " {rdlo}, {rdhi}, {rm}, {rs}")
            }
            Instr::Mov { cond, s, rd, op2 } => {
                Self::opcode(f, "MOV", *cond, *s)?;
                write!(f, " {rd}, {op2}")
            }
            Instr::Mvn { cond, s, rd, op2 } => {
                Self::opcode(f, "MVN", *cond, *s)?;
                write!(f, " {rd}, {op2}")
            }
            Instr::Cmp { cond, rn, op2 } => {
                Self::opcode(f, "CMP", *cond, false)?;
                write!(f, " {rn}, {op2}")
            }
            Instr::Ldr { cond, size, rd, addr } => {
                let mnemonic = match size {
                    MemSize::Word => "LDR",
                    MemSize::Byte => "LDRSB",
                };
                Self::opcode(f, mnemonic, *cond, false)?;
                write!(f, " {rd}, {addr}")
            }
            Instr::Str { cond, size, rd, addr } => {
                let mnemonic = match size {
                    MemSize::Word => "STR",
                    MemSize::Byte => "STRB",
                };
                Self::opcode(f, mnemonic, *cond, false)?;
                write!(f, " {rd}, {addr}")
            }
            Instr::Push(regs) => write!(f, "PUSH {regs}"),
            Instr::Pop(regs) => write!(f, "POP {regs}"),
            Instr::B { cond, label } => {
                Self::opcode(f, "B", *cond, false)?;
                write!(f, " {label}")
            }
            Instr::Bl { cond, label } => {
                Self::opcode(f, "BL", *cond, false)?;
                write!(f, " {label}")
            }
            Instr::Ltorg => f.write_str(".ltorg"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_and_flag_suffixes_are_independent() {
        let add = Instr::Alu {
            op: AluOp::Add,
            cond: Cond::Ne,
            s: true,
            rd: Reg::R4,
            rn: Reg::R4,
            op2: Operand2::Imm(1),
        };
        assert_eq!(add.to_string(), "ADDNES r4, r4, #1");
        assert_eq!(Instr::alu(AluOp::Sub, Reg::Sp, Reg::Sp, Operand2::Imm(8)).to_string(), "SUB sp, sp, #8");
        assert_eq!(Instr::alu_s(AluOp::Rsb, Reg::R5, Reg::R5, Operand2::Imm(0)).to_string(), "RSBS r5, r5, #0");
    }

    #[test]
    fn memory_access_mnemonics() {
        let ldr = Instr::ldr(MemSize::Byte, Reg::R4, Addr::offset(Reg::Sp, 3));
        assert_eq!(ldr.to_string(), "LDRSB r4, [sp, #3]");
        let str = Instr::str(MemSize::Byte, Reg::R4, Addr::at(Reg::R5));
        assert_eq!(str.to_string(), "STRB r4, [r5]");
        let lit = Instr::ldr_if(Cond::Eq, Reg::R0, Addr::Label(Label::new("msg_1")));
        assert_eq!(lit.to_string(), "LDREQ r0, =msg_1");
    }

    #[test]
    fn control_flow_rendering() {
        assert_eq!(Instr::bl("printf").to_string(), "BL printf");
        assert_eq!(Instr::bl_if(Cond::Vs, Label::new("p_throw_overflow_error")).to_string(), "BLVS p_throw_overflow_error");
        assert_eq!(Instr::Push(Reg::Lr.list()).to_string(), "PUSH {lr}");
        assert_eq!(Instr::Label(Label::new("main")).to_string(), "main:");
    }
}
