//! Registers, condition codes and operands of the ARM instruction model.

use std::fmt;

use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};

// ============================================================================
// Registers
// ============================================================================

/// A general purpose register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Reg {
    R0 = 0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
    R9,
    R10,
    R11,
    R12,
    Sp,
    Lr,
    Pc,
}

impl Reg {
    /// Result register of calls, first argument of runtime helpers.
    pub const RET: Reg = Reg::R0;
    /// Holds an operand that was evaluated after the pool ran out.
    pub const SCRATCH: Reg = Reg::R11;
    /// High word of a long multiply.
    pub const HIGH: Reg = Reg::R12;

    /// Registers available to expression evaluation, in allocation order.
    pub const POOL: [Reg; 7] = [Reg::R4, Reg::R5, Reg::R6, Reg::R7, Reg::R8, Reg::R9, Reg::R10];

    /// The `i`th pool register.
    pub fn pool(i: usize) -> Reg {
        Self::POOL[i]
    }

    /// Single-register list, for `PUSH`/`POP`.
    pub fn list(self) -> RegList {
        RegList::from_bits_truncate(1 << u8::from(self))
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reg::Sp => f.write_str("sp"),
            Reg::Lr => f.write_str("lr"),
            Reg::Pc => f.write_str("pc"),
            r => write!(f, "r{}", u8::from(*r)),
        }
    }
}

bitflags! {
    /// A register set for `PUSH` and `POP`, one bit per register number.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RegList: u16 {
        const R0 = 1 << 0;
        const R1 = 1 << 1;
        const R2 = 1 << 2;
        const R3 = 1 << 3;
        const R4 = 1 << 4;
        const R5 = 1 << 5;
        const R6 = 1 << 6;
        const R7 = 1 << 7;
        const R8 = 1 << 8;
        const R9 = 1 << 9;
        const R10 = 1 << 10;
        const R11 = 1 << 11;
        const R12 = 1 << 12;
        const SP = 1 << 13;
        const LR = 1 << 14;
        const PC = 1 << 15;
    }
}

impl RegList {
    /// Registers in the list, lowest first.
    pub fn regs(self) -> impl Iterator<Item = Reg> {
        (0u8..16)
            .filter(move |n| self.bits() & (1 << n) != 0)
            .filter_map(|n| Reg::try_from(n).ok())
    }
}

impl fmt::Display for RegList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, reg) in self.regs().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{reg}")?;
        }
        f.write_str("}")
    }
}

// ============================================================================
// Condition codes
// ============================================================================

/// Condition under which an instruction executes, with its 4-bit encoding.
///
/// Codes come in complementary pairs differing in the lowest bit, so
/// flipping that bit inverts the condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Cond {
    Eq = 0b0000,
    Ne = 0b0001,
    /// Carry set / unsigned higher or same.
    Cs = 0b0010,
    Cc = 0b0011,
    Mi = 0b0100,
    Pl = 0b0101,
    Vs = 0b0110,
    Vc = 0b0111,
    Hi = 0b1000,
    Ls = 0b1001,
    Ge = 0b1010,
    Lt = 0b1011,
    Gt = 0b1100,
    Le = 0b1101,
    /// Always; rendered without a suffix.
    #[default]
    Al = 0b1110,
}

impl Cond {
    /// The condition that holds exactly when `self` does not.
    pub fn inverse(self) -> Cond {
        match self {
            Cond::Al => Cond::Al,
            cond => Cond::try_from(u8::from(cond) ^ 1).unwrap_or(Cond::Al),
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Cond::Eq => "EQ",
            Cond::Ne => "NE",
            Cond::Cs => "CS",
            Cond::Cc => "CC",
            Cond::Mi => "MI",
            Cond::Pl => "PL",
            Cond::Vs => "VS",
            Cond::Vc => "VC",
            Cond::Hi => "HI",
            Cond::Ls => "LS",
            Cond::Ge => "GE",
            Cond::Lt => "LT",
            Cond::Gt => "GT",
            Cond::Le => "LE",
            Cond::Al => "",
        }
    }
}

// ============================================================================
// Operands
// ============================================================================

/// Barrel shifter operation applied to a register operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shift {
    Lsl(u8),
    Lsr(u8),
    Asr(u8),
    Ror(u8),
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shift::Lsl(n) => write!(f, "LSL #{n}"),
            Shift::Lsr(n) => write!(f, "LSR #{n}"),
            Shift::Asr(n) => write!(f, "ASR #{n}"),
            Shift::Ror(n) => write!(f, "ROR #{n}"),
        }
    }
}

/// The flexible second operand of data-processing instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand2 {
    /// An immediate; only constructed through [`Operand2::imm`] or for
    /// values known to be encodable.
    Imm(i32),
    Reg(Reg),
    Shifted(Reg, Shift),
}

impl Operand2 {
    /// An immediate operand, if `value` fits the rotated 8-bit encoding.
    pub fn imm(value: i32) -> Option<Operand2> {
        is_encodable(value as u32).then_some(Operand2::Imm(value))
    }
}

impl From<Reg> for Operand2 {
    fn from(reg: Reg) -> Self {
        Operand2::Reg(reg)
    }
}

impl fmt::Display for Operand2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand2::Imm(n) => write!(f, "#{n}"),
            Operand2::Reg(r) => write!(f, "{r}"),
            Operand2::Shifted(r, shift) => write!(f, "{r}, {shift}"),
        }
    }
}

/// Whether `value` is an 8-bit constant rotated right by an even amount.
pub fn is_encodable(value: u32) -> bool {
    (0..16).any(|rot| value.rotate_left(rot * 2) <= 0xFF)
}

/// A named position in the text or data section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(String);

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Label(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Label::new(name)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Memory operand of loads and stores.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Addr {
    /// `[base, #offset]`
    Offset { base: Reg, offset: i32 },
    /// `[base, #offset]!`, writing the address back to `base`.
    PreIndexed { base: Reg, offset: i32 },
    /// `=label`, loaded from the literal pool.
    Label(Label),
    /// `=value`, loaded from the literal pool.
    Const(i32),
}

impl Addr {
    pub fn at(base: Reg) -> Addr {
        Addr::Offset { base, offset: 0 }
    }

    pub fn offset(base: Reg, offset: i32) -> Addr {
        Addr::Offset { base, offset }
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Addr::Offset { base, offset: 0 } => write!(f, "[{base}]"),
            Addr::Offset { base, offset } => write!(f, "[{base}, #{offset}]"),
            Addr::PreIndexed { base, offset } => write!(f, "[{base}, #{offset}]!"),
            Addr::Label(label) => write!(f, "={label}"),
            Addr::Const(n) => write!(f, "={n}"),
        }
    }
}

/// Width and signedness of a memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemSize {
    Word,
    /// Sign-extending on load.
    Byte,
}

impl MemSize {
    /// Access width for a value of `size` bytes.
    pub fn of(size: u32) -> MemSize {
        if size == 1 { MemSize::Byte } else { MemSize::Word }
    }

    /// Largest immediate offset a load of this width can encode.
    pub fn max_load_offset(self) -> i32 {
        match self {
            MemSize::Word => 4095,
            MemSize::Byte => 255,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_encoding() {
        for value in [0, 1, 255, 256, 1020, 0xFF00, 0x3FC, -0x1000_0000_i32 as u32 as i32] {
            assert!(Operand2::imm(value).is_some(), "{value} should encode");
        }
        for value in [257, 1021, 0x1234, -1] {
            assert!(Operand2::imm(value).is_none(), "{value} should not encode");
        }
    }

    #[test]
    fn conditions_invert_pairwise() {
        assert_eq!(Cond::Eq.inverse(), Cond::Ne);
        assert_eq!(Cond::Lt.inverse(), Cond::Ge);
        assert_eq!(Cond::Gt.inverse(), Cond::Le);
        assert_eq!(Cond::Vs.inverse(), Cond::Vc);
        assert_eq!(Cond::Al.inverse(), Cond::Al);
        assert_eq!(u8::from(Cond::Al), 14);
    }

    #[test]
    fn register_lists_render_in_order() {
        let list = Reg::Lr.list() | Reg::R4.list() | RegList::R5;
        assert_eq!(list.to_string(), "{r4, r5, lr}");
        assert_eq!(Reg::Pc.list().to_string(), "{pc}");
    }

    #[test]
    fn operand_rendering() {
        assert_eq!(Operand2::Shifted(Reg::R5, Shift::Lsl(2)).to_string(), "r5, LSL #2");
        assert_eq!(Addr::offset(Reg::Sp, 8).to_string(), "[sp, #8]");
        assert_eq!(Addr::at(Reg::R4).to_string(), "[r4]");
        assert_eq!(Addr::PreIndexed { base: Reg::Sp, offset: -4 }.to_string(), "[sp, #-4]!");
        assert_eq!(Addr::Label(Label::new("msg_0")).to_string(), "=msg_0");
    }
}
