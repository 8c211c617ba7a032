//! The JVM instruction model, rendered in Jasmin syntax.

use std::fmt;

use super::descriptor::{arg_slots, return_slots};

/// A branch target within one method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JvmLabel(String);

impl JvmLabel {
    pub fn new(name: impl Into<String>) -> Self {
        JvmLabel(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JvmLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Integer operations on the top of the operand stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Neg,
    And,
    Or,
    Xor,
}

impl IntOp {
    fn mnemonic(self) -> &'static str {
        match self {
            IntOp::Add => "iadd",
            IntOp::Sub => "isub",
            IntOp::Mul => "imul",
            IntOp::Div => "idiv",
            IntOp::Rem => "irem",
            IntOp::Neg => "ineg",
            IntOp::And => "iand",
            IntOp::Or => "ior",
            IntOp::Xor => "ixor",
        }
    }
}

/// Branch conditions of the `if<cond>` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JvmCond {
    Eq,
    Ne,
    Lt,
    Ge,
    Gt,
    Le,
}

impl JvmCond {
    fn suffix(self) -> &'static str {
        match self {
            JvmCond::Eq => "eq",
            JvmCond::Ne => "ne",
            JvmCond::Lt => "lt",
            JvmCond::Ge => "ge",
            JvmCond::Gt => "gt",
            JvmCond::Le => "le",
        }
    }
}

/// Element kind of an array access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayKind {
    Int,
    Bool,
    Char,
    Ref,
}

impl ArrayKind {
    fn prefix(self) -> char {
        match self {
            ArrayKind::Int => 'i',
            ArrayKind::Bool => 'b',
            ArrayKind::Char => 'c',
            ArrayKind::Ref => 'a',
        }
    }

    /// Operand of `newarray`, for the primitive kinds.
    fn primitive(self) -> &'static str {
        match self {
            ArrayKind::Int => "int",
            ArrayKind::Bool => "boolean",
            ArrayKind::Char => "char",
            ArrayKind::Ref => panic!("reference arrays are created with anewarray"),
        }
    }
}

/// One line of a method body.
///
/// Member references are written the way Jasmin expects them:
/// `owner/name` for the member plus its descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JvmInstr {
    Label(JvmLabel),

    /// Push an int constant, in its shortest encoding.
    Iconst(i32),
    /// Push a string constant. The text is already escaped for Jasmin.
    Ldc(String),
    AconstNull,

    Iload(u16),
    Istore(u16),
    Aload(u16),
    Astore(u16),

    Int(IntOp),
    I2c,

    /// Compare the top int against zero.
    If(JvmCond, JvmLabel),
    /// Compare the top two ints.
    IfIcmp(JvmCond, JvmLabel),
    /// Compare the top two references. Only `Eq` and `Ne` exist.
    IfAcmp(JvmCond, JvmLabel),
    IfNonNull(JvmLabel),
    Goto(JvmLabel),

    NewArray(ArrayKind),
    /// Array of references, with the component's internal name.
    ANewArray(String),
    ArrayLength,
    ArrayLoad(ArrayKind),
    ArrayStore(ArrayKind),

    Dup,
    Pop,
    New(String),
    CheckCast(String),

    GetStatic { field: String, desc: String },
    PutStatic { field: String, desc: String },
    InvokeStatic { method: String, desc: String },
    InvokeVirtual { method: String, desc: String },
    InvokeSpecial { method: String, desc: String },

    Ireturn,
    Areturn,
    Return,
}

impl JvmInstr {
    pub fn invoke_static(method: impl Into<String>, desc: impl Into<String>) -> JvmInstr {
        JvmInstr::InvokeStatic {
            method: method.into(),
            desc: desc.into(),
        }
    }

    pub fn invoke_virtual(method: impl Into<String>, desc: impl Into<String>) -> JvmInstr {
        JvmInstr::InvokeVirtual {
            method: method.into(),
            desc: desc.into(),
        }
    }

    pub fn get_static(field: impl Into<String>, desc: impl Into<String>) -> JvmInstr {
        JvmInstr::GetStatic {
            field: field.into(),
            desc: desc.into(),
        }
    }

    /// Net change to the operand stack depth.
    pub fn stack_delta(&self) -> i32 {
        match self {
            JvmInstr::Label(_) | JvmInstr::Goto(_) | JvmInstr::Return => 0,
            JvmInstr::Iconst(_) | JvmInstr::Ldc(_) | JvmInstr::AconstNull => 1,
            JvmInstr::Iload(_) | JvmInstr::Aload(_) => 1,
            JvmInstr::Istore(_) | JvmInstr::Astore(_) => -1,
            JvmInstr::Int(IntOp::Neg) | JvmInstr::I2c => 0,
            JvmInstr::Int(_) => -1,
            JvmInstr::If(..) | JvmInstr::IfNonNull(_) => -1,
            JvmInstr::IfIcmp(..) | JvmInstr::IfAcmp(..) => -2,
            JvmInstr::NewArray(_) | JvmInstr::ANewArray(_) | JvmInstr::ArrayLength => 0,
            JvmInstr::ArrayLoad(_) => -1,
            JvmInstr::ArrayStore(_) => -3,
            JvmInstr::Dup | JvmInstr::New(_) => 1,
            JvmInstr::Pop => -1,
            JvmInstr::CheckCast(_) => 0,
            JvmInstr::GetStatic { .. } => 1,
            JvmInstr::PutStatic { .. } => -1,
            JvmInstr::InvokeStatic { desc, .. } => return_slots(desc) - arg_slots(desc),
            JvmInstr::InvokeVirtual { desc, .. } | JvmInstr::InvokeSpecial { desc, .. } => {
                return_slots(desc) - arg_slots(desc) - 1
            }
            JvmInstr::Ireturn | JvmInstr::Areturn => -1,
        }
    }

    /// The label a branch may jump to.
    pub fn branch_target(&self) -> Option<&JvmLabel> {
        match self {
            JvmInstr::If(_, label)
            | JvmInstr::IfIcmp(_, label)
            | JvmInstr::IfAcmp(_, label)
            | JvmInstr::IfNonNull(label)
            | JvmInstr::Goto(label) => Some(label),
            _ => None,
        }
    }

    /// Whether control never falls through to the next instruction.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JvmInstr::Goto(_) | JvmInstr::Ireturn | JvmInstr::Areturn | JvmInstr::Return
        )
    }
}

fn local(f: &mut fmt::Formatter<'_>, op: &str, index: u16) -> fmt::Result {
    if index <= 3 {
        write!(f, "{op}_{index}")
    } else {
        write!(f, "{op} {index}")
    }
}

impl fmt::Display for JvmInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JvmInstr::Label(label) => write!(f, "{label}:"),
            JvmInstr::Iconst(-1) => f.write_str("iconst_m1"),
            JvmInstr::Iconst(n @ 0..=5) => write!(f, "iconst_{n}"),
            JvmInstr::Iconst(n) if i8::try_from(*n).is_ok() => write!(f, "bipush {n}"),
            JvmInstr::Iconst(n) if i16::try_from(*n).is_ok() => write!(f, "sipush {n}"),
            JvmInstr::Iconst(n) => write!(f, "ldc {n}"),
            JvmInstr::Ldc(text) => write!(f, "ldc \"{text}\""),
            JvmInstr::AconstNull => f.write_str("aconst_null"),
            JvmInstr::Iload(i) => local(f, "iload", *i),
            JvmInstr::Istore(i) => local(f, "istore", *i),
            JvmInstr::Aload(i) => local(f, "aload", *i),
            JvmInstr::Astore(i) => local(f, "astore", *i),
            JvmInstr::Int(op) => f.write_str(op.mnemonic()),
            JvmInstr::I2c => f.write_str("i2c"),
            JvmInstr::If(cond, label) => write!(f, "if{} {label}", cond.suffix()),
            JvmInstr::IfIcmp(cond, label) => write!(f, "if_icmp{} {label}", cond.suffix()),
            JvmInstr::IfAcmp(cond, label) => write!(f, "if_acmp{} {label}", cond.suffix()),
            JvmInstr::IfNonNull(label) => write!(f, "ifnonnull {label}"),
            JvmInstr::Goto(label) => write!(f, "goto {label}"),
            JvmInstr::NewArray(kind) => write!(f, "newarray {}", kind.primitive()),
            JvmInstr::ANewArray(class) => write!(f, "anewarray {class}"),
            JvmInstr::ArrayLength => f.write_str("arraylength"),
            JvmInstr::ArrayLoad(kind) => write!(f, "{}aload", kind.prefix()),
            JvmInstr::ArrayStore(kind) => write!(f, "{}astore", kind.prefix()),
            JvmInstr::Dup => f.write_str("dup"),
            JvmInstr::Pop => f.write_str("pop"),
            JvmInstr::New(class) => write!(f, "new {class}"),
            JvmInstr::CheckCast(class) => write!(f, "checkcast {class}"),
            JvmInstr::GetStatic { field, desc } => write!(f, "getstatic {field} {desc}"),
            JvmInstr::PutStatic { field, desc } => write!(f, "putstatic {field} {desc}"),
            JvmInstr::InvokeStatic { method, desc } => write!(f, "invokestatic {method}{desc}"),
            JvmInstr::InvokeVirtual { method, desc } => write!(f, "invokevirtual {method}{desc}"),
            JvmInstr::InvokeSpecial { method, desc } => write!(f, "invokespecial {method}{desc}"),
            JvmInstr::Ireturn => f.write_str("ireturn"),
            JvmInstr::Areturn => f.write_str("areturn"),
            JvmInstr::Return => f.write_str("return"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_use_the_shortest_form() {
        assert_eq!(JvmInstr::Iconst(-1).to_string(), "iconst_m1");
        assert_eq!(JvmInstr::Iconst(5).to_string(), "iconst_5");
        assert_eq!(JvmInstr::Iconst(100).to_string(), "bipush 100");
        assert_eq!(JvmInstr::Iconst(-300).to_string(), "sipush -300");
        assert_eq!(JvmInstr::Iconst(1 << 20).to_string(), "ldc 1048576");
    }

    #[test]
    fn locals_use_short_forms_below_four() {
        assert_eq!(JvmInstr::Iload(2).to_string(), "iload_2");
        assert_eq!(JvmInstr::Astore(7).to_string(), "astore 7");
    }

    #[test]
    fn invocation_stack_effect_follows_the_descriptor() {
        let add = JvmInstr::invoke_static("java/lang/Math/addExact", "(II)I");
        assert_eq!(add.to_string(), "invokestatic java/lang/Math/addExact(II)I");
        assert_eq!(add.stack_delta(), -1);

        let print = JvmInstr::invoke_virtual("java/io/PrintStream/print", "([C)V");
        assert_eq!(print.stack_delta(), -2);
    }

    #[test]
    fn array_mnemonics() {
        assert_eq!(JvmInstr::NewArray(ArrayKind::Bool).to_string(), "newarray boolean");
        assert_eq!(JvmInstr::ArrayLoad(ArrayKind::Char).to_string(), "caload");
        assert_eq!(JvmInstr::ArrayStore(ArrayKind::Ref).to_string(), "aastore");
    }
}
